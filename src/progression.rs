//! Experience, level-ups, and upgrade offers.
//!
//! Dead actors drop [`RewardPickup`]s.  Pickups inside the magnet radius
//! drift toward the player and are collected on contact.  When experience
//! reaches the threshold the run switches to [`RunPhase::Upgrade`] with a
//! fresh set of offers; [`crate::control::apply_upgrade`] resolves the choice.

use crate::body::Position;
use crate::combat::CombatEvent;
use crate::config::ArenaConfig;
use crate::player::Player;
use crate::state::{RunPhase, SimRng, TickSet};
use crate::weapons::{Arsenal, SynergyPair, WeaponId, WeaponRegistry};
use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Experience orb dropped where an actor died.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RewardPickup {
    pub value: f32,
}

/// Whether the player is signed in.  Signed-in players earn full experience.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct Authentication {
    pub authenticated: bool,
}

/// One level-up choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpgradeOffer {
    /// Unlock a weapon (`next_level == 1`) or raise its level.
    Weapon {
        weapon: WeaponId,
        key: String,
        title: String,
        description: String,
        icon: String,
        next_level: u32,
    },
    /// Unlock a synergy between two owned weapons.
    Synergy {
        pair: SynergyPair,
        title: String,
        description: String,
        icon: String,
    },
}

impl UpgradeOffer {
    pub fn title(&self) -> &str {
        match self {
            UpgradeOffer::Weapon { title, .. } | UpgradeOffer::Synergy { title, .. } => title,
        }
    }
}

/// Level, experience, and pending offers.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Progression {
    pub level: u32,
    pub xp: f32,
    /// Experience needed for the next level-up.
    pub threshold: f32,
    /// Non-empty only while a choice is pending.
    pub offers: Vec<UpgradeOffer>,
}

impl Progression {
    pub fn new(first_threshold: f32) -> Self {
        Self {
            level: 1,
            xp: 0.0,
            threshold: first_threshold,
            offers: Vec::new(),
        }
    }

    pub fn from_config(config: &ArenaConfig) -> Self {
        Self::new(config.xp_first_threshold)
    }

    /// Consume one threshold's worth of experience and grow the threshold.
    /// Returns `false` without changing anything if the threshold is not met.
    pub fn consume_level(&mut self, growth: f32) -> bool {
        if self.xp < self.threshold {
            return false;
        }
        self.xp -= self.threshold;
        self.threshold = (self.threshold * growth).ceil();
        true
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::from_config(&ArenaConfig::default())
    }
}

/// Every offer currently available: one per registry weapon below its max
/// level, plus one per owned pair whose synergy is still locked.
pub fn offer_pool(registry: &WeaponRegistry, arsenal: &Arsenal) -> Vec<UpgradeOffer> {
    let mut pool: Vec<UpgradeOffer> = registry
        .iter()
        .filter(|(id, def)| def.can_level_past(arsenal.level_of(*id)))
        .map(|(id, def)| UpgradeOffer::Weapon {
            weapon: id,
            key: def.key.clone(),
            title: def.name.clone(),
            description: def.description.clone(),
            icon: def.icon.clone(),
            next_level: arsenal.level_of(id) + 1,
        })
        .collect();

    let owned: Vec<WeaponId> = arsenal.owned_ids().collect();
    for (i, &a) in owned.iter().enumerate() {
        for &b in &owned[i + 1..] {
            let pair = SynergyPair::new(a, b);
            if arsenal.synergies.is_unlocked(pair) {
                continue;
            }
            let (Some(da), Some(db)) = (registry.get(a), registry.get(b)) else {
                continue;
            };
            pool.push(UpgradeOffer::Synergy {
                pair,
                title: format!("{} + {}", da.name, db.name),
                description: format!(
                    "{} gains [{}], {} gains [{}]",
                    da.name,
                    db.base_trait.display_name(),
                    db.name,
                    da.base_trait.display_name()
                ),
                icon: "♾️".to_string(),
            });
        }
    }
    pool
}

/// Shuffle the pool and keep the first `count`.
pub fn generate_offers<R: Rng + ?Sized>(
    registry: &WeaponRegistry,
    arsenal: &Arsenal,
    rng: &mut R,
    count: usize,
) -> Vec<UpgradeOffer> {
    let mut pool = offer_pool(registry, arsenal);
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

/// Magnetise and collect reward pickups.
///
/// Collection is checked against the distance before this tick's pull, so a
/// pickup needs at least one tick inside the player's radius.
pub fn pickup_collection_system(
    mut commands: Commands,
    q_player: Query<&Player>,
    mut q_pickups: Query<(Entity, &RewardPickup, &mut Position)>,
    arsenal: Res<Arsenal>,
    registry: Res<WeaponRegistry>,
    auth: Res<Authentication>,
    config: Res<ArenaConfig>,
    mut progression: ResMut<Progression>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    let magnet = config.magnet_radius * (1.0 + arsenal.magnet_bonus(&registry));
    let rate = if auth.authenticated {
        1.0
    } else {
        config.xp_unauthenticated_rate
    };

    for (entity, pickup, mut pos) in q_pickups.iter_mut() {
        let gap = player.position - pos.0;
        let d2 = gap.length_squared();
        if d2 < magnet * magnet {
            pos.0 += gap * config.magnet_pull_fraction;
        }
        if d2 < player.radius * player.radius {
            progression.xp += pickup.value * rate;
            commands.entity(entity).despawn();
        }
    }
}

/// At most one level-up per tick.  Enters [`RunPhase::Upgrade`] with fresh
/// offers; a defeated player never levels up.  With nothing left to offer
/// the level applies at once and play continues.
pub fn level_up_system(
    q_player: Query<&Player>,
    arsenal: Res<Arsenal>,
    registry: Res<WeaponRegistry>,
    config: Res<ArenaConfig>,
    mut progression: ResMut<Progression>,
    mut rng: ResMut<SimRng>,
    mut next: ResMut<NextState<RunPhase>>,
    mut events: MessageWriter<CombatEvent>,
) {
    if q_player.single().map_or(true, |p| p.is_defeated()) {
        return;
    }
    if !progression.consume_level(config.xp_threshold_growth) {
        return;
    }

    let offers = generate_offers(&registry, &arsenal, &mut rng.0, config.offer_count);
    events.write(CombatEvent::LevelUp {
        level: progression.level + 1,
    });
    if offers.is_empty() {
        progression.level += 1;
        info!(
            "Reached level {} with nothing left to offer (next threshold {})",
            progression.level, progression.threshold
        );
        return;
    }

    info!(
        "Level-up available at level {} ({} offers, next threshold {})",
        progression.level,
        offers.len(),
        progression.threshold
    );
    progression.offers = offers;
    next.set(RunPhase::Upgrade);
}

pub struct ProgressionPlugin;

impl Plugin for ProgressionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Progression>()
            .init_resource::<Authentication>()
            .add_systems(
                Update,
                (pickup_collection_system, level_up_system)
                    .chain()
                    .in_set(TickSet::Progress),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn id(registry: &WeaponRegistry, key: &str) -> WeaponId {
        registry.find(key).expect("builtin weapon")
    }

    #[test]
    fn threshold_grows_by_half_rounded_up() {
        let mut p = Progression::new(10.0);
        p.xp = 26.0;
        assert!(p.consume_level(1.5));
        assert_eq!(p.xp, 16.0);
        assert_eq!(p.threshold, 15.0);
        assert!(p.consume_level(1.5));
        assert_eq!(p.threshold, 23.0);
        assert!(!p.consume_level(1.5));
        assert_eq!(p.xp, 1.0);
    }

    #[test]
    fn pool_has_every_weapon_and_locked_pairs() {
        let registry = WeaponRegistry::builtin();
        let mut arsenal = Arsenal::starting(id(&registry, "content"));
        arsenal.grant(id(&registry, "viral"));
        arsenal.grant(id(&registry, "seo"));

        let pool = offer_pool(&registry, &arsenal);
        let synergies = pool
            .iter()
            .filter(|o| matches!(o, UpgradeOffer::Synergy { .. }))
            .count();
        assert_eq!(pool.len(), 10 + 3);
        assert_eq!(synergies, 3);

        arsenal.synergies.unlock(SynergyPair::new(
            id(&registry, "seo"),
            id(&registry, "content"),
        ));
        assert_eq!(offer_pool(&registry, &arsenal).len(), 12, "unlocked pair never re-offered");
    }

    #[test]
    fn synergy_text_swaps_traits() {
        let registry = WeaponRegistry::builtin();
        let mut arsenal = Arsenal::starting(id(&registry, "content"));
        arsenal.grant(id(&registry, "viral"));
        let synergy = offer_pool(&registry, &arsenal)
            .into_iter()
            .find(|o| matches!(o, UpgradeOffer::Synergy { .. }))
            .expect("one synergy offer");
        let UpgradeOffer::Synergy {
            title, description, ..
        } = synergy
        else {
            unreachable!()
        };
        assert_eq!(title, "Content Marketing + Viral Spread");
        assert_eq!(
            description,
            "Content Marketing gains [Explosive], Viral Spread gains [Rapid Fire]"
        );
    }

    #[test]
    fn maxed_weapons_leave_the_pool() {
        let mut registry = WeaponRegistry::builtin();
        let mut defs: Vec<_> = registry.iter().map(|(_, d)| d.clone()).collect();
        defs[0].max_level = Some(1);
        registry = WeaponRegistry::new(defs);
        let arsenal = Arsenal::starting(WeaponId(0));
        let pool = offer_pool(&registry, &arsenal);
        assert_eq!(pool.len(), 9);
        assert!(pool.iter().all(|o| o.title() != "Content Marketing"));
    }

    #[test]
    fn offers_are_a_shuffled_prefix_of_three() {
        let registry = WeaponRegistry::builtin();
        let arsenal = Arsenal::starting(WeaponId(0));
        let mut rng = StdRng::seed_from_u64(99);
        let offers = generate_offers(&registry, &arsenal, &mut rng, 3);
        assert_eq!(offers.len(), 3);
        let pool = offer_pool(&registry, &arsenal);
        assert!(offers.iter().all(|o| pool.contains(o)));
    }
}
