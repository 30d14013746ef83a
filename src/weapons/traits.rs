//! Traits, synergy pairs, and effective-stat resolution.
//!
//! Every weapon has one base [`Trait`].  Unlocking a synergy between two owned
//! weapons makes each acquire the other's base trait.  When a weapon fires,
//! its base [`StatBlock`] is copied and the fixed modifier of every acquired
//! trait is applied in [`Trait::ALL`] order.  Nothing is cached: membership is
//! recomputed on every fire.

use super::behavior::Behavior;
use super::registry::{StatBlock, WeaponDef, WeaponId, WeaponRegistry};
use crate::constants::*;
use crate::player::StatMultipliers;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Rapid,
    Heavy,
    Spread,
    Aura,
    Minion,
    Homing,
    Lockon,
    Orbit,
    Explosive,
    Zone,
}

impl Trait {
    /// Every trait, in modifier application order.
    pub const ALL: [Trait; 10] = [
        Trait::Rapid,
        Trait::Heavy,
        Trait::Spread,
        Trait::Aura,
        Trait::Minion,
        Trait::Homing,
        Trait::Lockon,
        Trait::Orbit,
        Trait::Explosive,
        Trait::Zone,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Trait::Rapid => "Rapid Fire",
            Trait::Heavy => "Colossal",
            Trait::Spread => "Scatter",
            Trait::Aura => "Damage Aura",
            Trait::Minion => "Swarm",
            Trait::Homing => "Homing",
            Trait::Lockon => "Laser Lock",
            Trait::Orbit => "Orbit Shield",
            Trait::Explosive => "Explosive",
            Trait::Zone => "Fire Zone",
        }
    }
}

/// On-hit capabilities carried by every emitted entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraitFlags {
    pub explosive: bool,
    pub leave_zone: bool,
    pub minion: bool,
    pub lockon: bool,
}

impl TraitFlags {
    pub fn any(&self) -> bool {
        self.explosive || self.leave_zone || self.minion || self.lockon
    }
}

// ── Synergies ──────────────────────────────────────────────────────────────────

/// An unordered pair of weapons.  `(a, b)` and `(b, a)` normalise to the same
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SynergyPair {
    pub first: WeaponId,
    pub second: WeaponId,
}

impl SynergyPair {
    pub fn new(a: WeaponId, b: WeaponId) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }

    /// The other half of the pair, if `id` is in it.
    pub fn partner_of(&self, id: WeaponId) -> Option<WeaponId> {
        if self.first == id {
            Some(self.second)
        } else if self.second == id {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Unlocked synergy pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynergyBook {
    pairs: BTreeSet<SynergyPair>,
}

impl SynergyBook {
    /// Unlock `pair`.  Returns `false` if it was already unlocked or pairs a
    /// weapon with itself.
    pub fn unlock(&mut self, pair: SynergyPair) -> bool {
        if pair.first == pair.second {
            return false;
        }
        self.pairs.insert(pair)
    }

    pub fn is_unlocked(&self, pair: SynergyPair) -> bool {
        self.pairs.contains(&pair)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SynergyPair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Weapons paired with `id`.
    pub fn partners(&self, id: WeaponId) -> impl Iterator<Item = WeaponId> + '_ {
        self.pairs.iter().filter_map(move |p| p.partner_of(id))
    }

    /// Base traits of every partner of `id`, deduplicated, in modifier order.
    pub fn acquired_traits(&self, id: WeaponId, registry: &WeaponRegistry) -> Vec<Trait> {
        let found: BTreeSet<Trait> = self
            .partners(id)
            .filter_map(|p| registry.get(p))
            .map(|def| def.base_trait)
            .collect();
        found.into_iter().collect()
    }

    /// `true` if `id` has `t` as its base trait or acquired it via a synergy.
    pub fn has_trait(&self, id: WeaponId, t: Trait, registry: &WeaponRegistry) -> bool {
        registry.get(id).is_some_and(|def| def.base_trait == t)
            || self.acquired_traits(id, registry).contains(&t)
    }
}

// ── Effective stats ────────────────────────────────────────────────────────────

/// A weapon's stats for one fire, after trait modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveStats {
    pub stats: StatBlock,
    pub flags: TraitFlags,
    pub homing: bool,
    /// Zones emitted by this fire drip shards.
    pub drip: bool,
    /// Spawn the three-hit orbit burst after the behavior's own emission.
    pub orbit_burst: bool,
    /// Damage of the extra aura field spawned before emission.
    pub aura_burst: Option<f32>,
}

/// Copy `def`'s base stats and apply every trait in `acquired`.
///
/// Modifiers run in [`Trait::ALL`] order regardless of the order of
/// `acquired`, so the aura burst sees rapid and heavy but not explosive.
pub fn effective_stats(
    def: &WeaponDef,
    acquired: &[Trait],
    globals: &StatMultipliers,
) -> EffectiveStats {
    let mut out = EffectiveStats {
        stats: def.stats.clone(),
        flags: TraitFlags::default(),
        homing: false,
        drip: false,
        orbit_burst: false,
        aura_burst: None,
    };
    let s = &mut out.stats;

    for t in Trait::ALL.into_iter().filter(|t| acquired.contains(t)) {
        match t {
            Trait::Rapid => {
                s.cooldown *= RAPID_COOLDOWN_FACTOR;
                s.count += RAPID_EXTRA_COUNT;
                let speed = if s.speed == 0.0 { 1.0 } else { s.speed };
                s.speed = speed * RAPID_SPEED_FACTOR;
            }
            Trait::Heavy => {
                s.damage *= HEAVY_DAMAGE_FACTOR;
                s.radius = Some(s.radius.unwrap_or(HEAVY_FALLBACK_RADIUS) * HEAVY_RADIUS_FACTOR);
                s.pierce = HEAVY_PIERCE;
            }
            Trait::Spread => {
                s.count += SPREAD_EXTRA_COUNT;
                s.spread += SPREAD_EXTRA_ANGLE;
                if matches!(def.behavior, Behavior::Field { .. }) {
                    out.drip = true;
                }
            }
            Trait::Aura => {
                out.aura_burst = Some(s.damage * AURA_TRAIT_DAMAGE_FACTOR * globals.damage);
            }
            Trait::Minion => out.flags.minion = true,
            Trait::Homing => {
                out.homing = true;
                s.speed *= HOMING_SPEED_FACTOR;
            }
            Trait::Lockon => out.flags.lockon = true,
            Trait::Orbit => out.orbit_burst = true,
            Trait::Explosive => {
                out.flags.explosive = true;
                s.damage *= EXPLOSIVE_DAMAGE_FACTOR;
            }
            Trait::Zone => out.flags.leave_zone = true,
        }
    }
    out
}

/// Cooldown a weapon waits after firing.
#[inline]
pub fn cooldown_after_fire(cooldown: f32, cooldown_mult: f32, level: u32) -> f32 {
    cooldown * cooldown_mult / (1.0 + 0.1 * level as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(key: &str) -> (WeaponRegistry, WeaponId) {
        let registry = WeaponRegistry::builtin();
        let id = registry.find(key).expect("builtin weapon");
        (registry, id)
    }

    #[test]
    fn synergy_pairs_are_unordered_and_unlock_once() {
        let mut book = SynergyBook::default();
        let (a, b) = (WeaponId(1), WeaponId(4));
        assert_eq!(SynergyPair::new(a, b), SynergyPair::new(b, a));
        assert!(book.unlock(SynergyPair::new(b, a)));
        assert!(!book.unlock(SynergyPair::new(a, b)), "already unlocked");
        assert!(!book.unlock(SynergyPair::new(a, a)));
        assert_eq!(book.len(), 1);
        assert!(book.is_unlocked(SynergyPair::new(a, b)));
    }

    #[test]
    fn acquired_traits_come_from_partners_only() {
        let (registry, content) = def("content");
        let viral = registry.find("viral").expect("viral");
        let mut book = SynergyBook::default();
        assert!(book.acquired_traits(content, &registry).is_empty());
        assert!(book.has_trait(content, Trait::Rapid, &registry), "own trait");

        book.unlock(SynergyPair::new(content, viral));
        assert_eq!(book.acquired_traits(content, &registry), vec![Trait::Explosive]);
        assert_eq!(book.acquired_traits(viral, &registry), vec![Trait::Rapid]);
        assert!(book.has_trait(viral, Trait::Rapid, &registry));
    }

    #[test]
    fn modifiers_apply_in_fixed_order() {
        let (registry, content) = def("content");
        let content = registry.get(content).expect("content");
        let globals = StatMultipliers {
            damage: 2.0,
            ..Default::default()
        };
        let eff = effective_stats(
            content,
            &[Trait::Explosive, Trait::Aura, Trait::Heavy],
            &globals,
        );
        assert!((eff.stats.damage - 10.0 * 2.0 * 1.2).abs() < 1e-4);
        assert_eq!(eff.stats.radius, Some(15.0));
        assert_eq!(eff.stats.pierce, 999);
        assert!(eff.flags.explosive);
        let aura = eff.aura_burst.expect("aura burst");
        assert!((aura - 20.0 * 0.8 * 2.0).abs() < 1e-4, "aura sees heavy, not explosive");
    }

    #[test]
    fn rapid_treats_zero_speed_as_one() {
        let (registry, funnel) = def("funnel");
        let funnel = registry.get(funnel).expect("funnel");
        let eff = effective_stats(funnel, &[Trait::Rapid], &StatMultipliers::default());
        assert_eq!(eff.stats.speed, 1.5);
        assert_eq!(eff.stats.cooldown, 90.0);
        assert_eq!(eff.stats.count, 3);
    }

    #[test]
    fn spread_grants_drip_only_to_fields() {
        let (registry, funnel) = def("funnel");
        let content = registry.find("content").expect("content");
        let spread = [Trait::Spread];
        let globals = StatMultipliers::default();

        let zone = effective_stats(registry.get(funnel).expect("funnel"), &spread, &globals);
        assert!(zone.drip);
        assert_eq!(zone.stats.count, 5);

        let volley = effective_stats(registry.get(content).expect("content"), &spread, &globals);
        assert!(!volley.drip);
        assert!((volley.stats.spread - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cooldown_shrinks_with_level() {
        assert!((cooldown_after_fire(40.0, 1.0, 1) - 40.0 / 1.1).abs() < 1e-4);
        assert!((cooldown_after_fire(60.0, 0.5, 0) - 30.0).abs() < 1e-6);
    }
}
