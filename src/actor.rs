//! Hostile actors: archetypes, pursuit movement, and ranged fire.
//!
//! Actors are plain kinematic entities ([`Actor`] + [`Position`]).  Each tick
//! they step straight toward the player; ranged actors stop at a hold
//! distance and lob [`HostileBolt`]s instead.  Damage, knockback, and death are
//! handled by [`crate::combat`].

use crate::body::{ArenaEntity, Position, Velocity};
use crate::config::{ArchetypeStats, ArenaConfig};
use crate::player::Player;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Hostile actor families.  Serialised in `snake_case` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Basic,
    Tank,
    Dasher,
    Ranged,
    Boss,
}

impl Archetype {
    /// Bosses ignore every player-side damage source.
    #[inline]
    pub fn is_boss(self) -> bool {
        matches!(self, Archetype::Boss)
    }

    #[inline]
    pub fn is_ranged(self) -> bool {
        matches!(self, Archetype::Ranged)
    }
}

// ── Components ─────────────────────────────────────────────────────────────────

/// A hostile actor.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Actor {
    pub archetype: Archetype,
    pub hp: f32,
    pub max_hp: f32,
    /// Movement per tick.
    pub speed: f32,
    pub radius: f32,
    /// Experience carried by the pickup dropped on death.
    pub reward: f32,
    pub visual: String,
    pub knockback_immune: bool,
    /// Set by the resolver when health reaches zero; pruned the same tick.
    pub dead: bool,
    /// Remaining ticks of hit flash.
    pub flash: u32,
}

impl Actor {
    /// Build an actor from its archetype row, scaled by `difficulty`.
    ///
    /// `speed_roll` is a uniform sample in `[0, 1)` multiplied into the
    /// archetype's speed jitter.
    pub fn from_stats(
        archetype: Archetype,
        stats: &ArchetypeStats,
        difficulty: f32,
        speed_roll: f32,
    ) -> Self {
        let hp = stats.hp * difficulty;
        Self {
            archetype,
            hp,
            max_hp: hp,
            speed: stats.speed + stats.speed_jitter * speed_roll,
            radius: stats.radius,
            reward: stats.reward * difficulty,
            visual: stats.visual.clone(),
            knockback_immune: stats.knockback_immune,
            dead: false,
            flash: 0,
        }
    }

    /// Live and not a boss: may be aimed at, damaged, pulled, or pushed by the
    /// player's weapons.
    #[inline]
    pub fn is_targetable(&self) -> bool {
        !self.dead && !self.archetype.is_boss()
    }
}

/// Shoot cooldown carried by ranged actors.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct RangedAttack {
    pub cooldown: u32,
}

/// A bullet fired at the player by a ranged actor.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HostileBolt {
    pub damage: f32,
    pub radius: f32,
    pub lifetime: u32,
}

/// Spawn one actor at `position`.  Ranged archetypes get a [`RangedAttack`].
pub fn spawn_actor(commands: &mut Commands, actor: Actor, position: Vec2) -> Entity {
    let ranged = actor.archetype.is_ranged();
    let mut entity = commands.spawn((ArenaEntity, actor, Position(position)));
    if ranged {
        entity.insert(RangedAttack::default());
    }
    entity.id()
}

// ── Systems ────────────────────────────────────────────────────────────────────

/// Step every live actor toward the player and count down hit flash.
///
/// Ranged actors stand still once inside the hold distance.
pub fn actor_pursuit_system(
    mut q_actors: Query<(&mut Actor, &mut Position)>,
    q_player: Query<&Player>,
    config: Res<ArenaConfig>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };

    for (mut actor, mut pos) in q_actors.iter_mut() {
        if actor.flash > 0 {
            actor.flash -= 1;
        }
        if actor.dead {
            continue;
        }

        let to_player = player.position - pos.0;
        if actor.archetype.is_ranged() && to_player.length() <= config.ranged_hold_distance {
            continue;
        }
        pos.0 += to_player.normalize_or_zero() * actor.speed;
    }
}

/// Count down ranged cooldowns and fire at the player when in range.
pub fn ranged_fire_system(
    mut commands: Commands,
    mut q_ranged: Query<(&Actor, &Position, &mut RangedAttack)>,
    q_player: Query<&Player>,
    config: Res<ArenaConfig>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };

    for (actor, pos, mut attack) in q_ranged.iter_mut() {
        attack.cooldown = attack.cooldown.saturating_sub(1);
        if actor.dead || attack.cooldown > 0 {
            continue;
        }
        if pos.0.distance(player.position) > config.ranged_fire_range {
            continue;
        }

        let dir = (player.position - pos.0).normalize_or_zero();
        commands.spawn((
            ArenaEntity,
            HostileBolt {
                damage: config.hostile_bolt_damage,
                radius: config.hostile_bolt_radius,
                lifetime: config.hostile_bolt_lifetime,
            },
            Position(pos.0),
            Velocity(dir * config.hostile_bolt_speed),
        ));
        attack.cooldown = config.ranged_fire_period;
    }
}

/// Age and move hostile bolts, despawning them when their lifetime runs out.
pub fn hostile_bolt_motion_system(
    mut commands: Commands,
    mut q_bolts: Query<(Entity, &mut HostileBolt, &mut Position, &Velocity)>,
) {
    for (entity, mut bolt, mut pos, vel) in q_bolts.iter_mut() {
        bolt.lifetime = bolt.lifetime.saturating_sub(1);
        if bolt.lifetime == 0 {
            commands.entity(entity).despawn();
            continue;
        }
        pos.0 += vel.0;
    }
}
