//! Collision and damage resolution.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`damage`] | Strike, explosion, and on-hit trait effects over an actor query |
//! | [`resolve`] | The resolve-stage systems, run in a fixed chain |
//!
//! Damage never despawns anything directly.  Side effects of a strike
//! (outbound events, reward pickups, new projectiles, hit-stop) are collected
//! in a [`CombatLedger`] and flushed once the system is done iterating.

pub mod damage;
pub mod resolve;

pub use damage::{
    apply_trait_effects, detonate, strike, strike_entity, ActorQuery, StrikeOutcome, StrikeRules,
};
pub use resolve::{
    hostile_bolt_hit_system, player_contact_system, player_defeat_system,
    projectile_hit_system, prune_fallen_actors_system, resolve_impacts_system,
};

use crate::actor::Archetype;
use crate::body::{ArenaEntity, Position};
use crate::progression::RewardPickup;
use crate::projectile::{spawn_projectile, ProjectileSeed};
use crate::state::{SimClock, TickSet};
use crate::weapons::TraitFlags;
use bevy::prelude::*;

// ── Messages ───────────────────────────────────────────────────────────────────

/// What a hit carries into on-hit trait effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitPayload {
    /// Damage of the carrying entity; trait effects scale from this.
    pub damage: f32,
    /// Where the hit happened.  Explosive blasts centre here.
    pub origin: Vec2,
    pub flags: TraitFlags,
}

/// Damage queued by earlier tick stages and applied first in the resolve
/// stage.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum Impact {
    /// Area damage, e.g. a thrown bomb landing.
    Blast {
        center: Vec2,
        radius: f32,
        damage: f32,
        /// Trait effects applied to every actor caught in the blast.
        payload: Option<HitPayload>,
    },
    /// Direct damage to one actor, e.g. a beam lock.
    Strike {
        target: Entity,
        damage: f32,
        payload: Option<HitPayload>,
    },
}

/// Outbound notifications for presentation layers.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum CombatEvent {
    /// A damage number; `amount` is rounded up.
    Damage {
        target: Entity,
        position: Vec2,
        amount: u32,
    },
    ActorKilled {
        archetype: Archetype,
        position: Vec2,
        reward: f32,
    },
    Blast {
        center: Vec2,
        radius: f32,
    },
    PlayerHurt {
        amount: f32,
        hp: f32,
    },
    PlayerDefeated {
        seconds: u32,
        level: u32,
    },
    LevelUp {
        level: u32,
    },
    WeaponGained {
        key: String,
        level: u32,
    },
    SynergyUnlocked {
        first: String,
        second: String,
    },
    WaveChanged {
        index: usize,
        time: u32,
    },
}

// ── Ledger ─────────────────────────────────────────────────────────────────────

/// Deferred side effects of one resolve system run.
#[derive(Debug, Default)]
pub struct CombatLedger {
    pub events: Vec<CombatEvent>,
    pub pickups: Vec<(Vec2, f32)>,
    pub spawns: Vec<ProjectileSeed>,
    pub hit_stop: u32,
}

impl CombatLedger {
    pub fn request_hit_stop(&mut self, ticks: u32) {
        self.hit_stop = self.hit_stop.max(ticks);
    }

    /// Apply everything recorded so far.
    pub fn flush(
        self,
        commands: &mut Commands,
        events: &mut MessageWriter<CombatEvent>,
        clock: &mut SimClock,
    ) {
        events.write_batch(self.events);
        for (position, value) in self.pickups {
            commands.spawn((ArenaEntity, RewardPickup { value }, Position(position)));
        }
        for seed in self.spawns {
            spawn_projectile(commands, seed);
        }
        if self.hit_stop > 0 {
            clock.request_hit_stop(self.hit_stop);
        }
    }
}

// ── Plugin ─────────────────────────────────────────────────────────────────────

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<Impact>()
            .add_message::<CombatEvent>()
            .add_systems(
                Update,
                (
                    resolve_impacts_system,
                    projectile_hit_system,
                    prune_fallen_actors_system,
                    player_contact_system,
                    hostile_bolt_hit_system,
                    player_defeat_system,
                )
                    .chain()
                    .in_set(TickSet::Resolve),
            );
    }
}
