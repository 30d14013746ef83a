//! Player components and resources.
//!
//! All ECS components and Bevy resources that describe player state live here.
//! The movement system that consumes [`PlayerIntent`] is in
//! [`super::control`].

use crate::config::ArenaConfig;
use bevy::prelude::*;
use serde::Serialize;

// ── Components ─────────────────────────────────────────────────────────────────

/// The controllable survivor.
///
/// Exactly one exists while a run is live.  Its position lives on the
/// component itself rather than in a shared [`crate::body::Position`], so
/// actor and projectile queries never alias it.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Vec2,
    /// Body radius; also the pickup collection radius.
    pub radius: f32,
    /// Movement per tick at full intent, before [`StatMultipliers::speed`].
    pub speed: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Facing angle in radians, as last reported by the input layer.
    pub facing: f32,
}

impl Player {
    /// A fresh player standing at the centre of the arena.
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self {
            position: Vec2::splat(config.map_size * 0.5),
            radius: config.player_radius,
            speed: config.player_speed,
            hp: config.player_max_hp,
            max_hp: config.player_max_hp,
            facing: 0.0,
        }
    }

    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0.0
    }

    /// Subtract `amount` health, never going below zero.
    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).max(0.0);
    }
}

// ── Resources ──────────────────────────────────────────────────────────────────

/// Run-wide multipliers applied on top of every weapon's effective stats.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatMultipliers {
    pub damage: f32,
    pub area: f32,
    pub speed: f32,
    pub cooldown: f32,
    /// Flat extra emissions added to every weapon's count.
    pub amount: u32,
    /// Flat extra pierce added to every bolt.
    pub pierce: u32,
}

impl Default for StatMultipliers {
    fn default() -> Self {
        Self {
            damage: 1.0,
            area: 1.0,
            speed: 1.0,
            cooldown: 1.0,
            amount: 0,
            pierce: 0,
        }
    }
}

// ── Input Abstraction ──────────────────────────────────────────────────────────

/// Player intent for the current tick, supplied by the input layer before the
/// tick runs.
///
/// Tests populate this directly to drive the player without any input device.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct PlayerIntent {
    /// Desired movement direction.  Magnitudes above 1 are clamped to 1.
    pub movement: Vec2,
    /// Facing angle in radians.
    pub facing: f32,
}

impl PlayerIntent {
    pub fn new(movement: Vec2, facing: f32) -> Self {
        Self { movement, facing }
    }
}
