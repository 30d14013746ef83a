//! Kinematic components shared by every moving simulation entity.
//!
//! Hostile actors, player-owned projectiles, hostile bolts, and reward pickups
//! all carry a [`Position`]; anything that drifts on its own also carries a
//! [`Velocity`].  The arena works in plain 2-D world units with no physics
//! engine: each stage of the tick moves entities explicitly.

use bevy::prelude::*;

/// World-space position in arena units.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec2);

/// Displacement applied once per tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity(pub Vec2);

/// Marker for every entity owned by a run.
///
/// A reset despawns everything carrying this marker, so anything spawned by
/// the simulation must include it.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ArenaEntity;
