//! Player movement from the per-tick [`PlayerIntent`].
//!
//! The **input abstraction layer** (`PlayerIntent`) keeps movement fully
//! testable: tests populate the resource directly and run only
//! [`apply_player_intent_system`].

use super::state::{Player, PlayerIntent, StatMultipliers};
use crate::config::ArenaConfig;
use bevy::prelude::*;

/// Move the player along the intent vector and clamp it to the arena.
///
/// Displacement is `direction × speed × speed multiplier`, where the direction
/// keeps its magnitude when it is at most 1 (analog sticks) and is normalised
/// otherwise (diagonal keyboard input).
pub fn apply_player_intent_system(
    mut q: Query<&mut Player>,
    intent: Res<PlayerIntent>,
    multipliers: Res<StatMultipliers>,
    config: Res<ArenaConfig>,
) {
    let Ok(mut player) = q.single_mut() else {
        return;
    };

    player.facing = intent.facing;

    let direction = intent.movement.clamp_length_max(1.0);
    if direction == Vec2::ZERO || !direction.is_finite() {
        return;
    }

    let step = direction * player.speed * multipliers.speed;
    player.position = (player.position + step).clamp(Vec2::ZERO, Vec2::splat(config.map_size));
}
