//! Player module: the survivor entity, run-wide stat multipliers, and movement.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | `Player` component, `StatMultipliers` and `PlayerIntent` resources |
//! | [`control`] | Intent → movement with arena clamping |
//!
//! All public items are re-exported at this level so that the rest of the crate
//! can use flat `crate::player::*` imports.

pub mod control;
pub mod state;

pub use control::apply_player_intent_system;
pub use state::{Player, PlayerIntent, StatMultipliers};

use crate::body::ArenaEntity;
use crate::config::ArenaConfig;
use crate::state::TickSet;
use bevy::prelude::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerIntent>()
            .init_resource::<StatMultipliers>()
            .add_systems(Update, apply_player_intent_system.in_set(TickSet::Intent));
    }
}

/// Spawn a fresh player at the centre of the arena.
pub fn spawn_player(world: &mut World) -> Entity {
    let player = Player::from_config(world.resource::<ArenaConfig>());
    let entity = world.spawn((ArenaEntity, player)).id();
    debug!("Player spawned at arena centre");
    entity
}
