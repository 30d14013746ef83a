//! Survivor arena combat simulation engine.
//!
//! A headless, fixed-step simulation of an arena-survival game: hostile waves
//! converge on a single player whose weapons fire automatically, level-ups
//! offer new weapons or synergies, and the run ends when the player falls.
//! Built on Bevy's ECS; [`arena::Arena`] is the entry point.

pub mod actor;
pub mod arena;
pub mod body;
pub mod combat;
pub mod config;
pub mod constants;
pub mod control;
pub mod error;
pub mod player;
pub mod progression;
pub mod projectile;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod targeting;
pub mod weapons;
