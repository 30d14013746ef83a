//! Run phase, tick clock, and the fixed stage ordering of one simulation tick.
//!
//! ## Tick layout
//!
//! | Stage | Set | Work |
//! |-------|-----|------|
//! | 0 | [`TickSet::Clock`] | hit-stop countdown, frame/second counters |
//! | 1 | [`TickSet::Intent`] | player movement from the tick's intent |
//! | 2 | [`TickSet::Spawn`] | wave selection and hostile spawning |
//! | 3 | [`TickSet::Weapons`] | cooldowns, effective stats, emission |
//! | 4 | [`TickSet::Simulate`] | actor pursuit, projectile motion and behaviours |
//! | 5 | [`TickSet::Resolve`] | collisions, damage, trait side effects, pruning |
//! | 6 | [`TickSet::Progress`] | pickups, experience, level-up |
//!
//! Every stage runs only in [`RunPhase::Playing`].  Stages 1–6 additionally
//! require the clock not to be frozen by hit-stop.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::ArenaConfig;

/// Top-level run state machine.
///
/// The surrounding UI owns the screens; the arena only needs to know whether
/// the tick should advance.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RunPhase {
    /// Nothing spawned yet; waiting for the first reset.
    #[default]
    Start,
    /// Active simulation.
    Playing,
    /// Level-up offers are pending; simulation frozen until one is chosen.
    Upgrade,
    /// Externally paused.
    Paused,
    /// The player has been defeated.
    Over,
}

/// Ordered stages of one tick.  Configured as a chain by [`configure_tick_sets`].
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    Clock,
    Intent,
    Spawn,
    Weapons,
    Simulate,
    Resolve,
    Progress,
}

/// Frame counter, survival seconds, and the global hit-stop.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SimClock {
    /// Ticks simulated this run (frozen ticks excluded).
    pub frame: u64,
    /// Whole seconds survived.
    pub seconds: u32,
    /// Remaining frozen ticks.
    pub hit_stop: u32,
    /// `true` while the current tick is being swallowed by hit-stop.
    pub frozen: bool,
}

impl SimClock {
    /// Freeze the next `ticks` ticks.  A longer pending freeze is kept.
    pub fn request_hit_stop(&mut self, ticks: u32) {
        self.hit_stop = self.hit_stop.max(ticks);
    }

    /// `true` on frames divisible by `interval`.
    pub fn on_interval(&self, interval: u32) -> bool {
        interval > 0 && self.frame % interval as u64 == 0
    }
}

/// Source of all simulation randomness.  Seed it to make a run reproducible.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// Chain the tick stages and gate them on the run phase and hit-stop.
pub fn configure_tick_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            TickSet::Clock,
            TickSet::Intent,
            TickSet::Spawn,
            TickSet::Weapons,
            TickSet::Simulate,
            TickSet::Resolve,
            TickSet::Progress,
        )
            .chain()
            .run_if(in_state(RunPhase::Playing)),
    )
    .configure_sets(
        Update,
        (
            TickSet::Intent,
            TickSet::Spawn,
            TickSet::Weapons,
            TickSet::Simulate,
            TickSet::Resolve,
            TickSet::Progress,
        )
            .run_if(clock_running),
    );
}

/// Run condition: the current tick is not swallowed by hit-stop.
pub fn clock_running(clock: Res<SimClock>) -> bool {
    !clock.frozen
}

/// Advance the clock, or burn one hit-stop tick instead.
pub fn advance_clock_system(mut clock: ResMut<SimClock>, config: Res<ArenaConfig>) {
    if clock.hit_stop > 0 {
        clock.hit_stop -= 1;
        clock.frozen = true;
        return;
    }
    clock.frozen = false;
    clock.frame += 1;
    if clock.on_interval(config.ticks_per_second) {
        clock.seconds += 1;
    }
}
