//! The simulation context: a headless Bevy `App` wrapped behind a small
//! facade.
//!
//! Each [`Arena`] owns its own `App`, so any number of independent runs can
//! coexist.  One call to [`Arena::step`] is one tick.

use crate::actor::{actor_pursuit_system, hostile_bolt_motion_system, ranged_fire_system};
use crate::combat::{CombatEvent, CombatPlugin};
use crate::config::ArenaConfig;
use crate::control;
use crate::error::ArenaResult;
use crate::player::{PlayerIntent, PlayerPlugin};
use crate::progression::{ProgressionPlugin, UpgradeOffer};
use crate::projectile::projectile_motion_system;
use crate::snapshot::{capture, ArenaSnapshot};
use crate::spawn::SpawnPlugin;
use crate::state::{
    advance_clock_system, configure_tick_sets, RunPhase, SimClock, SimRng, TickSet,
};
use crate::weapons::{WeaponPlugin, WeaponRegistry};
use bevy::app::Plugins;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

/// Registers every tick stage.  Expects [`StatesPlugin`] (or `DefaultPlugins`)
/// to be present.
pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<RunPhase>()
            .init_resource::<ArenaConfig>()
            .init_resource::<SimClock>()
            .init_resource::<SimRng>();
        configure_tick_sets(app);

        app.add_plugins((
            PlayerPlugin,
            SpawnPlugin,
            WeaponPlugin,
            CombatPlugin,
            ProgressionPlugin,
        ))
        .add_systems(Update, advance_clock_system.in_set(TickSet::Clock))
        .add_systems(
            Update,
            (
                actor_pursuit_system,
                ranged_fire_system,
                hostile_bolt_motion_system,
                projectile_motion_system,
            )
                .chain()
                .in_set(TickSet::Simulate),
        );
    }
}

/// Input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    pub movement: Vec2,
    pub facing: f32,
}

impl From<TickInput> for PlayerIntent {
    fn from(input: TickInput) -> Self {
        PlayerIntent::new(input.movement, input.facing)
    }
}

pub struct Arena {
    app: App,
    events: Vec<CombatEvent>,
}

impl Arena {
    /// Build an arena and start the first run.
    ///
    /// `seed` makes the run reproducible; `None` seeds from entropy.
    pub fn new(
        config: ArenaConfig,
        registry: WeaponRegistry,
        seed: Option<u64>,
    ) -> ArenaResult<Self> {
        Self::assemble(App::new(), config, registry, seed)
    }

    /// Like [`Arena::new`], with extra plugins (e.g. `LogPlugin`) added ahead
    /// of the simulation.
    pub fn with_plugins<M>(
        plugins: impl Plugins<M>,
        config: ArenaConfig,
        registry: WeaponRegistry,
        seed: Option<u64>,
    ) -> ArenaResult<Self> {
        let mut app = App::new();
        app.add_plugins(plugins);
        Self::assemble(app, config, registry, seed)
    }

    fn assemble(
        mut app: App,
        config: ArenaConfig,
        registry: WeaponRegistry,
        seed: Option<u64>,
    ) -> ArenaResult<Self> {
        config.validate()?;
        registry.validate()?;
        registry.require(&config.starting_weapon)?;

        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_resource(config)
            .insert_resource(registry)
            .insert_resource(seed.map_or_else(SimRng::default, SimRng::seeded))
            .add_plugins(ArenaPlugin);

        control::reset_run(app.world_mut())?;
        Ok(Self {
            app,
            events: Vec::new(),
        })
    }

    /// Advance one tick with the given input.
    pub fn step(&mut self, input: TickInput) {
        self.app
            .world_mut()
            .insert_resource(PlayerIntent::from(input));
        self.app.update();
        self.collect_events();
    }

    pub fn phase(&self) -> RunPhase {
        control::current_phase(self.app.world())
    }

    pub fn pause(&mut self) -> bool {
        control::pause(self.app.world_mut())
    }

    pub fn resume(&mut self) -> bool {
        control::resume(self.app.world_mut())
    }

    /// Apply one of the pending level-up offers.
    pub fn choose_upgrade(&mut self, index: usize) -> ArenaResult<UpgradeOffer> {
        let offer = control::apply_upgrade(self.app.world_mut(), index)?;
        self.collect_events();
        Ok(offer)
    }

    pub fn reset(&mut self) -> ArenaResult<()> {
        control::reset_run(self.app.world_mut())?;
        self.collect_events();
        Ok(())
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        control::set_authenticated(self.app.world_mut(), authenticated);
    }

    pub fn snapshot(&mut self) -> ArenaSnapshot {
        capture(self.app.world_mut())
    }

    /// Every event raised since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.collect_events();
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &ArenaConfig {
        self.app.world().resource::<ArenaConfig>()
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    fn collect_events(&mut self) {
        if let Some(mut messages) = self
            .app
            .world_mut()
            .get_resource_mut::<Messages<CombatEvent>>()
        {
            self.events.extend(messages.drain());
        }
    }
}
