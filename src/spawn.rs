//! Spawn director: wave selection, difficulty scaling, and hostile spawning.
//!
//! The wave schedule is an ordered list of [`WaveEntry`]s keyed by survival
//! second.  The latest entry whose start time has been reached is active.
//! One actor spawns on the very first frame and then on every frame that is
//! a multiple of the active entry's interval, as long as the live population
//! is below the entry's cap.

use crate::actor::{spawn_actor, Actor};
use crate::combat::CombatEvent;
use crate::config::{ArenaConfig, WaveEntry};
use crate::player::Player;
use crate::progression::Progression;
use crate::state::{SimClock, SimRng, TickSet};
use crate::targeting::unit;
use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::f32::consts::TAU;

/// Director bookkeeping carried across ticks.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SpawnDirector {
    /// Index of the wave entry used on the last tick.
    pub active_wave: Option<usize>,
    pub total_spawned: u64,
}

/// The latest entry whose start time is at or before `seconds`.
pub fn active_wave_index(waves: &[WaveEntry], seconds: u32) -> Option<usize> {
    waves.iter().rposition(|w| w.time <= seconds)
}

/// Start time of the first entry strictly later than `seconds`.
pub fn next_wave_time(waves: &[WaveEntry], seconds: u32) -> Option<u32> {
    waves.iter().map(|w| w.time).find(|&t| t > seconds)
}

/// `level_base^level * (1 + seconds / period * time_slope)`.
pub fn difficulty_multiplier(config: &ArenaConfig, level: u32, seconds: u32) -> f32 {
    config.difficulty_level_base.powi(level as i32)
        * (1.0 + seconds as f32 / config.difficulty_period_secs * config.difficulty_time_slope)
}

#[inline]
pub fn spawn_due(frame: u64, interval: u32) -> bool {
    frame == 1 || (interval > 0 && frame % interval as u64 == 0)
}

/// A point `spawn_distance` from `center` along `angle`, clamped inside the
/// arena margin.
pub fn spawn_position(center: Vec2, angle: f32, config: &ArenaConfig) -> Vec2 {
    let low = Vec2::splat(config.spawn_margin);
    let high = Vec2::splat(config.map_size - config.spawn_margin);
    (center + unit(angle) * config.spawn_distance).clamp(low, high)
}

pub fn spawn_director_system(
    mut commands: Commands,
    clock: Res<SimClock>,
    config: Res<ArenaConfig>,
    progression: Res<Progression>,
    mut director: ResMut<SpawnDirector>,
    mut rng: ResMut<SimRng>,
    q_actors: Query<(), With<Actor>>,
    q_player: Query<&Player>,
    mut events: MessageWriter<CombatEvent>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    let Some(index) = active_wave_index(&config.waves, clock.seconds) else {
        return;
    };
    let wave = &config.waves[index];

    if director.active_wave != Some(index) {
        director.active_wave = Some(index);
        info!(
            "Wave {} active at {}s (interval {}, cap {})",
            index, wave.time, wave.interval, wave.max_population
        );
        events.write(CombatEvent::WaveChanged {
            index,
            time: wave.time,
        });
    }

    if !spawn_due(clock.frame, wave.interval) || q_actors.iter().count() >= wave.max_population {
        return;
    }
    let Some(&archetype) = wave.archetypes.choose(&mut rng.0) else {
        return;
    };

    let difficulty = difficulty_multiplier(&config, progression.level, clock.seconds);
    let actor = Actor::from_stats(
        archetype,
        config.archetypes.get(archetype),
        difficulty,
        rng.0.gen::<f32>(),
    );
    let angle = rng.0.gen_range(0.0..TAU);
    spawn_actor(
        &mut commands,
        actor,
        spawn_position(player.position, angle, &config),
    );
    director.total_spawned += 1;
    debug!("Spawned {archetype:?} (difficulty {difficulty:.2})");
}

pub struct SpawnPlugin;

impl Plugin for SpawnPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnDirector>()
            .add_systems(Update, spawn_director_system.in_set(TickSet::Spawn));
    }
}
