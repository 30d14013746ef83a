use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::env;
use std::f32::consts::FRAC_PI_2;

use survivor_arena::arena::{Arena, TickInput};
use survivor_arena::combat::CombatEvent;
use survivor_arena::config::load_arena_config;
use survivor_arena::state::RunPhase;
use survivor_arena::targeting::unit;
use survivor_arena::weapons::load_weapon_registry;

const CONFIG_PATH: &str = "assets/arena.toml";
const WEAPONS_PATH: &str = "assets/weapons.toml";
const DEFAULT_TICKS: u64 = 3600;

/// Radians the autopilot's heading turns per tick.  At the default player
/// speed this traces a circle of roughly 200 units.
const AUTOPILOT_TURN_RATE: f32 = 0.02;

/// Tallies across every run of this session.
#[derive(Debug, Default)]
struct RunSummary {
    runs: u32,
    kills: u32,
    damage_dealt: u64,
    best_level: u32,
    best_seconds: u32,
    synergies: u32,
}

impl RunSummary {
    fn record(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::Damage { amount, .. } => self.damage_dealt += *amount as u64,
            CombatEvent::ActorKilled { .. } => self.kills += 1,
            CombatEvent::LevelUp { level } => self.best_level = self.best_level.max(*level),
            CombatEvent::SynergyUnlocked { .. } => self.synergies += 1,
            CombatEvent::PlayerDefeated { seconds, level } => {
                self.runs += 1;
                self.best_seconds = self.best_seconds.max(*seconds);
                self.best_level = self.best_level.max(*level);
            }
            _ => {}
        }
    }
}

/// Walk in a slow circle, always facing the direction of travel.
fn autopilot(tick: u64) -> TickInput {
    let heading = tick as f32 * AUTOPILOT_TURN_RATE + FRAC_PI_2;
    TickInput {
        movement: unit(heading),
        facing: heading,
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

fn main() {
    let ticks: u64 = env_or("ARENA_TICKS", DEFAULT_TICKS);
    let seed: Option<u64> = env::var("ARENA_SEED").ok().and_then(|s| s.parse().ok());

    let config = load_arena_config(CONFIG_PATH);
    let registry = load_weapon_registry(WEAPONS_PATH);
    let mut arena = match Arena::with_plugins(LogPlugin::default(), config, registry, seed) {
        Ok(arena) => arena,
        Err(e) => {
            eprintln!("Arena setup failed: {e}");
            std::process::exit(1);
        }
    };
    info!("Running {ticks} ticks (seed {seed:?})");

    let mut summary = RunSummary::default();
    for tick in 0..ticks {
        match arena.phase() {
            RunPhase::Upgrade => match arena.choose_upgrade(0) {
                Ok(offer) => info!("Autopilot picked '{}'", offer.title()),
                Err(e) => {
                    warn!("Could not apply an upgrade: {e}");
                    break;
                }
            },
            RunPhase::Over => {
                if let Err(e) = arena.reset() {
                    warn!("Could not reset: {e}");
                    break;
                }
            }
            _ => {}
        }
        arena.step(autopilot(tick));
        for event in arena.drain_events() {
            summary.record(&event);
        }
    }

    let last = arena.snapshot();
    info!(
        "Finished: {} defeats, {} kills, {} damage dealt, best level {}, best survival {}s, {} synergies",
        summary.runs,
        summary.kills,
        summary.damage_dealt,
        summary.best_level.max(last.progression.level),
        summary.best_seconds.max(last.seconds),
        summary.synergies
    );
    info!(
        "Current run: {}s, level {}, hp {:.0}, {} actors alive",
        last.seconds,
        last.progression.level,
        last.player.map_or(0.0, |p| p.hp),
        last.actors.len()
    );
}
