//! Runtime arena configuration loaded from `assets/arena.toml`.
//!
//! [`ArenaConfig`] is a Bevy [`Resource`] that mirrors the tunables in
//! [`crate::constants`] and adds the two data tables the simulation is driven
//! by: the wave schedule and the archetype stat table.  [`load_arena_config`]
//! reads the TOML file and overwrites the defaults with any values present.
//! Missing keys fall back to the compile-time defaults, so a minimal TOML can
//! override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<ArenaConfig>` to any system parameter list and read values
//! with `config.spawn_distance`, `config.waves`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `ArenaConfig::default()`.

use crate::actor::Archetype;
use crate::constants::*;
use crate::error::{
    validate_fraction, validate_positive, validate_threshold_growth, ArenaError, ArenaResult,
};
use bevy::prelude::*;
use serde::Deserialize;

/// One row of the wave schedule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaveEntry {
    /// Survival second from which this entry is active.
    pub time: u32,
    /// Spawn one actor on frames divisible by this.
    pub interval: u32,
    /// Weighted archetype list; duplicates raise an archetype's odds.
    pub archetypes: Vec<Archetype>,
    /// No spawns while this many actors are alive.
    pub max_population: usize,
}

impl WaveEntry {
    pub fn new(time: u32, interval: u32, archetypes: &[Archetype], max_population: usize) -> Self {
        Self {
            time,
            interval,
            archetypes: archetypes.to_vec(),
            max_population,
        }
    }
}

/// Base stats for one archetype, before difficulty scaling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchetypeStats {
    pub hp: f32,
    /// Base movement per tick.
    pub speed: f32,
    /// Extra random speed in `[0, speed_jitter)` rolled per actor.
    #[serde(default)]
    pub speed_jitter: f32,
    pub radius: f32,
    /// Experience value of the pickup dropped on death.
    pub reward: f32,
    /// Presentation tag (an emoji glyph in the default table).
    pub visual: String,
    #[serde(default)]
    pub knockback_immune: bool,
}

/// Per-archetype base stats.  Missing archetypes keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArchetypeTable {
    pub basic: ArchetypeStats,
    pub tank: ArchetypeStats,
    pub dasher: ArchetypeStats,
    pub ranged: ArchetypeStats,
    pub boss: ArchetypeStats,
}

impl ArchetypeTable {
    pub fn get(&self, archetype: Archetype) -> &ArchetypeStats {
        match archetype {
            Archetype::Basic => &self.basic,
            Archetype::Tank => &self.tank,
            Archetype::Dasher => &self.dasher,
            Archetype::Ranged => &self.ranged,
            Archetype::Boss => &self.boss,
        }
    }
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        let stats = |hp: f32, speed: f32, jitter: f32, radius: f32, reward: f32, visual: &str| {
            ArchetypeStats {
                hp,
                speed,
                speed_jitter: jitter,
                radius,
                reward,
                visual: visual.to_string(),
                knockback_immune: false,
            }
        };
        Self {
            basic: stats(10.0, 2.0 * ACTOR_SPEED_FACTOR, ACTOR_SPEED_FACTOR, 15.0, 5.0, "👻"),
            tank: stats(40.0, ACTOR_SPEED_FACTOR, 0.0, 25.0, 20.0, "😡"),
            dasher: stats(15.0, 4.0 * ACTOR_SPEED_FACTOR, 0.0, 12.0, 10.0, "💸"),
            ranged: stats(20.0, 1.5 * ACTOR_SPEED_FACTOR, 0.0, 18.0, 15.0, "🧙"),
            boss: ArchetypeStats {
                knockback_immune: true,
                ..stats(50_000.0, 8.0, 0.0, 300.0, 500.0, "👹")
            },
        }
    }
}

/// The built-in five-entry wave schedule.
pub fn default_wave_schedule() -> Vec<WaveEntry> {
    use Archetype::*;
    vec![
        WaveEntry::new(0, 30, &[Basic], 50),
        WaveEntry::new(30, 20, &[Tank, Tank, Basic], 100),
        WaveEntry::new(60, 15, &[Dasher, Dasher, Tank, Basic], 200),
        WaveEntry::new(90, 10, &[Ranged, Ranged, Ranged, Tank, Dasher], 300),
        WaveEntry::new(120, 30, &[Boss], 400),
    ]
}

/// Runtime-tunable arena configuration.
///
/// All scalar fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset in `assets/arena.toml`.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    // ── Arena ─────────────────────────────────────────────────────────────────
    pub map_size: f32,
    pub ticks_per_second: u32,

    // ── Player ────────────────────────────────────────────────────────────────
    pub player_radius: f32,
    pub player_speed: f32,
    pub player_max_hp: f32,
    pub contact_damage: f32,
    pub contact_push: f32,
    /// Registry key of the weapon every run starts with.
    pub starting_weapon: String,

    // ── Spawn Director ────────────────────────────────────────────────────────
    pub spawn_distance: f32,
    pub spawn_margin: f32,
    pub difficulty_level_base: f32,
    pub difficulty_period_secs: f32,
    pub difficulty_time_slope: f32,

    // ── Ranged Archetype ──────────────────────────────────────────────────────
    pub ranged_hold_distance: f32,
    pub ranged_fire_range: f32,
    pub ranged_fire_period: u32,
    pub hostile_bolt_speed: f32,
    pub hostile_bolt_radius: f32,
    pub hostile_bolt_damage: f32,
    pub hostile_bolt_lifetime: u32,

    // ── Progression ───────────────────────────────────────────────────────────
    pub xp_first_threshold: f32,
    pub xp_threshold_growth: f32,
    pub xp_unauthenticated_rate: f32,
    pub magnet_radius: f32,
    pub magnet_pull_fraction: f32,
    pub offer_count: usize,

    // ── Hit Feedback ──────────────────────────────────────────────────────────
    pub strike_knockback: f32,
    pub strike_flash_ticks: u32,
    pub hit_stop_ticks: u32,
    pub hit_stop_damage_threshold: f32,

    // ── Data Tables ───────────────────────────────────────────────────────────
    pub waves: Vec<WaveEntry>,
    pub archetypes: ArchetypeTable,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            // Arena
            map_size: MAP_SIZE,
            ticks_per_second: TICKS_PER_SECOND,
            // Player
            player_radius: PLAYER_RADIUS,
            player_speed: PLAYER_SPEED,
            player_max_hp: PLAYER_MAX_HP,
            contact_damage: CONTACT_DAMAGE_PER_TICK,
            contact_push: CONTACT_PUSH_DISTANCE,
            starting_weapon: STARTING_WEAPON.to_string(),
            // Spawn Director
            spawn_distance: SPAWN_DISTANCE,
            spawn_margin: SPAWN_MARGIN,
            difficulty_level_base: DIFFICULTY_LEVEL_BASE,
            difficulty_period_secs: DIFFICULTY_PERIOD_SECS,
            difficulty_time_slope: DIFFICULTY_TIME_SLOPE,
            // Ranged
            ranged_hold_distance: RANGED_HOLD_DISTANCE,
            ranged_fire_range: RANGED_FIRE_RANGE,
            ranged_fire_period: RANGED_FIRE_PERIOD,
            hostile_bolt_speed: HOSTILE_BOLT_SPEED,
            hostile_bolt_radius: HOSTILE_BOLT_RADIUS,
            hostile_bolt_damage: HOSTILE_BOLT_DAMAGE,
            hostile_bolt_lifetime: HOSTILE_BOLT_LIFETIME,
            // Progression
            xp_first_threshold: XP_FIRST_THRESHOLD,
            xp_threshold_growth: XP_THRESHOLD_GROWTH,
            xp_unauthenticated_rate: XP_UNAUTHENTICATED_RATE,
            magnet_radius: MAGNET_RADIUS,
            magnet_pull_fraction: MAGNET_PULL_FRACTION,
            offer_count: OFFER_COUNT,
            // Hit Feedback
            strike_knockback: STRIKE_KNOCKBACK,
            strike_flash_ticks: STRIKE_FLASH_TICKS,
            hit_stop_ticks: HIT_STOP_TICKS,
            hit_stop_damage_threshold: HIT_STOP_DAMAGE_THRESHOLD,
            // Data Tables
            waves: default_wave_schedule(),
            archetypes: ArchetypeTable::default(),
        }
    }
}

impl ArenaConfig {
    /// Parse a TOML document, falling back to defaults for missing keys.
    pub fn from_toml_str(contents: &str, origin: &str) -> ArenaResult<Self> {
        toml::from_str::<ArenaConfig>(contents).map_err(|e| ArenaError::ConfigParse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Check every tunable the tick relies on.
    ///
    /// The wave schedule must be non-empty, ordered by start time, and every
    /// entry needs a non-zero interval and at least one archetype.
    pub fn validate(&self) -> ArenaResult<()> {
        validate_positive("map_size", self.map_size)?;
        validate_positive("ticks_per_second", self.ticks_per_second as f32)?;
        validate_positive("player_radius", self.player_radius)?;
        validate_positive("player_max_hp", self.player_max_hp)?;
        validate_positive("spawn_distance", self.spawn_distance)?;
        validate_positive("difficulty_level_base", self.difficulty_level_base)?;
        validate_positive("difficulty_period_secs", self.difficulty_period_secs)?;
        validate_positive("xp_first_threshold", self.xp_first_threshold)?;
        validate_threshold_growth(self.xp_threshold_growth)?;
        validate_fraction("xp_unauthenticated_rate", self.xp_unauthenticated_rate)?;
        validate_fraction("magnet_pull_fraction", self.magnet_pull_fraction)?;
        validate_positive("offer_count", self.offer_count as f32)?;
        if self.spawn_margin * 2.0 >= self.map_size {
            return Err(ArenaError::UnsafeTunable {
                name: "spawn_margin",
                value: self.spawn_margin,
                safe_range: "[0.0, map_size / 2)",
            });
        }

        if self.waves.is_empty() {
            return Err(ArenaError::EmptyWaveSchedule);
        }
        for (index, wave) in self.waves.iter().enumerate() {
            if wave.interval == 0 {
                return Err(ArenaError::MalformedWave {
                    index,
                    reason: "spawn interval must be at least one tick",
                });
            }
            if wave.archetypes.is_empty() {
                return Err(ArenaError::MalformedWave {
                    index,
                    reason: "archetype list is empty",
                });
            }
            if index > 0 && wave.time < self.waves[index - 1].time {
                return Err(ArenaError::MalformedWave {
                    index,
                    reason: "starts before the previous entry",
                });
            }
        }
        Ok(())
    }
}

/// Read `path` and parse it as an [`ArenaConfig`].
pub fn read_arena_config(path: &str) -> ArenaResult<ArenaConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ArenaError::ConfigRead {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    ArenaConfig::from_toml_str(&contents, path)
}

/// Load `path`, falling back to compiled defaults.
///
/// A missing file is not an error.  Parse and validation errors are logged
/// and the defaults are used instead, so a bad edit never prevents a run.
pub fn load_arena_config(path: &str) -> ArenaConfig {
    if !std::path::Path::new(path).exists() {
        info!("No {path} found; using compiled defaults");
        return ArenaConfig::default();
    }
    match read_arena_config(path).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => {
            info!("Loaded arena config from {path}");
            config
        }
        Err(e) => {
            warn!("{e}; using defaults");
            ArenaConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ArenaConfig::default()
            .validate()
            .expect("compiled defaults must be valid");
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = ArenaConfig::from_toml_str(
            r#"
                map_size = 2000.0
                magnet_radius = 150.0
            "#,
            "inline",
        )
        .expect("valid toml");
        assert_eq!(cfg.map_size, 2000.0);
        assert_eq!(cfg.magnet_radius, 150.0);
        assert_eq!(cfg.spawn_distance, SPAWN_DISTANCE);
        assert_eq!(cfg.waves.len(), 5);
        assert_eq!(cfg.archetypes.tank.hp, 40.0);
    }

    #[test]
    fn wave_schedule_and_single_archetype_override() {
        let cfg = ArenaConfig::from_toml_str(
            r#"
                [[waves]]
                time = 0
                interval = 45
                archetypes = ["basic", "dasher"]
                max_population = 10

                [archetypes.tank]
                hp = 80.0
                speed = 0.3
                radius = 30.0
                reward = 40.0
                visual = "T"
            "#,
            "inline",
        )
        .expect("valid toml");
        assert_eq!(cfg.waves.len(), 1);
        assert_eq!(cfg.waves[0].archetypes, vec![Archetype::Basic, Archetype::Dasher]);
        assert_eq!(cfg.archetypes.tank.hp, 80.0);
        assert_eq!(cfg.archetypes.basic.hp, 10.0, "untouched archetypes keep defaults");
        cfg.validate().expect("still valid");
    }

    #[test]
    fn malformed_waves_are_rejected() {
        let mut cfg = ArenaConfig::default();
        cfg.waves.clear();
        assert_eq!(cfg.validate(), Err(ArenaError::EmptyWaveSchedule));

        let mut cfg = ArenaConfig::default();
        cfg.waves[2].interval = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ArenaError::MalformedWave { index: 2, .. })
        ));

        let mut cfg = ArenaConfig::default();
        cfg.waves.swap(1, 3);
        assert!(matches!(
            cfg.validate(),
            Err(ArenaError::MalformedWave { .. })
        ));
    }

    #[test]
    fn zero_offers_is_rejected() {
        let mut cfg = ArenaConfig::default();
        cfg.offer_count = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ArenaError::UnsafeTunable {
                name: "offer_count",
                ..
            })
        ));
    }

    #[test]
    fn garbage_toml_is_a_parse_error() {
        let err = ArenaConfig::from_toml_str("map_size = \"wide\"", "inline").unwrap_err();
        assert!(matches!(err, ArenaError::ConfigParse { .. }));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load_arena_config("definitely/not/here.toml");
        assert_eq!(cfg, ArenaConfig::default());
    }
}
