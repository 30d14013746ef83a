//! Centralised arena and combat constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! Values in the first half mirror fields of [`crate::config::ArenaConfig`]
//! and are the authoritative defaults for it.  The trait and side-effect
//! constants further down are fixed game rules and are not exposed in the
//! TOML file.
//!
//! Time is measured in **ticks**; one tick is one `App::update()`.

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Side length of the square arena (world units).  Positions live in `[0, MAP_SIZE]²`.
pub const MAP_SIZE: f32 = 3000.0;

/// Simulation ticks per survival second.
pub const TICKS_PER_SECOND: u32 = 60;

// ── Player ────────────────────────────────────────────────────────────────────

/// Collision radius of the player.  Also the pickup collection radius.
pub const PLAYER_RADIUS: f32 = 10.0;

/// Player movement per tick at full intent magnitude, before the speed multiplier.
pub const PLAYER_SPEED: f32 = 4.0;

/// Starting and maximum player health.
pub const PLAYER_MAX_HP: f32 = 100.0;

/// Health lost per tick while any hostile actor overlaps the player.
///
/// No contact cooldown: large or stacked actors drain
/// health every tick they stay in contact.
pub const CONTACT_DAMAGE_PER_TICK: f32 = 1.0;

/// Distance a hostile actor is shoved away from the player on body contact.
pub const CONTACT_PUSH_DISTANCE: f32 = 50.0;

/// Registry key of the weapon every run starts with at level 1.
pub const STARTING_WEAPON: &str = "content";

// ── Spawn Director ────────────────────────────────────────────────────────────

/// Distance from the player at which new hostile actors appear.
///
/// Measured from the player, not the viewport, so actors always enter from
/// just outside a typical screen.
pub const SPAWN_DISTANCE: f32 = 700.0;

/// Spawned positions are clamped into `[SPAWN_MARGIN, MAP_SIZE - SPAWN_MARGIN]`.
pub const SPAWN_MARGIN: f32 = 50.0;

/// Base of the exponential level term in the difficulty multiplier.
///
/// `difficulty = DIFFICULTY_LEVEL_BASE^level * (1 + seconds / DIFFICULTY_PERIOD_SECS * DIFFICULTY_TIME_SLOPE)`
pub const DIFFICULTY_LEVEL_BASE: f32 = 1.08;

/// Survival seconds per unit of the linear time term.
pub const DIFFICULTY_PERIOD_SECS: f32 = 60.0;

/// Growth of the linear time term per `DIFFICULTY_PERIOD_SECS`.
pub const DIFFICULTY_TIME_SLOPE: f32 = 0.8;

/// Global speed factor applied to every non-boss archetype's base speed.
pub const ACTOR_SPEED_FACTOR: f32 = 0.45;

// ── Ranged Archetype ──────────────────────────────────────────────────────────

/// Ranged actors stop advancing once they are this close to the player.
pub const RANGED_HOLD_DISTANCE: f32 = 200.0;

/// Ranged actors only open fire when the player is within this distance.
pub const RANGED_FIRE_RANGE: f32 = 900.0;

/// Ticks between consecutive ranged shots.
pub const RANGED_FIRE_PERIOD: u32 = 240;

/// Hostile bullet speed (units per tick).
pub const HOSTILE_BOLT_SPEED: f32 = 2.0;

/// Hostile bullet collision radius.
pub const HOSTILE_BOLT_RADIUS: f32 = 8.0;

/// Damage a hostile bullet deals to the player.
pub const HOSTILE_BOLT_DAMAGE: f32 = 10.0;

/// Ticks a hostile bullet survives before expiring.
pub const HOSTILE_BOLT_LIFETIME: u32 = 300;

// ── Progression ───────────────────────────────────────────────────────────────

/// Experience required for the first level-up.
pub const XP_FIRST_THRESHOLD: f32 = 10.0;

/// Multiplier applied to the threshold after each level-up (result rounded up).
pub const XP_THRESHOLD_GROWTH: f32 = 1.5;

/// Fraction of a pickup's value granted when the player is not authenticated.
pub const XP_UNAUTHENTICATED_RATE: f32 = 0.5;

/// Pickups inside this radius drift toward the player.
pub const MAGNET_RADIUS: f32 = 100.0;

/// Fraction of the remaining gap a magnetised pickup closes each tick.
pub const MAGNET_PULL_FRACTION: f32 = 0.1;

/// Number of upgrade offers presented on each level-up.
pub const OFFER_COUNT: usize = 3;

// ── Hit Feedback ──────────────────────────────────────────────────────────────

/// Distance an actor is pushed away from the player when struck.
pub const STRIKE_KNOCKBACK: f32 = 5.0;

/// Ticks the hit-flash flag stays set after a strike.
pub const STRIKE_FLASH_TICKS: u32 = 5;

/// Ticks of global hit-stop after a heavy or killing strike.
pub const HIT_STOP_TICKS: u32 = 3;

/// Strikes dealing strictly more than this trigger hit-stop.
pub const HIT_STOP_DAMAGE_THRESHOLD: f32 = 10.0;

// ── Area Effects ──────────────────────────────────────────────────────────────

/// Zones and auras re-damage contained actors on frames divisible by this.
pub const FIELD_TICK_INTERVAL: u32 = 10;

/// Fraction of the gap to a zone's centre an actor is pulled each tick.
pub const ZONE_PULL_FRACTION: f32 = 0.05;

/// Distance an aura pushes each contained actor per tick.
pub const AURA_PUSH_DISTANCE: f32 = 0.5;

// ── Projectile Behaviour ──────────────────────────────────────────────────────

/// Radius used by bolts whose stat block has no explicit radius.
pub const DEFAULT_BOLT_RADIUS: f32 = 5.0;

/// Per-tick steering acceleration of homing bolts.
pub const HOMING_ACCEL: f32 = 0.5;

/// Homing bolts faster than this are damped each tick.
pub const HOMING_MAX_SPEED: f32 = 8.0;

/// Damping factor applied to over-speed homing bolts.
pub const HOMING_DAMPING: f32 = 0.9;

/// Ticks between drip volleys from a dripping zone.
pub const DRIP_INTERVAL: u32 = 60;

/// Bolts per drip volley.
pub const DRIP_SHARDS: u32 = 3;

/// Angular spacing between drip bolts (radians).
pub const DRIP_SPACING: f32 = 0.4;

pub const DRIP_SPEED: f32 = 8.0;
pub const DRIP_DAMAGE: f32 = 5.0;
pub const DRIP_LIFETIME: u32 = 30;
pub const DRIP_RADIUS: f32 = 4.0;

/// Ticks between melee bites of a minion.
pub const MINION_BITE_COOLDOWN: u32 = 30;

/// Recoil speed a minion receives away from the actor it just bit.
pub const MINION_RECOIL: f32 = 5.0;

/// Collision radius of summoned minions.
pub const MINION_RADIUS: f32 = 8.0;

/// Minimum flight time (ticks) of a thrown entity.
pub const THROW_MIN_FLIGHT: u32 = 30;

/// Thrown entities pick a random actor within this distance of the player.
pub const THROW_TARGET_RANGE: f32 = 600.0;

/// Half-width of the random landing square used when no actor is in range.
pub const THROW_SCATTER: f32 = 150.0;

/// Random placement half-extents of zone fields around the player.
pub const FIELD_SCATTER_X: f32 = 200.0;
pub const FIELD_SCATTER_Y: f32 = 150.0;

/// Lifetime of the beam spawned by the beam behaviour.
pub const BEAM_LIFETIME: u32 = 20;

/// Multiplier on the beam behaviour's immediate strike.
pub const BEAM_STRIKE_FACTOR: f32 = 5.0;

/// Orbit phase advance per fire, before speed scaling.
pub const ORBIT_PHASE_STEP: f32 = 0.03;

/// Collision radius of orbiting hits.
pub const ORBIT_HIT_RADIUS: f32 = 8.0;

/// Aura radius at level 0 and its growth per level, before area scaling.
pub const AURA_BASE_RADIUS: f32 = 60.0;
pub const AURA_RADIUS_PER_LEVEL: f32 = 10.0;

/// Reference area the aura and orbit radii are normalised against.
pub const AURA_REFERENCE_AREA: f32 = 60.0;

/// Orbit hits and auras are re-emitted every fire and live only this long.
pub const REFRESHED_FIELD_LIFETIME: u32 = 2;

/// Fallback speed for thrown bombs whose weapon has no speed stat.
pub const THROW_FALLBACK_SPEED: f32 = 4.0;

// ── Trait Modifiers ───────────────────────────────────────────────────────────

pub const RAPID_COOLDOWN_FACTOR: f32 = 0.5;
pub const RAPID_EXTRA_COUNT: u32 = 2;
pub const RAPID_SPEED_FACTOR: f32 = 1.5;

pub const HEAVY_DAMAGE_FACTOR: f32 = 2.0;
pub const HEAVY_RADIUS_FACTOR: f32 = 1.5;
/// Radius assumed by the heavy modifier when the stat block has none.
pub const HEAVY_FALLBACK_RADIUS: f32 = 10.0;
/// Pierce granted by the heavy modifier; effectively unlimited.
pub const HEAVY_PIERCE: u32 = 999;

pub const SPREAD_EXTRA_COUNT: u32 = 4;
pub const SPREAD_EXTRA_ANGLE: f32 = 0.8;

pub const HOMING_SPEED_FACTOR: f32 = 1.2;

pub const EXPLOSIVE_DAMAGE_FACTOR: f32 = 1.2;

/// Extra aura spawned by the aura trait at fire time.
pub const AURA_TRAIT_RADIUS: f32 = 100.0;
pub const AURA_TRAIT_DAMAGE_FACTOR: f32 = 0.8;
pub const AURA_TRAIT_LIFETIME: u32 = 20;

/// Orbiting hits spawned by the orbit trait at fire time.
pub const ORBIT_TRAIT_HITS: u32 = 3;
pub const ORBIT_TRAIT_DISTANCE: f32 = 60.0;
pub const ORBIT_TRAIT_DISTANCE_JITTER: f32 = 20.0;
pub const ORBIT_TRAIT_RADIUS: f32 = 12.0;
pub const ORBIT_TRAIT_LIFETIME: u32 = 60;

// ── On-hit Side Effects ───────────────────────────────────────────────────────

/// Blast radius of the explosive side effect.
pub const EXPLOSIVE_BLAST_RADIUS: f32 = 40.0;

/// Fraction of the carrier's damage dealt by the explosive side effect.
pub const EXPLOSIVE_BLAST_FRACTION: f32 = 0.5;

pub const LEFTOVER_ZONE_RADIUS: f32 = 30.0;
pub const LEFTOVER_ZONE_FRACTION: f32 = 0.3;
pub const LEFTOVER_ZONE_LIFETIME: u32 = 60;

pub const SPAWNED_MINION_FRACTION: f32 = 0.5;
pub const SPAWNED_MINION_LIFETIME: u32 = 120;
pub const SPAWNED_MINION_SPEED: f32 = 4.0;

/// Lifetime of the tracking beam left by the lock-on side effect.
pub const LOCKON_BEAM_LIFETIME: u32 = 10;

/// Fraction of the carrier's damage dealt immediately by the lock-on side effect.
pub const LOCKON_STRIKE_FRACTION: f32 = 0.5;
