//! Read-only views of the arena for presentation layers.
//!
//! Everything here is plain data with `Serialize`, so a renderer or UI can
//! consume it without touching the ECS.  Entity ids are exported as
//! `Entity::to_bits()` so damage-number events can be matched to actors.

use crate::actor::{Actor, Archetype, HostileBolt};
use crate::body::Position;
use crate::config::ArenaConfig;
use crate::control::current_phase;
use crate::player::{Player, StatMultipliers};
use crate::progression::{Progression, RewardPickup, UpgradeOffer};
use crate::projectile::{Projectile, ProjectileKind};
use crate::spawn::next_wave_time;
use crate::state::{RunPhase, SimClock};
use crate::weapons::{Arsenal, WeaponId, WeaponRegistry};
use bevy::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub position: [f32; 2],
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub facing: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionView {
    pub level: u32,
    pub xp: f32,
    pub threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponView {
    pub key: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub level: u32,
    /// Ticks until the next fire.
    pub cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorView {
    pub id: u64,
    pub archetype: Archetype,
    pub position: [f32; 2],
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub visual: String,
    /// Draw with the hit flash.
    pub flashing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: u64,
    pub kind: &'static str,
    pub position: [f32; 2],
    pub radius: f32,
    /// Far end of a beam.
    pub endpoint: Option<[f32; 2]>,
    /// Emitting weapon's key.
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircleView {
    pub position: [f32; 2],
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupView {
    pub position: [f32; 2],
    pub value: f32,
}

/// Everything a frame needs to draw the arena.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArenaSnapshot {
    pub phase: RunPhase,
    pub frame: u64,
    pub seconds: u32,
    pub map_size: f32,
    /// Seconds until the next wave entry, if one remains.
    pub next_wave_in: Option<u32>,
    pub player: Option<PlayerView>,
    pub multipliers: StatMultipliers,
    pub progression: ProgressionView,
    /// Pending level-up choices.
    pub offers: Vec<UpgradeOffer>,
    pub weapons: Vec<WeaponView>,
    /// Unlocked synergies as weapon key pairs.
    pub synergies: Vec<(String, String)>,
    pub actors: Vec<ActorView>,
    pub projectiles: Vec<ProjectileView>,
    pub hostile_bolts: Vec<CircleView>,
    pub pickups: Vec<PickupView>,
}

fn xy(v: Vec2) -> [f32; 2] {
    [v.x, v.y]
}

/// Build a snapshot of the current world.
pub fn capture(world: &mut World) -> ArenaSnapshot {
    let mut q_player = world.query::<&Player>();
    let mut q_actors = world.query::<(Entity, &Actor, &Position)>();
    let mut q_projectiles = world.query::<(Entity, &Projectile, &Position)>();
    let mut q_bolts = world.query::<(&HostileBolt, &Position)>();
    let mut q_pickups = world.query::<(&RewardPickup, &Position)>();
    let world: &World = world;

    let player = q_player.iter(world).next().map(|p| PlayerView {
        position: xy(p.position),
        radius: p.radius,
        hp: p.hp,
        max_hp: p.max_hp,
        facing: p.facing,
    });

    let mut actors: Vec<ActorView> = q_actors
        .iter(world)
        .filter(|(_, actor, _)| !actor.dead)
        .map(|(entity, actor, pos)| ActorView {
            id: entity.to_bits(),
            archetype: actor.archetype,
            position: xy(pos.0),
            radius: actor.radius,
            hp: actor.hp,
            max_hp: actor.max_hp,
            visual: actor.visual.clone(),
            flashing: actor.flash > 0,
        })
        .collect();
    actors.sort_by_key(|a| a.id);

    let registry = world.resource::<WeaponRegistry>();
    let key_of = |id: WeaponId| registry.get(id).map(|def| def.key.clone());

    let mut projectiles: Vec<ProjectileView> = q_projectiles
        .iter(world)
        .map(|(entity, projectile, pos)| ProjectileView {
            id: entity.to_bits(),
            kind: projectile.kind.label(),
            position: xy(pos.0),
            radius: projectile.radius,
            endpoint: match projectile.kind {
                ProjectileKind::Beam { endpoint, .. } => Some(xy(endpoint)),
                _ => None,
            },
            source: projectile.source.and_then(key_of),
        })
        .collect();
    projectiles.sort_by_key(|p| p.id);

    let hostile_bolts = q_bolts
        .iter(world)
        .map(|(bolt, pos)| CircleView {
            position: xy(pos.0),
            radius: bolt.radius,
        })
        .collect();

    let pickups = q_pickups
        .iter(world)
        .map(|(pickup, pos)| PickupView {
            position: xy(pos.0),
            value: pickup.value,
        })
        .collect();

    let arsenal = world.resource::<Arsenal>();
    let weapons = arsenal
        .weapons
        .iter()
        .filter_map(|owned| {
            registry.get(owned.id).map(|def| WeaponView {
                key: def.key.clone(),
                name: def.name.clone(),
                icon: def.icon.clone(),
                color: def.color.clone(),
                level: owned.level,
                cooldown: owned.cooldown.max(0.0),
            })
        })
        .collect();
    let synergies = arsenal
        .synergies
        .iter()
        .filter_map(|pair| Some((key_of(pair.first)?, key_of(pair.second)?)))
        .collect();

    let clock = world.resource::<SimClock>();
    let config = world.resource::<ArenaConfig>();
    let progression = world.resource::<Progression>();

    ArenaSnapshot {
        phase: current_phase(world),
        frame: clock.frame,
        seconds: clock.seconds,
        map_size: config.map_size,
        next_wave_in: next_wave_time(&config.waves, clock.seconds).map(|t| t - clock.seconds),
        player,
        multipliers: *world.resource::<StatMultipliers>(),
        progression: ProgressionView {
            level: progression.level,
            xp: progression.xp,
            threshold: progression.threshold,
        },
        offers: progression.offers.clone(),
        weapons,
        synergies,
        actors,
        projectiles,
        hostile_bolts,
        pickups,
    }
}
