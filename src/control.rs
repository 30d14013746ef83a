//! Run control: reset, pause/resume, applying an upgrade choice.
//!
//! These operate on the `World` directly because they are invoked from
//! outside the tick by whatever drives the arena.  Phase changes go through
//! `NextState`, so they take effect at the start of the next update;
//! [`current_phase`] reports the pending phase when one is queued.

use crate::body::ArenaEntity;
use crate::combat::{CombatEvent, Impact};
use crate::config::ArenaConfig;
use crate::error::{ArenaError, ArenaResult};
use crate::player::{spawn_player, PlayerIntent, StatMultipliers};
use crate::progression::{Authentication, Progression, UpgradeOffer};
use crate::spawn::SpawnDirector;
use crate::state::{RunPhase, SimClock};
use crate::weapons::{Arsenal, WeaponId, WeaponRegistry};
use bevy::prelude::*;

/// The phase the arena is in, or is about to enter on the next update.
pub fn current_phase(world: &World) -> RunPhase {
    if let Some(NextState::Pending(next)) = world.get_resource::<NextState<RunPhase>>() {
        return *next;
    }
    world
        .get_resource::<State<RunPhase>>()
        .map(|state| *state.get())
        .unwrap_or_default()
}

/// Start a fresh run.
///
/// Every arena entity is despawned, the player is respawned at the centre,
/// the clock, experience, multipliers and director are reset, and the
/// arsenal goes back to the starting weapon at level 1.  The RNG stream and
/// the authentication flag survive.
pub fn reset_run(world: &mut World) -> ArenaResult<()> {
    let starting = {
        let config = world.resource::<ArenaConfig>();
        world
            .resource::<WeaponRegistry>()
            .require(&config.starting_weapon)?
    };

    let stale: Vec<Entity> = world
        .query_filtered::<Entity, With<ArenaEntity>>()
        .iter(world)
        .collect();
    let despawned = stale.len();
    for entity in stale {
        world.despawn(entity);
    }

    let progression = Progression::from_config(world.resource::<ArenaConfig>());
    world.insert_resource(progression);
    world.insert_resource(SimClock::default());
    world.insert_resource(StatMultipliers::default());
    world.insert_resource(PlayerIntent::default());
    world.insert_resource(SpawnDirector::default());
    world.insert_resource(Arsenal::starting(starting));
    spawn_player(world);

    if let Some(mut impacts) = world.get_resource_mut::<Messages<Impact>>() {
        impacts.clear();
    }
    world
        .resource_mut::<NextState<RunPhase>>()
        .set(RunPhase::Playing);
    info!("Run reset ({despawned} entities cleared)");
    Ok(())
}

/// `Playing → Paused`.  Returns whether anything changed.
pub fn pause(world: &mut World) -> bool {
    if current_phase(world) != RunPhase::Playing {
        return false;
    }
    world
        .resource_mut::<NextState<RunPhase>>()
        .set(RunPhase::Paused);
    true
}

/// `Paused → Playing`.  Returns whether anything changed.
pub fn resume(world: &mut World) -> bool {
    if current_phase(world) != RunPhase::Paused {
        return false;
    }
    world
        .resource_mut::<NextState<RunPhase>>()
        .set(RunPhase::Playing);
    true
}

/// Apply offer `index` from the pending level-up and return to play.
///
/// Nothing changes when no level-up is pending or the index is out of range.
pub fn apply_upgrade(world: &mut World, index: usize) -> ArenaResult<UpgradeOffer> {
    if current_phase(world) != RunPhase::Upgrade {
        return Err(ArenaError::NotAwaitingUpgrade);
    }
    let offer = {
        let offers = &world.resource::<Progression>().offers;
        offers
            .get(index)
            .cloned()
            .ok_or(ArenaError::UpgradeIndexOutOfRange {
                index,
                offered: offers.len(),
            })?
    };

    let event = match &offer {
        UpgradeOffer::Weapon { weapon, key, .. } => {
            let level = world.resource_mut::<Arsenal>().grant(*weapon);
            info!("Weapon {key} now at level {level}");
            Some(CombatEvent::WeaponGained {
                key: key.clone(),
                level,
            })
        }
        UpgradeOffer::Synergy { pair, title, .. } => {
            if world.resource_mut::<Arsenal>().synergies.unlock(*pair) {
                info!("Synergy unlocked: {title}");
                let registry = world.resource::<WeaponRegistry>();
                let key = |id: WeaponId| {
                    registry
                        .get(id)
                        .map(|def| def.key.clone())
                        .unwrap_or_default()
                };
                Some(CombatEvent::SynergyUnlocked {
                    first: key(pair.first),
                    second: key(pair.second),
                })
            } else {
                None
            }
        }
    };
    if let Some(event) = event {
        world.write_message(event);
    }

    {
        let mut progression = world.resource_mut::<Progression>();
        progression.level += 1;
        progression.offers.clear();
    }
    world
        .resource_mut::<NextState<RunPhase>>()
        .set(RunPhase::Playing);
    Ok(offer)
}

pub fn set_authenticated(world: &mut World, authenticated: bool) {
    world.resource_mut::<Authentication>().authenticated = authenticated;
}
