//! Strikes, explosions, and on-hit trait effects.
//!
//! These helpers work on an [`ActorQuery`] borrowed from whichever resolve
//! system is running, and write their side effects into a [`CombatLedger`].

use super::{CombatEvent, CombatLedger, HitPayload};
use crate::actor::Actor;
use crate::body::Position;
use crate::config::ArenaConfig;
use crate::constants::*;
use crate::projectile::{Projectile, ProjectileKind, ProjectileSeed};
use crate::targeting::push_away;
use bevy::prelude::*;

/// Mutable view of every hostile actor.
pub type ActorQuery<'w, 's> =
    Query<'w, 's, (Entity, &'static mut Actor, &'static mut Position), Without<Projectile>>;

/// Hit-feedback tunables plus the knockback origin for this system run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeRules {
    pub player_position: Vec2,
    pub knockback: f32,
    pub flash_ticks: u32,
    pub hit_stop_ticks: u32,
    pub hit_stop_threshold: f32,
}

impl StrikeRules {
    pub fn new(config: &ArenaConfig, player_position: Vec2) -> Self {
        Self {
            player_position,
            knockback: config.strike_knockback,
            flash_ticks: config.strike_flash_ticks,
            hit_stop_ticks: config.hit_stop_ticks,
            hit_stop_threshold: config.hit_stop_damage_threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// Boss or already dead; nothing changed.
    Ignored,
    Hit,
    Killed,
}

/// Deal `amount` to one actor.
///
/// Bosses and dead actors are untouched.  Otherwise the actor flashes, is
/// knocked away from the player unless immune, and on reaching zero health is
/// flagged dead and drops its reward.
pub fn strike(
    entity: Entity,
    actor: &mut Actor,
    position: &mut Vec2,
    amount: f32,
    rules: &StrikeRules,
    ledger: &mut CombatLedger,
) -> StrikeOutcome {
    if !actor.is_targetable() {
        return StrikeOutcome::Ignored;
    }

    actor.hp -= amount;
    actor.flash = rules.flash_ticks;
    ledger.events.push(CombatEvent::Damage {
        target: entity,
        position: *position,
        amount: amount.max(0.0).ceil() as u32,
    });
    if !actor.knockback_immune {
        *position = push_away(*position, rules.player_position, rules.knockback);
    }

    let killed = actor.hp <= 0.0;
    if amount > rules.hit_stop_threshold || killed {
        ledger.request_hit_stop(rules.hit_stop_ticks);
    }
    if !killed {
        return StrikeOutcome::Hit;
    }

    actor.dead = true;
    ledger.events.push(CombatEvent::ActorKilled {
        archetype: actor.archetype,
        position: *position,
        reward: actor.reward,
    });
    ledger.pickups.push((*position, actor.reward));
    StrikeOutcome::Killed
}

/// [`strike`] the actor behind `target`, if it still exists.
pub fn strike_entity(
    actors: &mut ActorQuery,
    target: Entity,
    amount: f32,
    rules: &StrikeRules,
    ledger: &mut CombatLedger,
) -> StrikeOutcome {
    match actors.get_mut(target) {
        Ok((entity, mut actor, mut pos)) => strike(entity, &mut actor, &mut pos.0, amount, rules, ledger),
        Err(_) => StrikeOutcome::Ignored,
    }
}

/// Area damage: strike every live non-boss actor strictly inside `radius`.
///
/// With a `payload`, every caught actor also receives its trait effects.
/// Always emits exactly one blast event, even if nothing was caught.
pub fn detonate(
    actors: &mut ActorQuery,
    center: Vec2,
    radius: f32,
    damage: f32,
    payload: Option<&HitPayload>,
    rules: &StrikeRules,
    ledger: &mut CombatLedger,
) {
    ledger.events.push(CombatEvent::Blast { center, radius });

    let r2 = radius * radius;
    let caught: Vec<Entity> = actors
        .iter()
        .filter(|(_, actor, pos)| actor.is_targetable() && pos.0.distance_squared(center) < r2)
        .map(|(entity, _, _)| entity)
        .collect();

    for entity in caught {
        strike_entity(actors, entity, damage, rules, ledger);
        if let Some(payload) = payload {
            apply_trait_effects(actors, entity, payload, rules, ledger);
        }
    }
}

/// Run the on-hit effects of `payload` against `target`.
///
/// Effects spawned here carry no trait flags of their own, so they never
/// chain.  The caller is responsible for clearing a consumed `minion` flag on
/// the carrying entity.
pub fn apply_trait_effects(
    actors: &mut ActorQuery,
    target: Entity,
    payload: &HitPayload,
    rules: &StrikeRules,
    ledger: &mut CombatLedger,
) {
    let flags = payload.flags;
    if !flags.any() {
        return;
    }

    if flags.explosive {
        detonate(
            actors,
            payload.origin,
            EXPLOSIVE_BLAST_RADIUS,
            payload.damage * EXPLOSIVE_BLAST_FRACTION,
            None,
            rules,
            ledger,
        );
    }

    let Ok((_, _, pos)) = actors.get(target) else {
        return;
    };
    let at = pos.0;

    if flags.leave_zone {
        ledger.spawns.push(ProjectileSeed::at_rest(
            at,
            Projectile::new(
                payload.damage * LEFTOVER_ZONE_FRACTION,
                LEFTOVER_ZONE_RADIUS,
                LEFTOVER_ZONE_LIFETIME,
                ProjectileKind::Zone { drip: None },
            ),
        ));
    }
    if flags.minion {
        ledger.spawns.push(ProjectileSeed::at_rest(
            at,
            Projectile::new(
                payload.damage * SPAWNED_MINION_FRACTION,
                MINION_RADIUS,
                SPAWNED_MINION_LIFETIME,
                ProjectileKind::Minion {
                    speed: SPAWNED_MINION_SPEED,
                    bite_cooldown: 0,
                },
            ),
        ));
    }
    if flags.lockon {
        ledger.spawns.push(ProjectileSeed::at_rest(
            rules.player_position,
            Projectile::new(
                0.0,
                0.0,
                LOCKON_BEAM_LIFETIME,
                ProjectileKind::Beam {
                    target,
                    endpoint: at,
                },
            ),
        ));
        strike_entity(
            actors,
            target,
            payload.damage * LOCKON_STRIKE_FRACTION,
            rules,
            ledger,
        );
    }
}
