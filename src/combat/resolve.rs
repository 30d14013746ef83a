//! Resolve-stage systems, chained in this order by [`super::CombatPlugin`]:
//!
//! 1. [`resolve_impacts_system`] – queued blasts and direct strikes
//! 2. [`projectile_hit_system`] – projectile × actor contact
//! 3. [`prune_fallen_actors_system`] – despawn actors flagged dead
//! 4. [`player_contact_system`] – body contact with the player
//! 5. [`hostile_bolt_hit_system`] – ranged bullets hitting the player
//! 6. [`player_defeat_system`] – game over

use super::damage::{apply_trait_effects, detonate, strike_entity, ActorQuery, StrikeRules};
use super::{CombatEvent, CombatLedger, Impact};
use crate::actor::{Actor, HostileBolt};
use crate::body::{Position, Velocity};
use crate::config::ArenaConfig;
use crate::constants::*;
use crate::player::Player;
use crate::progression::Progression;
use crate::projectile::{Projectile, ProjectileKind};
use crate::state::{RunPhase, SimClock};
use crate::targeting::{circles_overlap, push_away};
use bevy::prelude::*;

/// Apply every [`Impact`] queued earlier in the tick.
pub fn resolve_impacts_system(
    mut commands: Commands,
    mut impacts: MessageReader<Impact>,
    mut actors: ActorQuery,
    q_player: Query<&Player>,
    config: Res<ArenaConfig>,
    mut clock: ResMut<SimClock>,
    mut events: MessageWriter<CombatEvent>,
) {
    let Ok(player) = q_player.single() else {
        impacts.clear();
        return;
    };
    let rules = StrikeRules::new(&config, player.position);
    let mut ledger = CombatLedger::default();

    for impact in impacts.read() {
        match impact {
            Impact::Blast {
                center,
                radius,
                damage,
                payload,
            } => detonate(
                &mut actors,
                *center,
                *radius,
                *damage,
                payload.as_ref(),
                &rules,
                &mut ledger,
            ),
            Impact::Strike {
                target,
                damage,
                payload,
            } => {
                strike_entity(&mut actors, *target, *damage, &rules, &mut ledger);
                if let Some(payload) = payload {
                    apply_trait_effects(&mut actors, *target, payload, &rules, &mut ledger);
                }
            }
        }
    }

    ledger.flush(&mut commands, &mut events, &mut clock);
}

#[derive(Clone, Copy)]
enum Contact {
    Bolt,
    Zone,
    Aura,
    Minion,
}

/// Projectile × actor contact for bolts, zones, auras, and minions.
///
/// Thrown bombs and beams have no contact behaviour.  Every actor is visited
/// in a fixed roster order captured before the pass, so an actor killed by
/// one projectile is skipped by every later one.
pub fn projectile_hit_system(
    mut commands: Commands,
    mut q_projectiles: Query<(Entity, &mut Projectile, &Position, &mut Velocity), Without<Actor>>,
    mut actors: ActorQuery,
    q_player: Query<&Player>,
    config: Res<ArenaConfig>,
    mut clock: ResMut<SimClock>,
    mut events: MessageWriter<CombatEvent>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    let rules = StrikeRules::new(&config, player.position);
    let field_tick = clock.on_interval(FIELD_TICK_INTERVAL);
    let roster: Vec<Entity> = actors.iter().map(|(entity, _, _)| entity).collect();
    let mut ledger = CombatLedger::default();

    for (entity, mut projectile, pos, mut vel) in q_projectiles.iter_mut() {
        let contact = match projectile.kind {
            ProjectileKind::Bolt { .. } => Contact::Bolt,
            ProjectileKind::Zone { .. } => Contact::Zone,
            ProjectileKind::Aura => Contact::Aura,
            ProjectileKind::Minion { .. } => Contact::Minion,
            ProjectileKind::Thrown { .. } | ProjectileKind::Beam { .. } => continue,
        };
        let projectile = projectile.into_inner();
        let here = pos.0;

        match contact {
            Contact::Bolt => {
                let consumed =
                    resolve_bolt(projectile, here, &roster, &mut actors, &rules, &mut ledger);
                if consumed {
                    commands.entity(entity).despawn();
                }
            }
            Contact::Zone | Contact::Aura => {
                for &target in &roster {
                    let Ok((_, actor, actor_pos)) = actors.get(target) else {
                        continue;
                    };
                    if !actor.is_targetable()
                        || actor_pos.0.distance_squared(here) >= projectile.radius * projectile.radius
                    {
                        continue;
                    }

                    if field_tick {
                        strike_entity(&mut actors, target, projectile.damage, &rules, &mut ledger);
                        hit_effects(projectile, here, target, &mut actors, &rules, &mut ledger);
                    }

                    if let Ok((_, _, mut actor_pos)) = actors.get_mut(target) {
                        actor_pos.0 = if matches!(contact, Contact::Zone) {
                            actor_pos.0 + (here - actor_pos.0) * ZONE_PULL_FRACTION
                        } else {
                            push_away(actor_pos.0, here, AURA_PUSH_DISTANCE)
                        };
                    }
                }
            }
            Contact::Minion => {
                for &target in &roster {
                    let ProjectileKind::Minion { bite_cooldown, .. } = &mut projectile.kind else {
                        break;
                    };
                    if *bite_cooldown > 0 {
                        break;
                    }
                    let Ok((_, actor, actor_pos)) = actors.get(target) else {
                        continue;
                    };
                    if !actor.is_targetable()
                        || !circles_overlap(here, projectile.radius, actor_pos.0, actor.radius)
                    {
                        continue;
                    }
                    let actor_at = actor_pos.0;

                    *bite_cooldown = MINION_BITE_COOLDOWN;
                    strike_entity(&mut actors, target, projectile.damage, &rules, &mut ledger);
                    vel.0 += (here - actor_at).normalize_or_zero() * MINION_RECOIL;
                }
            }
        }
    }

    ledger.flush(&mut commands, &mut events, &mut clock);
}

/// Bolt contact.  Returns `true` when the bolt is used up.
fn resolve_bolt(
    bolt: &mut Projectile,
    here: Vec2,
    roster: &[Entity],
    actors: &mut ActorQuery,
    rules: &StrikeRules,
    ledger: &mut CombatLedger,
) -> bool {
    for &target in roster {
        let Ok((_, actor, actor_pos)) = actors.get(target) else {
            continue;
        };
        if !actor.is_targetable()
            || !circles_overlap(here, bolt.radius, actor_pos.0, actor.radius)
        {
            continue;
        }
        if let ProjectileKind::Bolt { struck, .. } = &bolt.kind {
            if struck.contains(&target) {
                continue;
            }
        }

        strike_entity(actors, target, bolt.damage, rules, ledger);
        hit_effects(bolt, here, target, actors, rules, ledger);

        if let ProjectileKind::Bolt { pierce, struck, .. } = &mut bolt.kind {
            if *pierce == 0 {
                return true;
            }
            *pierce -= 1;
            struck.push(target);
        }
    }
    false
}

/// Trait effects for a contact hit; a spawned minion consumes the flag.
fn hit_effects(
    projectile: &mut Projectile,
    here: Vec2,
    target: Entity,
    actors: &mut ActorQuery,
    rules: &StrikeRules,
    ledger: &mut CombatLedger,
) {
    let payload = projectile.payload(here);
    apply_trait_effects(actors, target, &payload, rules, ledger);
    projectile.traits.minion = false;
}

/// Despawn every actor flagged dead during this tick.
pub fn prune_fallen_actors_system(mut commands: Commands, q_actors: Query<(Entity, &Actor)>) {
    for (entity, actor) in q_actors.iter() {
        if actor.dead {
            commands.entity(entity).despawn();
        }
    }
}

/// Body contact: every overlapping actor, boss included, drains health each
/// tick and is shoved away from the player.
pub fn player_contact_system(
    mut q_player: Query<&mut Player>,
    mut q_actors: Query<(&Actor, &mut Position)>,
    config: Res<ArenaConfig>,
    mut events: MessageWriter<CombatEvent>,
) {
    let Ok(mut player) = q_player.single_mut() else {
        return;
    };

    let mut taken = 0.0;
    for (actor, mut pos) in q_actors.iter_mut() {
        if actor.dead || !circles_overlap(player.position, player.radius, pos.0, actor.radius) {
            continue;
        }
        player.take_damage(config.contact_damage);
        taken += config.contact_damage;
        pos.0 = push_away(pos.0, player.position, config.contact_push);
    }

    if taken > 0.0 {
        events.write(CombatEvent::PlayerHurt {
            amount: taken,
            hp: player.hp,
        });
    }
}

/// Hostile bullets that overlap the player deal their damage and vanish.
pub fn hostile_bolt_hit_system(
    mut commands: Commands,
    mut q_player: Query<&mut Player>,
    q_bolts: Query<(Entity, &HostileBolt, &Position)>,
    mut events: MessageWriter<CombatEvent>,
) {
    let Ok(mut player) = q_player.single_mut() else {
        return;
    };

    for (entity, bolt, pos) in q_bolts.iter() {
        if !circles_overlap(player.position, player.radius, pos.0, bolt.radius) {
            continue;
        }
        player.take_damage(bolt.damage);
        commands.entity(entity).despawn();
        events.write(CombatEvent::PlayerHurt {
            amount: bolt.damage,
            hp: player.hp,
        });
    }
}

/// End the run once the player's health is gone.
pub fn player_defeat_system(
    q_player: Query<&Player>,
    clock: Res<SimClock>,
    progression: Res<Progression>,
    mut next: ResMut<NextState<RunPhase>>,
    mut events: MessageWriter<CombatEvent>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    if !player.is_defeated() {
        return;
    }

    info!(
        "Player defeated after {}s at level {}",
        clock.seconds, progression.level
    );
    next.set(RunPhase::Over);
    events.write(CombatEvent::PlayerDefeated {
        seconds: clock.seconds,
        level: progression.level,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Archetype;
    use crate::player::spawn_player;

    fn resolve_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<CombatEvent>();
        app.insert_resource(ArenaConfig::default());
        spawn_player(app.world_mut());
        app.add_systems(
            Update,
            (prune_fallen_actors_system, player_contact_system).chain(),
        );
        app
    }

    fn spawn_actor_at(app: &mut App, archetype: Archetype, at: Vec2) -> Entity {
        let stats = ArenaConfig::default().archetypes.get(archetype).clone();
        app.world_mut()
            .spawn((Actor::from_stats(archetype, &stats, 1.0, 0.0), Position(at)))
            .id()
    }

    fn player_hp(app: &mut App) -> f32 {
        let mut q = app.world_mut().query::<&Player>();
        q.single(app.world()).expect("one player").hp
    }

    #[test]
    fn fallen_actors_are_despawned() {
        let mut app = resolve_app();
        let fallen = spawn_actor_at(&mut app, Archetype::Basic, Vec2::ZERO);
        let standing = spawn_actor_at(&mut app, Archetype::Basic, Vec2::new(10.0, 0.0));
        app.world_mut()
            .get_mut::<Actor>(fallen)
            .expect("actor")
            .dead = true;
        app.update();
        assert!(app.world().get_entity(fallen).is_err());
        assert!(app.world().get_entity(standing).is_ok());
    }

    #[test]
    fn every_touching_actor_drains_and_is_shoved() {
        let mut app = resolve_app();
        let a = spawn_actor_at(&mut app, Archetype::Basic, Vec2::new(1500.0, 1510.0));
        let b = spawn_actor_at(&mut app, Archetype::Boss, Vec2::new(1600.0, 1500.0));
        app.update();

        assert_eq!(player_hp(&mut app), 98.0);
        assert_eq!(
            app.world().get::<Position>(a).map(|p| p.0),
            Some(Vec2::new(1500.0, 1560.0))
        );
        assert_eq!(
            app.world().get::<Position>(b).map(|p| p.0),
            Some(Vec2::new(1650.0, 1500.0)),
            "the boss is shoved too"
        );
    }
}
