//! Per-tick weapon cooldowns and emission.

use super::behavior::{advance_phase, aura_trait_burst, orbit_trait_burst, Behavior, EmitContext, Emission};
use super::registry::WeaponRegistry;
use super::traits::{cooldown_after_fire, effective_stats};
use super::Arsenal;
use crate::actor::Actor;
use crate::body::Position;
use crate::combat::Impact;
use crate::player::{Player, StatMultipliers};
use crate::projectile::spawn_projectile;
use crate::state::SimRng;
use crate::targeting::Sighting;
use bevy::prelude::*;

/// Count down every owned weapon and fire the ones that are ready.
///
/// A ready weapon resolves its effective stats from the synergies unlocked
/// right now, spawns the aura burst (if acquired), runs its behavior, spawns
/// the orbit burst (if acquired), and resets its cooldown.
pub fn weapon_fire_system(
    mut commands: Commands,
    mut arsenal: ResMut<Arsenal>,
    registry: Res<WeaponRegistry>,
    globals: Res<StatMultipliers>,
    q_player: Query<&Player>,
    q_actors: Query<(Entity, &Actor, &Position)>,
    mut rng: ResMut<SimRng>,
    mut impacts: MessageWriter<Impact>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    let targets: Vec<Sighting> = q_actors
        .iter()
        .filter(|(_, actor, _)| actor.is_targetable())
        .map(|(entity, _, pos)| Sighting {
            entity,
            position: pos.0,
        })
        .collect();

    let Arsenal { weapons, synergies } = &mut *arsenal;
    for weapon in weapons.iter_mut() {
        if weapon.level == 0 {
            continue;
        }
        weapon.cooldown -= 1.0;
        if weapon.cooldown > 0.0 {
            continue;
        }
        let Some(def) = registry.get(weapon.id) else {
            continue;
        };

        let acquired = synergies.acquired_traits(weapon.id, &registry);
        let eff = effective_stats(def, &acquired, &globals);

        if let Some(damage) = eff.aura_burst {
            spawn_projectile(
                &mut commands,
                aura_trait_burst(player.position, damage, weapon.id),
            );
        }

        if matches!(def.behavior, Behavior::Orbit { .. }) {
            weapon.phase = advance_phase(weapon.phase, &globals, eff.stats.speed);
        }
        let ctx = EmitContext {
            weapon: weapon.id,
            level: weapon.level,
            globals: &globals,
            origin: player.position,
            targets: &targets,
            phase: weapon.phase,
        };
        for emission in def.behavior.compute_emission(&ctx, &eff, &mut rng.0) {
            match emission {
                Emission::Spawn(seed) => {
                    spawn_projectile(&mut commands, seed);
                }
                Emission::Strike {
                    target,
                    damage,
                    payload,
                } => {
                    impacts.write(Impact::Strike {
                        target,
                        damage,
                        payload,
                    });
                }
            }
        }

        if eff.orbit_burst {
            let damage = eff.stats.damage * globals.damage;
            for seed in orbit_trait_burst(player.position, damage, weapon.id, &mut rng.0) {
                spawn_projectile(&mut commands, seed);
            }
        }

        weapon.cooldown = cooldown_after_fire(eff.stats.cooldown, globals.cooldown, weapon.level);
    }
}
