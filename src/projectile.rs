//! Player-owned projectiles, zones, auras, minions, and beams.
//!
//! Everything a weapon emits is a [`Projectile`] entity.  Shared fields
//! (damage, radius, lifetime, on-hit [`TraitFlags`]) live on the component;
//! per-variant state lives in [`ProjectileKind`].  Contact resolution is in
//! [`crate::combat::resolve`]; this module only ages and moves them.

use crate::actor::Actor;
use crate::body::{ArenaEntity, Position, Velocity};
use crate::combat::{HitPayload, Impact};
use crate::constants::*;
use crate::player::StatMultipliers;
use crate::state::SimRng;
use crate::targeting::{aim_angle, nearest, unit, Sighting};
use crate::weapons::{TraitFlags, WeaponId};
use bevy::prelude::*;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileKind {
    /// Straight-flying shot.  Orbit hits are bolts with no velocity.
    Bolt {
        /// Remaining extra hits.  Zero means the next hit consumes the bolt.
        pierce: u32,
        homing: bool,
        /// Actors already hit while piercing.
        struck: Vec<Entity>,
    },
    /// Lobbed bomb; detonates at `landing` when its flight time runs out.
    Thrown { landing: Vec2, blast_radius: f32 },
    /// Stationary damage field.  `drip` holds the shard timer when enabled.
    Zone { drip: Option<u32> },
    /// Field that pushes actors outward.
    Aura,
    /// Autonomous biter.
    Minion { speed: f32, bite_cooldown: u32 },
    /// Visual tether to an actor that was struck directly.
    Beam { target: Entity, endpoint: Vec2 },
}

impl ProjectileKind {
    pub fn bolt(pierce: u32, homing: bool) -> Self {
        ProjectileKind::Bolt {
            pierce,
            homing,
            struck: Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectileKind::Bolt { .. } => "bolt",
            ProjectileKind::Thrown { .. } => "thrown",
            ProjectileKind::Zone { .. } => "zone",
            ProjectileKind::Aura => "aura",
            ProjectileKind::Minion { .. } => "minion",
            ProjectileKind::Beam { .. } => "beam",
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub damage: f32,
    pub radius: f32,
    /// Ticks left; the entity is removed when this reaches zero.
    pub lifetime: u32,
    /// Weapon that emitted this, if any.
    pub source: Option<WeaponId>,
    pub traits: TraitFlags,
    pub kind: ProjectileKind,
}

impl Projectile {
    pub fn new(damage: f32, radius: f32, lifetime: u32, kind: ProjectileKind) -> Self {
        Self {
            damage,
            radius,
            lifetime,
            source: None,
            traits: TraitFlags::default(),
            kind,
        }
    }

    pub fn with_source(mut self, source: Option<WeaponId>) -> Self {
        self.source = source;
        self
    }

    pub fn with_traits(mut self, traits: TraitFlags) -> Self {
        self.traits = traits;
        self
    }

    /// Payload handed to on-hit trait effects when this strikes at `origin`.
    pub fn payload(&self, origin: Vec2) -> HitPayload {
        HitPayload {
            damage: self.damage,
            origin,
            flags: self.traits,
        }
    }
}

/// A projectile waiting to be spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSeed {
    pub position: Vec2,
    pub velocity: Vec2,
    pub projectile: Projectile,
}

impl ProjectileSeed {
    pub fn at_rest(position: Vec2, projectile: Projectile) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            projectile,
        }
    }
}

pub fn spawn_projectile(commands: &mut Commands, seed: ProjectileSeed) -> Entity {
    commands
        .spawn((
            ArenaEntity,
            seed.projectile,
            Position(seed.position),
            Velocity(seed.velocity),
        ))
        .id()
}

/// Age, move, and steer every projectile.
///
/// Thrown bombs that run out of flight time queue an [`Impact::Blast`] at
/// their landing point.  Homing bolts, minions, and drip zones aim at the
/// live non-boss actor nearest to *themselves*.
pub fn projectile_motion_system(
    mut commands: Commands,
    mut q_projectiles: Query<(Entity, &mut Projectile, &mut Position, &mut Velocity)>,
    q_actors: Query<(Entity, &Actor, &Position), Without<Projectile>>,
    multipliers: Res<StatMultipliers>,
    mut rng: ResMut<SimRng>,
    mut impacts: MessageWriter<Impact>,
) {
    let sightings: Vec<Sighting> = q_actors
        .iter()
        .filter(|(_, actor, _)| actor.is_targetable())
        .map(|(entity, _, pos)| Sighting {
            entity,
            position: pos.0,
        })
        .collect();

    for (entity, mut projectile, mut pos, mut vel) in q_projectiles.iter_mut() {
        projectile.lifetime = projectile.lifetime.saturating_sub(1);
        if projectile.lifetime == 0 {
            if let ProjectileKind::Thrown {
                landing,
                blast_radius,
            } = projectile.kind
            {
                impacts.write(Impact::Blast {
                    center: landing,
                    radius: blast_radius,
                    damage: projectile.damage,
                    payload: Some(projectile.payload(landing)),
                });
            }
            commands.entity(entity).despawn();
            continue;
        }

        pos.0 += vel.0;
        let here = pos.0;
        let source = projectile.source;

        match &mut projectile.kind {
            ProjectileKind::Zone { drip: Some(timer) } => {
                *timer = timer.saturating_sub(1);
                if *timer > 0 {
                    continue;
                }
                *timer = DRIP_INTERVAL;
                let angle = match nearest(here, &sightings) {
                    Some(target) => aim_angle(here, target.position),
                    None => rng.0.gen_range(0.0..std::f32::consts::TAU),
                };
                for j in 0..DRIP_SHARDS {
                    let shard_angle = angle + (j as f32 - 1.0) * DRIP_SPACING;
                    let shard = Projectile::new(
                        DRIP_DAMAGE * multipliers.damage,
                        DRIP_RADIUS,
                        DRIP_LIFETIME,
                        ProjectileKind::bolt(0, false),
                    )
                    .with_source(source);
                    spawn_projectile(
                        &mut commands,
                        ProjectileSeed {
                            position: here,
                            velocity: unit(shard_angle) * DRIP_SPEED,
                            projectile: shard,
                        },
                    );
                }
            }
            ProjectileKind::Beam { target, endpoint } => match q_actors.get(*target) {
                Ok((_, actor, target_pos)) if !actor.dead => *endpoint = target_pos.0,
                _ => {
                    commands.entity(entity).despawn();
                }
            },
            ProjectileKind::Bolt { homing: true, .. } => {
                if let Some(target) = nearest(here, &sightings) {
                    vel.0 += unit(aim_angle(here, target.position)) * HOMING_ACCEL;
                    if vel.0.length() > HOMING_MAX_SPEED {
                        vel.0 *= HOMING_DAMPING;
                    }
                }
            }
            ProjectileKind::Minion {
                speed,
                bite_cooldown,
            } => {
                *bite_cooldown = bite_cooldown.saturating_sub(1);
                if let Some(target) = nearest(here, &sightings) {
                    vel.0 = unit(aim_angle(here, target.position)) * *speed;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Archetype;
    use crate::config::ArenaConfig;

    fn motion_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<Impact>();
        app.insert_resource(StatMultipliers::default());
        app.insert_resource(SimRng::seeded(7));
        app.add_systems(Update, projectile_motion_system);
        app
    }

    fn spawn_actor(app: &mut App, at: Vec2) -> Entity {
        let stats = ArenaConfig::default().archetypes.basic.clone();
        app.world_mut()
            .spawn((
                Actor::from_stats(Archetype::Basic, &stats, 1.0, 0.0),
                Position(at),
            ))
            .id()
    }

    fn spawn(app: &mut App, seed: ProjectileSeed) -> Entity {
        app.world_mut()
            .spawn((seed.projectile, Position(seed.position), Velocity(seed.velocity)))
            .id()
    }

    fn projectiles(app: &mut App) -> Vec<Projectile> {
        let mut q = app.world_mut().query::<&Projectile>();
        q.iter(app.world()).cloned().collect()
    }

    #[test]
    fn bolts_move_then_expire() {
        let mut app = motion_app();
        let bolt = spawn(
            &mut app,
            ProjectileSeed {
                position: Vec2::ZERO,
                velocity: Vec2::new(3.0, 0.0),
                projectile: Projectile::new(1.0, 5.0, 2, ProjectileKind::bolt(0, false)),
            },
        );
        app.update();
        assert_eq!(app.world().get::<Position>(bolt).expect("alive").0.x, 3.0);
        app.update();
        assert!(app.world().get_entity(bolt).is_err());
    }

    #[test]
    fn thrown_bomb_detonates_at_landing_point() {
        let mut app = motion_app();
        let flags = TraitFlags {
            explosive: true,
            ..Default::default()
        };
        spawn(
            &mut app,
            ProjectileSeed {
                position: Vec2::ZERO,
                velocity: Vec2::new(10.0, 0.0),
                projectile: Projectile::new(
                    40.0,
                    15.0,
                    1,
                    ProjectileKind::Thrown {
                        landing: Vec2::new(10.0, 0.0),
                        blast_radius: 150.0,
                    },
                )
                .with_traits(flags),
            },
        );
        app.update();

        let impacts: Vec<Impact> = app
            .world_mut()
            .resource_mut::<Messages<Impact>>()
            .drain()
            .collect();
        assert_eq!(impacts.len(), 1);
        match &impacts[0] {
            Impact::Blast {
                center,
                radius,
                damage,
                payload: Some(payload),
            } => {
                assert_eq!(*center, Vec2::new(10.0, 0.0));
                assert_eq!(*radius, 150.0);
                assert_eq!(*damage, 40.0);
                assert!(payload.flags.explosive);
            }
            other => panic!("unexpected impact {other:?}"),
        }
        assert!(projectiles(&mut app).is_empty());
    }

    #[test]
    fn drip_zone_sheds_three_shards_toward_nearest_actor() {
        let mut app = motion_app();
        spawn_actor(&mut app, Vec2::new(500.0, 0.0));
        spawn(
            &mut app,
            ProjectileSeed::at_rest(
                Vec2::ZERO,
                Projectile::new(5.0, 60.0, 180, ProjectileKind::Zone { drip: Some(0) }),
            ),
        );
        app.update();

        let all = projectiles(&mut app);
        assert_eq!(all.len(), 4);
        let shards: Vec<_> = all
            .iter()
            .filter(|p| matches!(p.kind, ProjectileKind::Bolt { .. }))
            .collect();
        assert_eq!(shards.len(), 3);
        assert!(shards.iter().all(|p| p.damage == 5.0 && p.radius == 4.0));

        let mut q = app.world_mut().query::<(&Projectile, &Velocity)>();
        let straight = q
            .iter(app.world())
            .filter(|(p, _)| matches!(p.kind, ProjectileKind::Bolt { .. }))
            .any(|(_, v)| (v.0 - Vec2::new(8.0, 0.0)).length() < 1e-4);
        assert!(straight, "middle shard aims straight at the actor");

        app.update();
        assert_eq!(projectiles(&mut app).len(), 4, "timer reset to 60");
    }

    #[test]
    fn beam_follows_target_then_terminates() {
        let mut app = motion_app();
        let target = spawn_actor(&mut app, Vec2::new(50.0, 50.0));
        let beam = spawn(
            &mut app,
            ProjectileSeed::at_rest(
                Vec2::ZERO,
                Projectile::new(
                    0.0,
                    0.0,
                    20,
                    ProjectileKind::Beam {
                        target,
                        endpoint: Vec2::ZERO,
                    },
                ),
            ),
        );
        app.update();
        let endpoint = match &app.world().get::<Projectile>(beam).expect("beam").kind {
            ProjectileKind::Beam { endpoint, .. } => *endpoint,
            _ => unreachable!(),
        };
        assert_eq!(endpoint, Vec2::new(50.0, 50.0));

        app.world_mut().despawn(target);
        app.update();
        assert!(app.world().get_entity(beam).is_err());
    }

    #[test]
    fn homing_bolt_bends_toward_target() {
        let mut app = motion_app();
        spawn_actor(&mut app, Vec2::new(0.0, 500.0));
        let bolt = spawn(
            &mut app,
            ProjectileSeed {
                position: Vec2::ZERO,
                velocity: Vec2::new(7.0, 0.0),
                projectile: Projectile::new(5.0, 5.0, 120, ProjectileKind::bolt(0, true)),
            },
        );
        app.update();
        let v = app.world().get::<Velocity>(bolt).expect("bolt").0;
        assert!(v.y > 0.0, "pulled toward +y, got {v:?}");
        assert!(v.length() <= 8.0 + 1e-4);
    }

    #[test]
    fn minion_reaims_and_counts_down_bite() {
        let mut app = motion_app();
        spawn_actor(&mut app, Vec2::new(-100.0, 0.0));
        let minion = spawn(
            &mut app,
            ProjectileSeed::at_rest(
                Vec2::ZERO,
                Projectile::new(
                    5.0,
                    MINION_RADIUS,
                    600,
                    ProjectileKind::Minion {
                        speed: 3.0,
                        bite_cooldown: 5,
                    },
                ),
            ),
        );
        app.update();
        let v = app.world().get::<Velocity>(minion).expect("minion").0;
        assert!((v - Vec2::new(-3.0, 0.0)).length() < 1e-4);
        match app.world().get::<Projectile>(minion).expect("minion").kind {
            ProjectileKind::Minion { bite_cooldown, .. } => assert_eq!(bite_cooldown, 4),
            _ => unreachable!(),
        }
    }
}
