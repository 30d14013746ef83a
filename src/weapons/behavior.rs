//! Weapon behaviors: how one fire turns into concrete entities.
//!
//! [`Behavior`] is a closed, data-driven enum.  Every variant consumes the
//! same inputs through [`Behavior::compute_emission`] and returns a list of
//! [`Emission`]s; spawning them is the caller's job, which keeps this module
//! free of ECS mutation and easy to test.

use super::registry::WeaponId;
use super::traits::EffectiveStats;
use crate::combat::HitPayload;
use crate::constants::*;
use crate::player::StatMultipliers;
use crate::projectile::{Projectile, ProjectileKind, ProjectileSeed};
use crate::targeting::{aim_angle, nearest, nearest_n, unit, within, Sighting};
use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::f32::consts::TAU;

/// `base + level / per_levels + (stat count - 1) + global amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CountRule {
    pub base: u32,
    pub per_levels: u32,
}

impl CountRule {
    pub fn new(base: u32, per_levels: u32) -> Self {
        Self { base, per_levels }
    }

    pub fn resolve(&self, level: u32, stat_count: u32, amount: u32) -> u32 {
        self.base + level / self.per_levels.max(1) + stat_count.saturating_sub(1) + amount
    }
}

/// Fan width of a volley.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadRule {
    /// This value plus the stat block's spread.
    Additive(f32),
    /// Always this value.
    Fixed(f32),
}

impl SpreadRule {
    pub fn resolve(self, stat_spread: f32) -> f32 {
        match self {
            SpreadRule::Additive(base) => base + stat_spread,
            SpreadRule::Fixed(spread) => spread,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Behavior {
    /// A fan of bolts aimed at the nearest actor.
    Volley {
        count: CountRule,
        spread: SpreadRule,
        #[serde(default)]
        homing: bool,
        /// Overrides the stat block's pierce.
        #[serde(default)]
        pierce: Option<u32>,
    },
    /// Bombs lobbed onto random nearby actors.
    Throw { count: CountRule },
    /// Damage zones scattered around the player.
    Field { count: CountRule },
    /// Minions released at the player.
    Summon { count: CountRule },
    /// Beams locked onto the nearest actors, striking immediately.
    Beam { count: CountRule },
    /// Hits evenly spaced on a rotating ring.
    Orbit { count: CountRule },
    /// One aura centred on the player, growing with level.
    Aura,
}

/// Inputs for one fire.
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    pub weapon: WeaponId,
    pub level: u32,
    pub globals: &'a StatMultipliers,
    /// Player position.
    pub origin: Vec2,
    /// Live non-boss actors.
    pub targets: &'a [Sighting],
    /// Orbit phase after this fire's advance.
    pub phase: f32,
}

/// One concrete result of a fire.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Spawn(ProjectileSeed),
    /// Immediate damage, queued as an [`crate::combat::Impact::Strike`].
    Strike {
        target: Entity,
        damage: f32,
        payload: Option<HitPayload>,
    },
}

impl Behavior {
    pub fn count_rule(&self) -> Option<&CountRule> {
        match self {
            Behavior::Volley { count, .. }
            | Behavior::Throw { count }
            | Behavior::Field { count }
            | Behavior::Summon { count }
            | Behavior::Beam { count }
            | Behavior::Orbit { count } => Some(count),
            Behavior::Aura => None,
        }
    }

    /// Turn one fire into emissions.
    pub fn compute_emission<R: Rng + ?Sized>(
        &self,
        ctx: &EmitContext,
        eff: &EffectiveStats,
        rng: &mut R,
    ) -> Vec<Emission> {
        let stats = &eff.stats;
        let damage = stats.damage * ctx.globals.damage;
        let count = self
            .count_rule()
            .map_or(1, |rule| rule.resolve(ctx.level, stats.count, ctx.globals.amount));
        let tag = |p: Projectile| p.with_source(Some(ctx.weapon)).with_traits(eff.flags);

        match self {
            Behavior::Volley {
                spread,
                homing,
                pierce,
                ..
            } => {
                let spread = spread.resolve(stats.spread);
                let angle = match nearest(ctx.origin, ctx.targets) {
                    Some(t) => aim_angle(ctx.origin, t.position),
                    None => rng.gen_range(0.0..TAU),
                };
                let pierce = pierce
                    .unwrap_or(stats.pierce)
                    .saturating_add(ctx.globals.pierce);
                let radius = stats.radius.unwrap_or(DEFAULT_BOLT_RADIUS);
                let homing = *homing || eff.homing;
                let step = spread / count.max(1) as f32;
                let middle = (count as f32 - 1.0) / 2.0;

                (0..count)
                    .map(|i| {
                        let a = angle + (i as f32 - middle) * step;
                        Emission::Spawn(ProjectileSeed {
                            position: ctx.origin,
                            velocity: unit(a) * stats.speed,
                            projectile: tag(Projectile::new(
                                damage,
                                radius,
                                stats.lifetime,
                                ProjectileKind::bolt(pierce, homing),
                            )),
                        })
                    })
                    .collect()
            }
            Behavior::Throw { .. } => {
                let speed = if stats.speed > 0.0 {
                    stats.speed
                } else {
                    THROW_FALLBACK_SPEED
                };
                let in_range = within(ctx.origin, THROW_TARGET_RANGE, ctx.targets);

                (0..count)
                    .map(|_| {
                        let landing = match in_range.choose(rng) {
                            Some(t) => t.position,
                            None => {
                                ctx.origin
                                    + Vec2::new(
                                        rng.gen_range(-THROW_SCATTER..THROW_SCATTER),
                                        rng.gen_range(-THROW_SCATTER..THROW_SCATTER),
                                    )
                            }
                        };
                        let flight = ((ctx.origin.distance(landing) / speed).floor() as u32)
                            .max(THROW_MIN_FLIGHT);
                        Emission::Spawn(ProjectileSeed {
                            position: ctx.origin,
                            velocity: (landing - ctx.origin) / flight as f32,
                            projectile: tag(Projectile::new(
                                damage,
                                stats.radius.unwrap_or(DEFAULT_BOLT_RADIUS),
                                flight,
                                ProjectileKind::Thrown {
                                    landing,
                                    blast_radius: stats.area * ctx.globals.area,
                                },
                            )),
                        })
                    })
                    .collect()
            }
            Behavior::Field { .. } => (0..count)
                .map(|_| {
                    let offset = Vec2::new(
                        rng.gen_range(-FIELD_SCATTER_X..FIELD_SCATTER_X),
                        rng.gen_range(-FIELD_SCATTER_Y..FIELD_SCATTER_Y),
                    );
                    Emission::Spawn(ProjectileSeed::at_rest(
                        ctx.origin + offset,
                        tag(Projectile::new(
                            damage,
                            stats.area * ctx.globals.area,
                            stats.lifetime,
                            ProjectileKind::Zone {
                                drip: eff.drip.then_some(0),
                            },
                        )),
                    ))
                })
                .collect(),
            // Bites never run on-hit effects, so minions carry no flags.
            Behavior::Summon { .. } => (0..count)
                .map(|_| {
                    Emission::Spawn(ProjectileSeed::at_rest(
                        ctx.origin,
                        Projectile::new(
                            damage,
                            MINION_RADIUS,
                            stats.lifetime,
                            ProjectileKind::Minion {
                                speed: stats.speed,
                                bite_cooldown: 0,
                            },
                        )
                        .with_source(Some(ctx.weapon)),
                    ))
                })
                .collect(),
            Behavior::Beam { .. } => {
                let mut out = Vec::new();
                for target in nearest_n(ctx.origin, ctx.targets, count as usize) {
                    out.push(Emission::Spawn(ProjectileSeed::at_rest(
                        ctx.origin,
                        tag(Projectile::new(
                            damage,
                            0.0,
                            BEAM_LIFETIME,
                            ProjectileKind::Beam {
                                target: target.entity,
                                endpoint: target.position,
                            },
                        )),
                    )));
                    out.push(Emission::Strike {
                        target: target.entity,
                        damage: damage * BEAM_STRIKE_FACTOR,
                        payload: Some(HitPayload {
                            damage,
                            origin: target.position,
                            flags: eff.flags,
                        }),
                    });
                }
                out
            }
            Behavior::Orbit { .. } => {
                let ring = stats.area * ctx.globals.area;
                (0..count)
                    .map(|i| {
                        let theta = ctx.phase + i as f32 * TAU / count as f32;
                        Emission::Spawn(ProjectileSeed::at_rest(
                            ctx.origin + unit(theta) * ring,
                            tag(Projectile::new(
                                damage,
                                ORBIT_HIT_RADIUS,
                                REFRESHED_FIELD_LIFETIME,
                                ProjectileKind::bolt(0, false),
                            )),
                        ))
                    })
                    .collect()
            }
            Behavior::Aura => {
                let radius = (AURA_BASE_RADIUS + AURA_RADIUS_PER_LEVEL * ctx.level as f32)
                    * (stats.area / AURA_REFERENCE_AREA)
                    * ctx.globals.area;
                vec![Emission::Spawn(ProjectileSeed::at_rest(
                    ctx.origin,
                    tag(Projectile::new(
                        damage,
                        radius,
                        REFRESHED_FIELD_LIFETIME,
                        ProjectileKind::Aura,
                    )),
                ))]
            }
        }
    }
}

/// Orbit phase after one fire.  A zero speed stat counts as 1.
pub fn advance_phase(phase: f32, globals: &StatMultipliers, stat_speed: f32) -> f32 {
    let speed = if stat_speed == 0.0 { 1.0 } else { stat_speed };
    (phase + ORBIT_PHASE_STEP * globals.speed * speed) % TAU
}

/// The aura acquired through an aura synergy, spawned before the emission.
pub fn aura_trait_burst(origin: Vec2, damage: f32, weapon: WeaponId) -> ProjectileSeed {
    ProjectileSeed::at_rest(
        origin,
        Projectile::new(
            damage,
            AURA_TRAIT_RADIUS,
            AURA_TRAIT_LIFETIME,
            ProjectileKind::Aura,
        )
        .with_source(Some(weapon)),
    )
}

/// The three hits acquired through an orbit synergy, spawned after the
/// emission.
pub fn orbit_trait_burst<R: Rng + ?Sized>(
    origin: Vec2,
    damage: f32,
    weapon: WeaponId,
    rng: &mut R,
) -> Vec<ProjectileSeed> {
    (0..ORBIT_TRAIT_HITS)
        .map(|k| {
            let angle = (rng.gen::<f32>() + k as f32) * TAU / ORBIT_TRAIT_HITS as f32;
            let dist = ORBIT_TRAIT_DISTANCE + rng.gen::<f32>() * ORBIT_TRAIT_DISTANCE_JITTER;
            ProjectileSeed::at_rest(
                origin + unit(angle) * dist,
                Projectile::new(
                    damage,
                    ORBIT_TRAIT_RADIUS,
                    ORBIT_TRAIT_LIFETIME,
                    ProjectileKind::bolt(0, false),
                )
                .with_source(Some(weapon)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weapons::registry::WeaponRegistry;
    use crate::weapons::traits::{effective_stats, Trait};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ORIGIN: Vec2 = Vec2::new(1500.0, 1500.0);

    fn sightings(points: &[Vec2]) -> Vec<Sighting> {
        let mut world = World::new();
        points
            .iter()
            .map(|&position| Sighting {
                entity: world.spawn_empty().id(),
                position,
            })
            .collect()
    }

    fn fire(key: &str, level: u32, acquired: &[Trait], targets: &[Sighting]) -> Vec<Emission> {
        let registry = WeaponRegistry::builtin();
        let id = registry.find(key).expect("builtin weapon");
        let def = registry.get(id).expect("def");
        let globals = StatMultipliers::default();
        let eff = effective_stats(def, acquired, &globals);
        let ctx = EmitContext {
            weapon: id,
            level,
            globals: &globals,
            origin: ORIGIN,
            targets,
            phase: 0.0,
        };
        def.behavior
            .compute_emission(&ctx, &eff, &mut StdRng::seed_from_u64(11))
    }

    fn seeds(emissions: &[Emission]) -> Vec<&ProjectileSeed> {
        emissions
            .iter()
            .filter_map(|e| match e {
                Emission::Spawn(seed) => Some(seed),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn count_rule_combines_all_terms() {
        let rule = CountRule::new(1, 2);
        assert_eq!(rule.resolve(1, 1, 0), 1);
        assert_eq!(rule.resolve(4, 1, 0), 3);
        assert_eq!(rule.resolve(4, 3, 1), 6);
        assert_eq!(CountRule::new(0, 0).resolve(3, 1, 0), 3, "per_levels clamps to 1");
    }

    #[test]
    fn volley_fans_symmetrically_around_target() {
        let targets = sightings(&[ORIGIN + Vec2::new(300.0, 0.0)]);
        let out = fire("newsletter", 1, &[], &targets);
        let bolts = seeds(&out);
        assert_eq!(bolts.len(), 6, "3 base + level 1 + 2 extra from stat count");

        let angles: Vec<f32> = bolts.iter().map(|s| s.velocity.y.atan2(s.velocity.x)).collect();
        let step = 1.6 / 6.0;
        assert!((angles[0] + 2.5 * step).abs() < 1e-4, "{angles:?}");
        assert!((angles[5] - 2.5 * step).abs() < 1e-4);
        assert!(bolts.iter().all(|s| (s.velocity.length() - 5.0).abs() < 1e-4));
        assert!(bolts.iter().all(|s| s.projectile.radius == DEFAULT_BOLT_RADIUS));
    }

    #[test]
    fn heavy_volley_pierces() {
        let out = fire("blog_post", 1, &[], &[]);
        let bolt = seeds(&out)[0];
        assert!(matches!(
            bolt.projectile.kind,
            ProjectileKind::Bolt { pierce: 999, .. }
        ));
        assert_eq!(bolt.projectile.radius, 20.0);
    }

    #[test]
    fn thrown_bombs_land_exactly_on_target() {
        let target = ORIGIN + Vec2::new(200.0, 0.0);
        let out = fire("viral", 2, &[], &sightings(&[target]));
        let bombs = seeds(&out);
        assert_eq!(bombs.len(), 2);
        for bomb in bombs {
            let ProjectileKind::Thrown {
                landing,
                blast_radius,
            } = bomb.projectile.kind
            else {
                panic!("expected a thrown bomb");
            };
            assert_eq!(landing, target);
            assert_eq!(blast_radius, 150.0);
            assert_eq!(bomb.projectile.lifetime, 50);
            let end = bomb.position + bomb.velocity * bomb.projectile.lifetime as f32;
            assert!((end - target).length() < 1e-3);
        }
    }

    #[test]
    fn short_throws_take_minimum_flight() {
        let out = fire("viral", 1, &[], &sightings(&[ORIGIN + Vec2::new(20.0, 0.0)]));
        assert_eq!(seeds(&out)[0].projectile.lifetime, THROW_MIN_FLIGHT);
    }

    #[test]
    fn beam_strikes_nearest_for_five_times_damage() {
        let targets = sightings(&[ORIGIN + Vec2::new(400.0, 0.0), ORIGIN + Vec2::new(50.0, 0.0)]);
        let out = fire("cold_call", 1, &[Trait::Explosive], &targets);
        assert_eq!(out.len(), 2);
        match &out[1] {
            Emission::Strike {
                target,
                damage,
                payload: Some(payload),
            } => {
                assert_eq!(*target, targets[1].entity);
                assert!((damage - 8.0 * 1.2 * 5.0).abs() < 1e-4);
                assert!(payload.flags.explosive);
            }
            other => panic!("expected strike, got {other:?}"),
        }
    }

    #[test]
    fn orbit_ring_uses_area() {
        let out = fire("hashtag", 2, &[], &[]);
        let hits = seeds(&out);
        assert_eq!(hits.len(), 3);
        for hit in hits {
            assert!((hit.position.distance(ORIGIN) - 90.0).abs() < 1e-3);
            assert_eq!(hit.projectile.lifetime, 2);
        }
    }

    #[test]
    fn aura_grows_with_level() {
        let out = fire("kol", 3, &[], &[]);
        assert_eq!(seeds(&out)[0].projectile.radius, 90.0);
    }

    #[test]
    fn field_zones_drip_with_scatter() {
        let out = fire("funnel", 2, &[Trait::Spread], &[]);
        let zones = seeds(&out);
        assert_eq!(zones.len(), 6);
        for zone in zones {
            assert!(matches!(
                zone.projectile.kind,
                ProjectileKind::Zone { drip: Some(0) }
            ));
            let d = zone.position - ORIGIN;
            assert!(d.x.abs() <= 200.0 && d.y.abs() <= 150.0);
        }
    }

    #[test]
    fn summoned_minions_carry_no_flags() {
        let out = fire("seo", 1, &[Trait::Zone], &[]);
        let minions = seeds(&out);
        assert_eq!(minions.len(), 4);
        assert!(minions.iter().all(|m| !m.projectile.traits.any()));
        assert!(minions.iter().all(|m| m.projectile.source.is_some()));
    }

    #[test]
    fn zero_speed_throw_falls_back_to_a_finite_flight() {
        let registry = WeaponRegistry::builtin();
        let id = registry.find("viral").expect("builtin weapon");
        let mut def = registry.get(id).expect("def").clone();
        def.stats.speed = 0.0;
        let globals = StatMultipliers::default();
        let eff = effective_stats(&def, &[], &globals);
        let target = ORIGIN + Vec2::new(400.0, 0.0);
        let targets = sightings(&[target]);
        let ctx = EmitContext {
            weapon: id,
            level: 1,
            globals: &globals,
            origin: ORIGIN,
            targets: &targets,
            phase: 0.0,
        };
        let out = def
            .behavior
            .compute_emission(&ctx, &eff, &mut StdRng::seed_from_u64(11));
        let bomb = seeds(&out)[0];
        assert_eq!(bomb.projectile.lifetime, 100, "400 units at the fallback speed of 4");
        let end = bomb.position + bomb.velocity * bomb.projectile.lifetime as f32;
        assert!((end - target).length() < 1e-3);
    }

    #[test]
    fn orbit_trait_burst_spawns_three_ring_hits() {
        let mut rng = StdRng::seed_from_u64(3);
        let hits = orbit_trait_burst(ORIGIN, 12.0, WeaponId(0), &mut rng);
        assert_eq!(hits.len(), 3);
        for hit in hits {
            let d = hit.position.distance(ORIGIN);
            assert!((60.0..=80.0).contains(&d), "distance {d}");
            assert_eq!(hit.projectile.radius, 12.0);
        }
    }
}
