//! Geometry and targeting helpers.
//!
//! Weapons, homing bolts, minions, and drip zones all ask the same questions:
//! which hostile is closest, which N are closest, which lie inside a radius.
//! Callers collect a slice of [`Sighting`]s once per system run (live,
//! non-boss actors only) and query it here, so these functions stay free of
//! ECS types beyond `Entity`.

use bevy::prelude::*;

/// A targetable hostile actor as seen at the start of a system run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub entity: Entity,
    pub position: Vec2,
}

/// The sighting closest to `origin`, if any.
pub fn nearest(origin: Vec2, sightings: &[Sighting]) -> Option<Sighting> {
    sightings
        .iter()
        .copied()
        .min_by(|a, b| {
            a.position
                .distance_squared(origin)
                .total_cmp(&b.position.distance_squared(origin))
        })
}

/// Up to `n` sightings ordered from nearest to farthest.
pub fn nearest_n(origin: Vec2, sightings: &[Sighting], n: usize) -> Vec<Sighting> {
    let mut sorted = sightings.to_vec();
    sorted.sort_by(|a, b| {
        a.position
            .distance_squared(origin)
            .total_cmp(&b.position.distance_squared(origin))
    });
    sorted.truncate(n);
    sorted
}

/// Sightings strictly inside `radius` of `origin`.
pub fn within(origin: Vec2, radius: f32, sightings: &[Sighting]) -> Vec<Sighting> {
    let r2 = radius * radius;
    sightings
        .iter()
        .copied()
        .filter(|s| s.position.distance_squared(origin) < r2)
        .collect()
}

/// Angle (radians) of the direction from `from` to `to`.
#[inline]
pub fn aim_angle(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector pointing along `angle`.
#[inline]
pub fn unit(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// `true` when two circles overlap (touching does not count).
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// `point` displaced `distance` units directly away from `from`.
///
/// Coincident points are left where they are: there is no meaningful
/// direction to push along.
pub fn push_away(point: Vec2, from: Vec2, distance: f32) -> Vec2 {
    point + (point - from).normalize_or_zero() * distance
}
