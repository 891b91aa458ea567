//! Shared kinematic state and the intersection / reflection math used by both
//! boundary resolvers.

use glam::DVec3;

/// Displacements at or below this length are treated as "not moving".
pub const MIN_DISPLACEMENT: f64 = f64::EPSILON;

/// Kinematic state of a single particle at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct State {
    pub position: DVec3,
    pub velocity: DVec3,
}

impl State {
    #[inline]
    pub fn new(position: DVec3, velocity: DVec3) -> Self {
        Self { position, velocity }
    }
}

/// Ray–plane crossing along the segment `from -> to`.
///
/// The segment parameter is clamped to `[0, 1]` so the crossing always lies on the
/// travelled path. Returns `None` when the segment runs parallel to the plane.
pub fn segment_plane_crossing(
    plane_point: DVec3,
    plane_normal: DVec3,
    from: DVec3,
    to: DVec3,
) -> Option<DVec3> {
    let line = to - from;
    let denom = line.dot(plane_normal);
    if denom.abs() <= f64::EPSILON {
        return None;
    }
    let d = ((plane_point - from).dot(plane_normal) / denom).clamp(0.0, 1.0);
    Some(from + line * d)
}

/// Both intersections of the infinite line through `from -> to` with a sphere.
///
/// A negative discriminant (near-tangent approach) is clamped to zero before the
/// square root, so two points are always returned: `(far, near)` measured along the
/// direction of travel from `from`. Returns `None` for a zero-length segment.
pub fn line_sphere_roots(
    center: DVec3,
    radius: f64,
    from: DVec3,
    to: DVec3,
) -> Option<(DVec3, DVec3)> {
    let dir = (to - from).try_normalize()?;
    let offset = from - center;
    let b = dir.dot(offset);
    let disc = (b * b - offset.length_squared() + radius * radius).max(0.0);
    let root = disc.sqrt();
    Some((from + (-b + root) * dir, from + (-b - root) * dir))
}

/// Split `velocity` against `normal` and reflect the normal part.
///
/// The normal component is negated and scaled by `restitution`; the tangential
/// component is kept unchanged (no friction). The sign of `normal` does not matter.
#[inline]
pub fn reflect_with_restitution(velocity: DVec3, normal: DVec3, restitution: f64) -> DVec3 {
    let normal_part = velocity.dot(normal) * normal;
    let tangent_part = velocity - normal_part;
    tangent_part - restitution * normal_part
}

/// Time needed to travel from `from` to `point` at the average speed of the sub-step
/// `from -> to` lasting `dt`, clamped into `[0, dt]`.
#[inline]
pub fn time_to_reach(from: DVec3, to: DVec3, point: DVec3, dt: f64) -> f64 {
    let speed = from.distance(to) / dt;
    if !speed.is_finite() || speed <= 0.0 {
        return 0.0;
    }
    (from.distance(point) / speed).clamp(0.0, dt.max(0.0))
}
