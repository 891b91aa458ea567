//! Static boundary geometry and per-iteration impact detection.
//!
//! The box confines particles; the sphere excludes them. Both expose the same
//! [`CollisionSurface`] seam consumed by the sub-stepping loop in
//! [`crate::core::resolver`].

use crate::core::event::CollisionEvent;
use crate::core::geometry::{
    line_sphere_roots, reflect_with_restitution, segment_plane_crossing, time_to_reach,
    MIN_DISPLACEMENT,
};
use crate::error::{Error, Result};
use glam::DVec3;
use ordered_float::NotNan;

/// Number of planar facets of an axis-aligned box.
pub const FACET_COUNT: usize = 6;

/// A boundary that can report the first impact of a straight sub-step path.
pub trait CollisionSurface {
    /// Inspect the path `old -> tentative` lasting `dt` and, if it leaves the valid
    /// region, return the impact with the bounced velocity already applied.
    fn detect(
        &self,
        old: DVec3,
        tentative: DVec3,
        dt: f64,
        restitution: f64,
    ) -> Option<CollisionEvent>;

    /// Whether `position` lies in the region particles are allowed to occupy,
    /// within `tolerance`.
    fn admits(&self, position: DVec3, tolerance: f64) -> bool;
}

/// One planar face: a unit normal pointing into the box and a point on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub normal: DVec3,
    pub point: DVec3,
}

impl Facet {
    /// Signed distance of `p` from the plane along the facet normal.
    /// Non-negative on the interior side.
    #[inline]
    pub fn signed_distance(&self, p: DVec3) -> f64 {
        (p - self.point).dot(self.normal)
    }
}

/// Axis-aligned box confining particles.
///
/// Facets 0..2 carry normals +X, +Y, +Z anchored at `min`; facets 3..5 carry
/// -X, -Y, -Z anchored at `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxBoundary {
    min: DVec3,
    max: DVec3,
    facets: [Facet; FACET_COUNT],
}

impl BoxBoundary {
    /// Build a box from its corners.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if a corner is non-finite or `min > max` on any axis.
    pub fn new(min: DVec3, max: DVec3) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidParam("box corners must be finite".into()));
        }
        if min.cmpgt(max).any() {
            return Err(Error::InvalidParam(format!(
                "box min corner {min} must not exceed max corner {max}"
            )));
        }
        let facets = [
            Facet { normal: DVec3::X, point: min },
            Facet { normal: DVec3::Y, point: min },
            Facet { normal: DVec3::Z, point: min },
            Facet { normal: DVec3::NEG_X, point: max },
            Facet { normal: DVec3::NEG_Y, point: max },
            Facet { normal: DVec3::NEG_Z, point: max },
        ];
        Ok(Self { min, max, facets })
    }

    pub fn min(&self) -> DVec3 {
        self.min
    }

    pub fn max(&self) -> DVec3 {
        self.max
    }

    pub fn facets(&self) -> &[Facet; FACET_COUNT] {
        &self.facets
    }

    /// Impact against a single facet, or `None` if the tentative position stays on
    /// the interior side (or the particle is not moving).
    fn facet_impact(
        &self,
        index: usize,
        old: DVec3,
        tentative: DVec3,
        dt: f64,
        restitution: f64,
    ) -> Option<CollisionEvent> {
        let facet = &self.facets[index];
        if facet.signed_distance(tentative) >= 0.0 || old.distance(tentative) <= MIN_DISPLACEMENT
        {
            return None;
        }
        let hit = segment_plane_crossing(facet.point, facet.normal, old, tentative)?;
        let time = time_to_reach(old, tentative, hit, dt);
        let velocity = reflect_with_restitution((tentative - old) / dt, facet.normal, restitution);
        accept(CollisionEvent::new(hit, velocity, time, Some(index)))
    }
}

/// Keep a validated impact. One that fails validation (overflowed velocity,
/// non-finite hit point) is logged and treated as no impact.
fn accept(impact: Result<CollisionEvent>) -> Option<CollisionEvent> {
    impact
        .map_err(|e| log::warn!("dropping unresolvable impact: {e}"))
        .ok()
}

impl CollisionSurface for BoxBoundary {
    /// Tests all six facets and keeps the crossing nearest to `old`; with linear
    /// motion inside a sub-step that is also the earliest one. Equal distances keep
    /// the lowest facet index.
    fn detect(
        &self,
        old: DVec3,
        tentative: DVec3,
        dt: f64,
        restitution: f64,
    ) -> Option<CollisionEvent> {
        (0..FACET_COUNT)
            .filter_map(|i| {
                let event = self.facet_impact(i, old, tentative, dt, restitution)?;
                let dist = NotNan::new(old.distance(event.position))
                    .map_err(|_| log::warn!("dropping impact on facet {i}: NaN distance from {old}"))
                    .ok()?;
                Some((dist, event))
            })
            .min_by_key(|(dist, _)| *dist)
            .map(|(_, event)| event)
    }

    fn admits(&self, position: DVec3, tolerance: f64) -> bool {
        position.cmpge(self.min - tolerance).all() && position.cmple(self.max + tolerance).all()
    }
}

/// Solid sphere; particles live outside of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereBoundary {
    center: DVec3,
    radius: f64,
}

impl SphereBoundary {
    /// Errors:
    /// - `Error::InvalidParam` if `center` is non-finite or `radius` is not finite and > 0.
    pub fn new(center: DVec3, radius: f64) -> Result<Self> {
        if !center.is_finite() {
            return Err(Error::InvalidParam("sphere center must be finite".into()));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam(
                "sphere radius must be finite and > 0".into(),
            ));
        }
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl CollisionSurface for SphereBoundary {
    /// Picks whichever line–sphere root lies nearer the tentative position, so a
    /// path that ends past the center reports the exit side. Its time-to-impact can
    /// exceed `dt` (the exit point lies beyond the travelled segment) and is clamped
    /// to `dt`: the bounce then consumes the whole sub-step.
    fn detect(
        &self,
        old: DVec3,
        tentative: DVec3,
        dt: f64,
        restitution: f64,
    ) -> Option<CollisionEvent> {
        if tentative.distance(self.center) >= self.radius
            || old.distance(tentative) <= MIN_DISPLACEMENT
        {
            return None;
        }
        let (far, near) = line_sphere_roots(self.center, self.radius, old, tentative)?;
        // Root closest to the tentative end; ties go to the near-side root.
        let hit = if tentative.distance(far) < tentative.distance(near) {
            far
        } else {
            near
        };
        let time = time_to_reach(old, tentative, hit, dt);
        let normal = (self.center - hit).normalize_or_zero();
        let velocity = reflect_with_restitution((tentative - old) / dt, normal, restitution);
        accept(CollisionEvent::new(hit, velocity, time, None))
    }

    fn admits(&self, position: DVec3, tolerance: f64) -> bool {
        position.distance(self.center) >= self.radius - tolerance
    }
}

/// Boundary configured for a simulation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Boundary {
    /// No geometry; tentative states are committed as-is.
    #[default]
    Open,
    Box(BoxBoundary),
    Sphere(SphereBoundary),
}

impl Boundary {
    /// The collision surface to resolve against, if any.
    pub fn surface(&self) -> Option<&dyn CollisionSurface> {
        match self {
            Boundary::Open => None,
            Boundary::Box(b) => Some(b),
            Boundary::Sphere(s) => Some(s),
        }
    }
}
