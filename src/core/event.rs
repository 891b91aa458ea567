use crate::error::{Error, Result};
use glam::DVec3;
use ordered_float::NotNan;

/// One resolved impact inside a frame.
///
/// - `position`: where the path met the boundary.
/// - `velocity`: velocity right after the bounce (restitution applied).
/// - `time`: time-to-impact measured from the start of the sub-step that produced it.
/// - `facet`: index of the box facet that was hit (`None` for the sphere).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub position: DVec3,
    pub velocity: DVec3,
    pub time: NotNan<f64>,
    pub facet: Option<usize>,
}

impl CollisionEvent {
    /// Create a new event, validating that the time is finite and non-negative.
    pub fn new(position: DVec3, velocity: DVec3, time: f64, facet: Option<usize>) -> Result<Self> {
        if !time.is_finite() || time < 0.0 {
            return Err(Error::MathError(format!(
                "time-to-impact must be finite and >= 0, got {time}"
            )));
        }
        if !position.is_finite() || !velocity.is_finite() {
            return Err(Error::MathError("impact state must be finite".into()));
        }
        let time = NotNan::new(time)
            .map_err(|_| Error::MathError("time-to-impact cannot be NaN".into()))?;
        Ok(Self {
            position,
            velocity,
            time,
            facet,
        })
    }

    /// Returns the raw f64 time-to-impact.
    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }
}
