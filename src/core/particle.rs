use crate::core::geometry::State;
use crate::error::{Error, Result};
use glam::DVec3;
use serde::Deserialize;

/// Reynolds steering parameters, read only by the flocking force model.
///
/// A sub-force whose weight is `0.0` is skipped entirely.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SteeringConfig {
    pub max_speed: f64,
    pub max_force: f64,
    pub separation: f64,
    pub alignment: f64,
    pub cohesion: f64,
    pub boundary: f64,
    /// Neighbors closer than this push the boid away.
    pub desired_separation: f64,
    /// Neighbors closer than this count for alignment and cohesion.
    pub neighbor_dist: f64,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            max_force: 1.0,
            separation: 1.5,
            alignment: 1.0,
            cohesion: 1.0,
            boundary: 1.0,
            desired_separation: 2.0,
            neighbor_dist: 5.0,
        }
    }
}

/// Per-particle physical configuration, fixed at spawn time.
///
/// - `mass`: > 0
/// - `drag`: linear drag coefficient (gravity + drag model)
/// - `repulsion`: inverse-cube repulsion coefficient (N-body model)
/// - `restitution`: fraction of normal speed kept after a bounce; expected in [0, 1]
/// - `steering`: flocking parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleConfig {
    pub mass: f64,
    pub drag: f64,
    pub repulsion: f64,
    pub restitution: f64,
    pub steering: SteeringConfig,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            drag: 0.0,
            repulsion: 0.0,
            restitution: 1.0,
            steering: SteeringConfig::default(),
        }
    }
}

impl ParticleConfig {
    /// Check the configuration before it reaches the force/collision core.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `mass` is not finite and > 0, or any coefficient is NaN/inf.
    ///
    /// A restitution outside [0, 1] is accepted but logged.
    pub fn validate(&self) -> Result<()> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        let s = &self.steering;
        let coefficients = [
            ("drag", self.drag),
            ("repulsion", self.repulsion),
            ("restitution", self.restitution),
            ("max_speed", s.max_speed),
            ("max_force", s.max_force),
            ("separation", s.separation),
            ("alignment", s.alignment),
            ("cohesion", s.cohesion),
            ("boundary", s.boundary),
            ("desired_separation", s.desired_separation),
            ("neighbor_dist", s.neighbor_dist),
        ];
        if let Some((name, _)) = coefficients.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidParam(format!("{name} must be finite")));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            log::warn!(
                "restitution {} is outside [0, 1]; bounces will gain or invert energy",
                self.restitution
            );
        }
        Ok(())
    }
}

/// A simulated point particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Stable particle identifier.
    pub id: u32,
    pub position: DVec3,
    pub velocity: DVec3,
    pub config: ParticleConfig,
    /// Number of boundary impacts resolved for this particle so far.
    pub collision_count: u64,
}

impl Particle {
    /// Create a new particle after validating its state and configuration.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the position or velocity is non-finite, or the config is invalid.
    pub fn new(id: u32, position: DVec3, velocity: DVec3, config: ParticleConfig) -> Result<Self> {
        if !position.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !velocity.is_finite() {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        config.validate()?;
        Ok(Self {
            id,
            position,
            velocity,
            config,
            collision_count: 0,
        })
    }

    #[inline]
    pub fn state(&self) -> State {
        State::new(self.position, self.velocity)
    }

    /// Commit a resolved state and record the impacts it took to get there.
    #[inline]
    pub fn commit(&mut self, state: State, impacts: usize) {
        self.position = state.position;
        self.velocity = state.velocity;
        self.collision_count = self.collision_count.saturating_add(impacts as u64);
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.config.mass * self.velocity.length_squared()
    }
}
