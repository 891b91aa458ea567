//! Semi-implicit Euler step.
//!
//! Positions advance with the velocity at the start of the step; velocities
//! advance with the acceleration evaluated at that same start state.

use crate::core::force::ForceModel;
use crate::core::geometry::State;
use crate::core::particle::{Particle, ParticleConfig};
use glam::DVec3;
use rand::Rng;

/// Advance `state` by `dt` under a constant `acceleration`.
#[inline]
pub fn integrate(state: State, acceleration: DVec3, dt: f64) -> State {
    State {
        position: state.position + state.velocity * dt,
        velocity: state.velocity + acceleration * dt,
    }
}

/// Evaluate `model` for particle `index` at `state` and integrate once over `dt`.
pub fn step<R: Rng>(
    model: &ForceModel,
    index: usize,
    state: State,
    config: &ParticleConfig,
    neighbors: &[Particle],
    rng: &mut R,
    dt: f64,
) -> State {
    let acceleration = model.acceleration(index, state, config, neighbors, rng);
    integrate(state, acceleration, dt)
}
