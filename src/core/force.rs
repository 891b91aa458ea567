//! Force models producing per-particle acceleration.
//!
//! Every model maps a particle's state, its configuration and a read-only view of
//! the registry to a net force; [`ForceModel::acceleration`] divides by mass. The
//! particle itself is identified by its index in `neighbors` and always skipped.

use crate::core::boundary::BoxBoundary;
use crate::core::geometry::State;
use crate::core::particle::{Particle, ParticleConfig, SteeringConfig};
use glam::DVec3;
use rand::Rng;

/// Earth gravity, pointing down the Y axis.
pub const STANDARD_GRAVITY: DVec3 = DVec3::new(0.0, -9.807, 0.0);

/// Default softening / coincidence threshold of the N-body repulsion.
pub const NBODY_EPSILON: f64 = 1e-6;

/// Neighbors closer than this are ignored by separation.
const MIN_SEPARATION: f64 = 1e-6;

/// Facet distance under which boundary avoidance switches to a constant push.
const BOUNDARY_NEAR: f64 = 1e-2;

/// Magnitude of the push applied at or beyond a facet.
const BOUNDARY_PUSH: f64 = 100.0;

/// Selectable force accumulation strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum ForceModel {
    /// `mass * gravity - drag * velocity`.
    GravityDrag { gravity: DVec3 },
    /// Pairwise inverse-cube repulsion from every other particle.
    NBody { epsilon: f64 },
    /// Separation + alignment + cohesion + avoidance of the facets of `bounds`.
    Flocking { bounds: BoxBoundary },
}

impl Default for ForceModel {
    fn default() -> Self {
        ForceModel::GravityDrag {
            gravity: STANDARD_GRAVITY,
        }
    }
}

impl ForceModel {
    /// Net force on particle `index` when it is in `state`.
    pub fn force<R: Rng>(
        &self,
        index: usize,
        state: State,
        config: &ParticleConfig,
        neighbors: &[Particle],
        rng: &mut R,
    ) -> DVec3 {
        match self {
            ForceModel::GravityDrag { gravity } => {
                config.mass * *gravity - config.drag * state.velocity
            }
            ForceModel::NBody { epsilon } => repulsion(
                index,
                state.position,
                config.repulsion,
                *epsilon,
                neighbors,
                rng,
            ),
            ForceModel::Flocking { bounds } => flocking(index, state, &config.steering, bounds, neighbors),
        }
    }

    /// Acceleration (`force / mass`) on particle `index` when it is in `state`.
    #[inline]
    pub fn acceleration<R: Rng>(
        &self,
        index: usize,
        state: State,
        config: &ParticleConfig,
        neighbors: &[Particle],
        rng: &mut R,
    ) -> DVec3 {
        self.force(index, state, config, neighbors, rng) / config.mass
    }
}

/// Everyone in `neighbors` except the particle at `index`.
fn others(index: usize, neighbors: &[Particle]) -> impl Iterator<Item = &Particle> {
    neighbors
        .iter()
        .enumerate()
        .filter(move |(j, _)| *j != index)
        .map(|(_, p)| p)
}

/// Uniformly distributed direction of unit length.
pub fn random_unit_vector<R: Rng>(rng: &mut R) -> DVec3 {
    loop {
        let v = DVec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Sum of `coefficient * sep / (|sep|^3 + epsilon)` over every other particle,
/// with `sep = position - other`. Coincident pairs get a random unit separation.
pub fn repulsion<R: Rng>(
    index: usize,
    position: DVec3,
    coefficient: f64,
    epsilon: f64,
    neighbors: &[Particle],
    rng: &mut R,
) -> DVec3 {
    others(index, neighbors).fold(DVec3::ZERO, |acc, other| {
        let mut sep = position - other.position;
        if sep.length() < epsilon {
            sep = random_unit_vector(rng);
        }
        let dist = sep.length();
        acc + coefficient * sep / (dist * dist * dist + epsilon)
    })
}

/// Reynolds steering: turn a desired direction into a bounded corrective force.
pub fn steer(dir: DVec3, velocity: DVec3, steering: &SteeringConfig) -> DVec3 {
    let Some(unit) = dir.try_normalize() else {
        return DVec3::ZERO;
    };
    (unit * steering.max_speed - velocity).clamp_length_max(steering.max_force.max(0.0))
}

pub fn separation(
    index: usize,
    state: State,
    steering: &SteeringConfig,
    neighbors: &[Particle],
) -> DVec3 {
    let dir = others(index, neighbors).fold(DVec3::ZERO, |acc, other| {
        let diff = state.position - other.position;
        let dist = diff.length();
        if dist < MIN_SEPARATION || dist >= steering.desired_separation {
            return acc;
        }
        acc + diff / (dist * dist)
    });
    steer(dir, state.velocity, steering)
}

pub fn alignment(
    index: usize,
    state: State,
    steering: &SteeringConfig,
    neighbors: &[Particle],
) -> DVec3 {
    // Only the direction survives `steer`, so the sum stands in for the average.
    let heading = others(index, neighbors)
        .filter(|other| within(state.position, other.position, steering.neighbor_dist))
        .fold(DVec3::ZERO, |acc, other| acc + other.velocity);
    steer(heading, state.velocity, steering)
}

pub fn cohesion(
    index: usize,
    state: State,
    steering: &SteeringConfig,
    neighbors: &[Particle],
) -> DVec3 {
    let (sum, count) = others(index, neighbors)
        .filter(|other| within(state.position, other.position, steering.neighbor_dist))
        .fold((DVec3::ZERO, 0usize), |(sum, n), other| (sum + other.position, n + 1));
    if count == 0 {
        return DVec3::ZERO;
    }
    let centroid = sum / count as f64;
    steer(centroid - state.position, state.velocity, steering)
}

/// Pull back toward the interior of `bounds`, growing as `1/d^2` near a facet and
/// saturating to a fixed push once on or past it.
pub fn boundary_avoidance(state: State, steering: &SteeringConfig, bounds: &BoxBoundary) -> DVec3 {
    let dir = bounds.facets().iter().fold(DVec3::ZERO, |acc, facet| {
        let dist = facet.signed_distance(state.position);
        if dist > BOUNDARY_NEAR {
            acc + facet.normal / (dist * dist)
        } else {
            acc + facet.normal * BOUNDARY_PUSH
        }
    });
    steer(dir, state.velocity, steering)
}

fn flocking(
    index: usize,
    state: State,
    steering: &SteeringConfig,
    bounds: &BoxBoundary,
    neighbors: &[Particle],
) -> DVec3 {
    let mut total = DVec3::ZERO;
    if steering.separation != 0.0 {
        total += steering.separation * separation(index, state, steering, neighbors);
    }
    if steering.alignment != 0.0 {
        total += steering.alignment * alignment(index, state, steering, neighbors);
    }
    if steering.cohesion != 0.0 {
        total += steering.cohesion * cohesion(index, state, steering, neighbors);
    }
    if steering.boundary != 0.0 {
        total += steering.boundary * boundary_avoidance(state, steering, bounds);
    }
    total
}

#[inline]
fn within(a: DVec3, b: DVec3, radius: f64) -> bool {
    let d = a.distance(b);
    d > 0.0 && d < radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use rand::{rngs::StdRng, SeedableRng};

    fn particle(id: u32, position: DVec3, velocity: DVec3, config: ParticleConfig) -> Result<Particle> {
        Particle::new(id, position, velocity, config)
    }

    fn steering() -> SteeringConfig {
        SteeringConfig {
            max_speed: 2.0,
            max_force: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn gravity_drag_force() -> Result<()> {
        let config = ParticleConfig {
            mass: 2.0,
            drag: 0.5,
            ..Default::default()
        };
        let p = particle(0, DVec3::ZERO, DVec3::new(4.0, 0.0, 0.0), config)?;
        let mut rng = StdRng::seed_from_u64(1);
        let a = ForceModel::default().acceleration(0, p.state(), &p.config, &[p.clone()], &mut rng);
        // (2 * g - 0.5 * v) / 2
        assert!((a - DVec3::new(-1.0, -9.807, 0.0)).length() < 1e-12);
        Ok(())
    }

    #[test]
    fn repulsion_pushes_apart_and_decays() -> Result<()> {
        let config = ParticleConfig {
            repulsion: 1.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        let near = vec![
            particle(0, DVec3::ZERO, DVec3::ZERO, config)?,
            particle(1, DVec3::X, DVec3::ZERO, config)?,
        ];
        let far = vec![
            particle(0, DVec3::ZERO, DVec3::ZERO, config)?,
            particle(1, DVec3::X * 2.0, DVec3::ZERO, config)?,
        ];
        let f_near = repulsion(0, DVec3::ZERO, 1.0, NBODY_EPSILON, &near, &mut rng);
        let f_far = repulsion(0, DVec3::ZERO, 1.0, NBODY_EPSILON, &far, &mut rng);
        assert!(f_near.x < 0.0, "force should point away from the neighbor");
        // |F| ~ 1/r^2 for this kernel: doubling the distance quarters the force.
        let ratio = f_near.length() / f_far.length();
        assert!((ratio - 4.0).abs() < 1e-4, "expected ~4x, got {ratio}");
        Ok(())
    }

    #[test]
    fn random_unit_vector_is_unit() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn steer_zero_direction_is_zero() {
        assert_eq!(steer(DVec3::ZERO, DVec3::X, &steering()), DVec3::ZERO);
    }

    #[test]
    fn steer_subtracts_velocity_and_clamps() {
        let s = SteeringConfig {
            max_speed: 3.0,
            max_force: 1.0,
            ..Default::default()
        };
        // Desired (3,0,0) minus velocity (0,1,0) = (3,-1,0), clamped to length 1.
        let f = steer(DVec3::X * 10.0, DVec3::Y, &s);
        assert!((f.length() - 1.0).abs() < 1e-12);
        assert!(f.x > 0.0 && f.y < 0.0);
        let loose = SteeringConfig {
            max_force: 100.0,
            ..s
        };
        assert!((steer(DVec3::X, DVec3::Y, &loose) - DVec3::new(3.0, -1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn separation_ignores_far_and_coincident() -> Result<()> {
        let config = ParticleConfig {
            steering: steering(),
            ..Default::default()
        };
        let flock = vec![
            particle(0, DVec3::ZERO, DVec3::ZERO, config)?,
            particle(1, DVec3::ZERO, DVec3::ZERO, config)?,
            particle(2, DVec3::X * 50.0, DVec3::ZERO, config)?,
        ];
        let f = separation(0, flock[0].state(), &config.steering, &flock);
        assert_eq!(f, DVec3::ZERO);
        Ok(())
    }

    #[test]
    fn separation_points_away() -> Result<()> {
        let config = ParticleConfig {
            steering: steering(),
            ..Default::default()
        };
        let flock = vec![
            particle(0, DVec3::ZERO, DVec3::ZERO, config)?,
            particle(1, DVec3::X, DVec3::ZERO, config)?,
        ];
        let f = separation(0, flock[0].state(), &config.steering, &flock);
        assert!(f.x < 0.0);
        Ok(())
    }

    #[test]
    fn alignment_follows_neighbor_heading() -> Result<()> {
        let config = ParticleConfig {
            steering: steering(),
            ..Default::default()
        };
        let flock = vec![
            particle(0, DVec3::ZERO, DVec3::ZERO, config)?,
            particle(1, DVec3::Y, DVec3::Z * 3.0, config)?,
        ];
        let f = alignment(0, flock[0].state(), &config.steering, &flock);
        assert!((f - DVec3::Z * 2.0).length() < 1e-12);
        Ok(())
    }

    #[test]
    fn cohesion_zero_without_neighbors() -> Result<()> {
        let config = ParticleConfig {
            steering: steering(),
            ..Default::default()
        };
        let flock = vec![
            particle(0, DVec3::ZERO, DVec3::ZERO, config)?,
            particle(1, DVec3::X * 100.0, DVec3::ZERO, config)?,
        ];
        assert_eq!(cohesion(0, flock[0].state(), &config.steering, &flock), DVec3::ZERO);
        Ok(())
    }

    #[test]
    fn cohesion_steers_toward_centroid() -> Result<()> {
        let config = ParticleConfig {
            steering: steering(),
            ..Default::default()
        };
        let flock = vec![
            particle(0, DVec3::ZERO, DVec3::ZERO, config)?,
            particle(1, DVec3::new(1.0, 1.0, 0.0), DVec3::ZERO, config)?,
            particle(2, DVec3::new(1.0, -1.0, 0.0), DVec3::ZERO, config)?,
        ];
        let f = cohesion(0, flock[0].state(), &config.steering, &flock);
        assert!((f - DVec3::X * 2.0).length() < 1e-12);
        Ok(())
    }

    #[test]
    fn boundary_avoidance_pushes_inward_near_wall() -> Result<()> {
        let bounds = BoxBoundary::new(DVec3::ZERO, DVec3::splat(10.0))?;
        let s = steering();
        // Close to the x-min wall, centered on the other axes.
        let f = boundary_avoidance(
            State::new(DVec3::new(0.5, 5.0, 5.0), DVec3::ZERO),
            &s,
            &bounds,
        );
        assert!(f.x > 0.0);
        assert!(f.y.abs() < 1e-9 && f.z.abs() < 1e-9);
        // Past the wall the constant push dominates.
        let out = boundary_avoidance(
            State::new(DVec3::new(-1.0, 5.0, 5.0), DVec3::ZERO),
            &s,
            &bounds,
        );
        assert!(out.x > 0.0);
        Ok(())
    }

    #[test]
    fn disabled_weights_contribute_nothing() -> Result<()> {
        let bounds = BoxBoundary::new(DVec3::ZERO, DVec3::splat(10.0))?;
        let config = ParticleConfig {
            steering: SteeringConfig {
                separation: 0.0,
                alignment: 0.0,
                cohesion: 0.0,
                boundary: 0.0,
                ..steering()
            },
            ..Default::default()
        };
        let flock = vec![
            particle(0, DVec3::splat(1.0), DVec3::ZERO, config)?,
            particle(1, DVec3::splat(1.5), DVec3::X, config)?,
        ];
        let mut rng = StdRng::seed_from_u64(4);
        let model = ForceModel::Flocking { bounds };
        assert_eq!(model.force(0, flock[0].state(), &config, &flock, &mut rng), DVec3::ZERO);
        Ok(())
    }
}
