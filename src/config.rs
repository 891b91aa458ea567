//! Scenario configuration loaded from YAML.
//!
//! A scenario consists of:
//!
//! - [`BoundaryConfig`]   – open space, a confining box or an excluding sphere
//! - [`ForceModelConfig`] – gravity + drag, N-body repulsion or flocking
//! - [`ParticleSpec`]     – initial state and physical config of each particle
//! - [`SimulationConfig`] – top-level wrapper (seed, update order, the above)
//!
//! # YAML format
//!
//! ```yaml
//! seed: 42
//! update_order: snapshot      # or "sequential"
//! boundary:
//!   kind: box
//!   min: [-10.0, 0.0, -10.0]
//!   max: [10.0, 20.0, 10.0]
//! force_model:
//!   kind: gravity_drag
//!   gravity: [0.0, -9.807, 0.0]
//! particles:
//!   - position: [0.0, 5.0, 0.0]
//!     velocity: [0.0, -10.0, 0.0]
//!     config:
//!       mass: 1.0
//!       drag: 0.1
//!       restitution: 0.5
//! ```
//!
//! Vectors are `[x, y, z]` sequences. Omitted fields take their defaults.

use crate::core::boundary::{Boundary, BoxBoundary, SphereBoundary};
use crate::core::force::{ForceModel, NBODY_EPSILON, STANDARD_GRAVITY};
use crate::core::particle::ParticleConfig;
use crate::core::sim::{Simulation, UpdateOrder};
use crate::error::Result;
use glam::DVec3;
use serde::Deserialize;
use std::path::Path;

/// Boundary geometry.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum BoundaryConfig {
    #[default]
    Open,
    Box { min: DVec3, max: DVec3 },
    Sphere { center: DVec3, radius: f64 },
}

/// Force accumulation strategy.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ForceModelConfig {
    GravityDrag {
        #[serde(default = "default_gravity")]
        gravity: DVec3,
    },
    #[serde(rename = "n_body")]
    NBody {
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
    /// Boids steer away from the facets of the `min`/`max` box.
    Flocking { min: DVec3, max: DVec3 },
}

impl Default for ForceModelConfig {
    fn default() -> Self {
        ForceModelConfig::GravityDrag {
            gravity: STANDARD_GRAVITY,
        }
    }
}

fn default_gravity() -> DVec3 {
    STANDARD_GRAVITY
}

fn default_epsilon() -> f64 {
    NBODY_EPSILON
}

/// Initial state of one particle.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParticleSpec {
    pub position: DVec3,
    #[serde(default)]
    pub velocity: DVec3,
    #[serde(default)]
    pub config: ParticleConfig,
}

/// Top-level scenario configuration.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub update_order: UpdateOrder,
    #[serde(default)]
    pub boundary: BoundaryConfig,
    #[serde(default)]
    pub force_model: ForceModelConfig,
    #[serde(default)]
    pub particles: Vec<ParticleSpec>,
}

impl SimulationConfig {
    /// Parse a scenario from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a scenario file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

impl BoundaryConfig {
    /// Errors: `Error::InvalidParam` for an inverted box or a bad sphere.
    pub fn build(&self) -> Result<Boundary> {
        Ok(match self {
            BoundaryConfig::Open => Boundary::Open,
            BoundaryConfig::Box { min, max } => Boundary::Box(BoxBoundary::new(*min, *max)?),
            BoundaryConfig::Sphere { center, radius } => {
                Boundary::Sphere(SphereBoundary::new(*center, *radius)?)
            }
        })
    }
}

impl ForceModelConfig {
    /// Errors: `Error::InvalidParam` for an inverted flocking box.
    pub fn build(&self) -> Result<ForceModel> {
        Ok(match self {
            ForceModelConfig::GravityDrag { gravity } => ForceModel::GravityDrag { gravity: *gravity },
            ForceModelConfig::NBody { epsilon } => ForceModel::NBody { epsilon: *epsilon },
            ForceModelConfig::Flocking { min, max } => ForceModel::Flocking {
                bounds: BoxBoundary::new(*min, *max)?,
            },
        })
    }
}

impl Simulation {
    /// Build a simulation and register every particle of `config`.
    ///
    /// Errors: any invalid boundary, force model or particle parameter.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let boundary = config.boundary.build()?;
        let force_model = config.force_model.build()?;
        let mut sim = Simulation::new(boundary, force_model, config.seed)
            .with_update_order(config.update_order);
        for spec in &config.particles {
            sim.add_particle(spec.position, spec.velocity, spec.config)?;
        }
        log::info!(
            "built simulation: {} particles, {:?} update order",
            sim.num_particles(),
            sim.update_order()
        );
        Ok(sim)
    }
}
