//! Frame-stepped point-particle simulation with sub-step boundary collisions.
//!
//! Particles move under a selectable [`ForceModel`](core::ForceModel) (gravity +
//! drag, inverse-cube N-body repulsion, or flocking), are integrated with
//! semi-implicit Euler and bounce off an axis-aligned box that confines them or a
//! sphere that excludes them. [`Simulation::tick`](core::Simulation::tick) advances
//! every particle by one frame.
//!
//! ```
//! use boundsim::core::{Boundary, BoxBoundary, ForceModel, ParticleConfig, Simulation};
//! use glam::DVec3;
//!
//! # fn main() -> boundsim::error::Result<()> {
//! let bounds = BoxBoundary::new(DVec3::new(-10.0, 0.0, -10.0), DVec3::new(10.0, 20.0, 10.0))?;
//! let mut sim = Simulation::new(Boundary::Box(bounds), ForceModel::default(), Some(42));
//! let config = ParticleConfig { restitution: 0.5, ..Default::default() };
//! sim.add_particle(DVec3::new(0.0, 5.0, 0.0), DVec3::new(0.0, -10.0, 0.0), config)?;
//! sim.tick(1.0 / 60.0)?;
//! assert!(sim.positions()[0].y >= 0.0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::config::SimulationConfig;
pub use crate::core::Simulation;
