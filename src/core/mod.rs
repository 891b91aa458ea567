#![allow(missing_docs)] // Public items are documented where the behavior is not obvious from the name

//! Particle kinematics and boundary-collision core.
//!
//! Leaves first: `geometry` (state + intersection math), `boundary` (box / sphere
//! surfaces), `force` (acceleration models), `integrator` (semi-implicit Euler),
//! `resolver` (sub-step collision loop), `sim` (the per-frame tick driver).

pub mod boundary;
pub mod event;
pub mod force;
pub mod geometry;
pub mod integrator;
pub mod particle;
pub mod resolver;
pub mod sim;

pub use boundary::{Boundary, BoxBoundary, CollisionSurface, Facet, SphereBoundary};
pub use event::CollisionEvent;
pub use force::{ForceModel, NBODY_EPSILON, STANDARD_GRAVITY};
pub use geometry::State;
pub use particle::{Particle, ParticleConfig, SteeringConfig};
pub use resolver::{Resolution, MAX_RESOLVE_ITERATIONS};
pub use sim::{Simulation, TickReport, UpdateOrder};
