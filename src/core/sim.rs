use crate::core::boundary::Boundary;
use crate::core::force::ForceModel;
use crate::core::geometry::State;
use crate::core::integrator::step;
use crate::core::particle::{Particle, ParticleConfig};
use crate::core::resolver::{resolve_boundary, Resolution};
use crate::error::{Error, Result};
use glam::DVec3;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;

/// How neighbor-reading force models see the registry during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOrder {
    /// Every particle reads the registry as it was at the start of the tick;
    /// all new states are committed together. Order-independent.
    #[default]
    Snapshot,
    /// Particles are committed one at a time in registry order, so later ones see
    /// neighbors that were already advanced this tick.
    Sequential,
}

/// Summary of the last `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    pub dt: f64,
    pub particles: usize,
    /// Boundary impacts resolved across all particles.
    pub impacts: usize,
    /// Particles whose resolution stopped at the iteration cap.
    pub capped: usize,
}

/// Simulation context: owns the particle registry and advances it one frame at a time.
///
/// Each `tick(dt)` evaluates the force model, integrates (semi-implicit Euler),
/// resolves the path against the boundary and commits, once per particle.
#[derive(Debug)]
pub struct Simulation {
    time_now: f64,
    frame: u64,
    next_id: u32,
    boundary: Boundary,
    force_model: ForceModel,
    update_order: UpdateOrder,
    rng: StdRng,
    last_report: TickReport,
    pub particles: Vec<Particle>,
}

impl Simulation {
    /// Create an empty simulation.
    ///
    /// `seed` drives the random directions used for coincident N-body pairs;
    /// `None` seeds from the thread RNG.
    pub fn new(boundary: Boundary, force_model: ForceModel, seed: Option<u64>) -> Self {
        let rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        Self {
            time_now: 0.0,
            frame: 0,
            next_id: 0,
            boundary,
            force_model,
            update_order: UpdateOrder::default(),
            rng,
            last_report: TickReport::default(),
            particles: Vec::new(),
        }
    }

    pub fn with_update_order(mut self, order: UpdateOrder) -> Self {
        self.update_order = order;
        self
    }

    pub fn set_update_order(&mut self, order: UpdateOrder) {
        self.update_order = order;
    }

    pub fn update_order(&self) -> UpdateOrder {
        self.update_order
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn force_model(&self) -> &ForceModel {
        &self.force_model
    }

    /// Register a particle and return its id.
    ///
    /// Errors:
    /// - `Error::InvalidParam` for non-finite state or an invalid config.
    pub fn add_particle(
        &mut self,
        position: DVec3,
        velocity: DVec3,
        config: ParticleConfig,
    ) -> Result<u32> {
        let id = self.next_id;
        let particle = Particle::new(id, position, velocity, config)?;
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| Error::InvalidParam("particle id space exhausted".into()))?;
        self.particles.push(particle);
        Ok(id)
    }

    /// Remove a particle by id, keeping the order of the others.
    pub fn remove_particle(&mut self, id: u32) -> Option<Particle> {
        let idx = self.particles.iter().position(|p| p.id == id)?;
        Some(self.particles.remove(idx))
    }

    pub fn particle(&self, id: u32) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    /// Registered particles in update order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Returns current simulation time.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn positions(&self) -> Vec<DVec3> {
        self.particles.iter().map(|p| p.position).collect()
    }

    pub fn velocities(&self) -> Vec<DVec3> {
        self.particles.iter().map(|p| p.velocity).collect()
    }

    /// Compute total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    pub fn last_report(&self) -> TickReport {
        self.last_report
    }

    /// Advance every particle by one frame of length `dt`.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `dt` is negative or not finite.
    pub fn tick(&mut self, dt: f64) -> Result<TickReport> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(Error::InvalidParam(format!(
                "dt must be finite and >= 0, got {dt}"
            )));
        }

        let mut report = TickReport {
            dt,
            particles: self.particles.len(),
            ..Default::default()
        };

        match self.update_order {
            UpdateOrder::Snapshot => {
                let snapshot = self.particles.clone();
                let resolutions: Vec<Resolution> = (0..snapshot.len())
                    .map(|i| {
                        advance_particle(
                            &self.force_model,
                            &self.boundary,
                            &snapshot,
                            i,
                            dt,
                            &mut self.rng,
                        )
                    })
                    .collect();
                for (p, res) in self.particles.iter_mut().zip(resolutions) {
                    record(&mut report, p.id, &res);
                    p.commit(res.state, res.impacts());
                }
            }
            UpdateOrder::Sequential => {
                for i in 0..self.particles.len() {
                    let res = advance_particle(
                        &self.force_model,
                        &self.boundary,
                        &self.particles,
                        i,
                        dt,
                        &mut self.rng,
                    );
                    let p = &mut self.particles[i];
                    record(&mut report, p.id, &res);
                    p.commit(res.state, res.impacts());
                }
            }
        }

        self.time_now += dt;
        self.frame += 1;
        self.last_report = report;
        log::trace!(
            "frame {} (t = {:.4}): {} particles, {} impacts, {} capped",
            self.frame,
            self.time_now,
            report.particles,
            report.impacts,
            report.capped
        );
        Ok(report)
    }
}

// ============ Internal helpers ============

/// Integrate particle `index` over `dt` against `view` and resolve the path.
fn advance_particle(
    model: &ForceModel,
    boundary: &Boundary,
    view: &[Particle],
    index: usize,
    dt: f64,
    rng: &mut StdRng,
) -> Resolution {
    let particle = &view[index];
    let config = particle.config;
    let start = particle.state();
    let tentative = step(model, index, start, &config, view, rng, dt);
    resolve_boundary(
        boundary,
        start,
        tentative,
        dt,
        config.restitution,
        |state: State, left: f64| step(model, index, state, &config, view, rng, left),
    )
}

fn record(report: &mut TickReport, id: u32, res: &Resolution) {
    report.impacts += res.impacts();
    if res.capped {
        report.capped += 1;
        log::debug!(
            "particle {id}: collision resolution capped after {} impacts, {:.3e}s unresolved",
            res.impacts(),
            res.remaining
        );
    }
}
