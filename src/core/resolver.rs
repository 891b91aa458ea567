//! Sub-stepping collision resolution shared by every boundary.
//!
//! One frame's path is cut at each impact: the bounce is applied at the impact
//! point and the leftover time is re-integrated from there, until the path stays
//! inside the valid region or the iteration cap is reached.

use crate::core::boundary::{Boundary, CollisionSurface};
use crate::core::event::CollisionEvent;
use crate::core::geometry::State;

/// Upper bound on impacts resolved for one particle in one frame.
///
/// Reaching it stops resolution and accepts the current (possibly slightly
/// penetrating) state; it is not reported as an error.
pub const MAX_RESOLVE_ITERATIONS: usize = 100;

/// Outcome of resolving one particle's frame against a boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// State to commit.
    pub state: State,
    /// Impacts in the order they were resolved.
    pub events: Vec<CollisionEvent>,
    /// Time of free flight after the last impact (the whole frame when there was none).
    pub remaining: f64,
    /// True when the iteration cap cut resolution short.
    pub capped: bool,
}

impl Resolution {
    /// Resolution of a path that never met a boundary.
    pub fn free(state: State, dt: f64) -> Self {
        Self {
            state,
            events: Vec::new(),
            remaining: dt,
            capped: false,
        }
    }

    pub fn impacts(&self) -> usize {
        self.events.len()
    }

    /// Sum of all times-to-impact plus the final free flight.
    pub fn consumed_time(&self) -> f64 {
        self.events.iter().map(CollisionEvent::time_f64).sum::<f64>() + self.remaining
    }
}

/// Resolve the path `start -> tentative` over `dt` against `surface`.
///
/// `step(state, dt)` re-integrates leftover time from an impact state; it is the
/// same force model + integrator that produced `tentative`.
pub fn resolve<S, F>(
    surface: &S,
    start: State,
    tentative: State,
    dt: f64,
    restitution: f64,
    mut step: F,
) -> Resolution
where
    S: CollisionSurface + ?Sized,
    F: FnMut(State, f64) -> State,
{
    let mut old = start.position;
    let mut current = tentative;
    let mut remaining = dt;
    let mut events = Vec::new();
    let mut capped = false;

    while remaining >= 0.0 {
        let Some(event) = surface.detect(old, current.position, remaining, restitution) else {
            break;
        };
        if events.len() >= MAX_RESOLVE_ITERATIONS {
            capped = true;
            break;
        }

        let t = event.time_f64();
        let impact = State::new(event.position, event.velocity);
        current = step(impact, remaining - t);
        old = impact.position;
        remaining -= t;
        events.push(event);
    }

    Resolution {
        state: current,
        events,
        remaining,
        capped,
    }
}

/// Resolve against whatever `boundary` is configured; an open boundary accepts
/// the tentative state unchanged.
pub fn resolve_boundary<F>(
    boundary: &Boundary,
    start: State,
    tentative: State,
    dt: f64,
    restitution: f64,
    step: F,
) -> Resolution
where
    F: FnMut(State, f64) -> State,
{
    match boundary.surface() {
        Some(surface) => resolve(surface, start, tentative, dt, restitution, step),
        None => Resolution::free(tentative, dt),
    }
}
