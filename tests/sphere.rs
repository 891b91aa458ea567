use boundsim::core::integrator::integrate;
use boundsim::core::resolver::resolve;
use boundsim::core::{
    Boundary, CollisionSurface, ForceModel, ParticleConfig, Simulation, SphereBoundary, State,
};
use boundsim::error::Result;
use glam::DVec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

const TOL: f64 = 1e-9;

fn coast(state: State, dt: f64) -> State {
    integrate(state, DVec3::ZERO, dt)
}

fn still_space() -> ForceModel {
    ForceModel::GravityDrag {
        gravity: DVec3::ZERO,
    }
}

/// Head-on approach along -x: reflected at (2, 0, 0) and leaves at the incoming speed.
#[test]
fn head_on_elastic_bounce() -> Result<()> {
    let s = SphereBoundary::new(DVec3::ZERO, 2.0)?;
    let mut sim = Simulation::new(Boundary::Sphere(s), still_space(), Some(5));
    let id = sim.add_particle(
        DVec3::new(10.0, 0.0, 0.0),
        DVec3::new(-5.0, 0.0, 0.0),
        ParticleConfig::default(),
    )?;
    let report = sim.tick(1.7)?;
    assert_eq!(report.impacts, 1);

    let p = sim.particle(id).expect("registered");
    assert!(p.position.length() >= 2.0 - TOL);
    // Impact at t = 1.6, then 0.1 s back out along +x.
    assert!((p.position - DVec3::new(2.5, 0.0, 0.0)).length() < TOL);
    assert!((p.velocity - DVec3::new(5.0, 0.0, 0.0)).length() < TOL);
    Ok(())
}

/// A tentative position exactly at the center is equidistant from both roots; the
/// entry point wins.
#[test]
fn equidistant_roots_pick_entry_side() -> Result<()> {
    let s = SphereBoundary::new(DVec3::ZERO, 2.0)?;
    let start = State::new(DVec3::new(10.0, 0.0, 0.0), DVec3::new(-5.0, 0.0, 0.0));
    let res = resolve(&s, start, coast(start, 2.0), 2.0, 1.0, coast);
    assert_eq!(res.impacts(), 1);
    let hit = res.events[0];
    assert!((hit.position - DVec3::new(2.0, 0.0, 0.0)).length() < TOL);
    assert!((hit.time_f64() - 1.6).abs() < TOL);
    assert_eq!(hit.facet, None);
    assert!((res.state.position - DVec3::new(4.0, 0.0, 0.0)).length() < TOL);
    Ok(())
}

/// A path ending past the center is nearer the far side: the impact lands on the
/// exit point, its overrunning time is clamped to the frame, and the particle then
/// flies away from there without a second impact.
#[test]
fn deep_overshoot_reflects_at_exit_side() -> Result<()> {
    let s = SphereBoundary::new(DVec3::ZERO, 2.0)?;
    let start = State::new(DVec3::new(5.0, 0.0, 0.0), DVec3::new(-5.0, 0.0, 0.0));
    let res = resolve(&s, start, coast(start, 1.3), 1.3, 1.0, coast);
    assert_eq!(res.impacts(), 1);
    let hit = res.events[0];
    assert!((hit.position - DVec3::new(-2.0, 0.0, 0.0)).length() < TOL);
    assert!((hit.velocity - DVec3::new(5.0, 0.0, 0.0)).length() < TOL);
    // 7 m at 5 m/s would take 1.4 s.
    assert_eq!(hit.time_f64(), 1.3);
    assert_eq!(res.remaining, 0.0);
    assert!((res.state.position - hit.position).length() < TOL);

    let mut sim = Simulation::new(Boundary::Sphere(s), still_space(), Some(5));
    let id = sim.add_particle(start.position, start.velocity, ParticleConfig::default())?;
    assert_eq!(sim.tick(1.3)?.impacts, 1);
    for expected_x in [4.5, 11.0, 17.5] {
        let report = sim.tick(1.3)?;
        assert_eq!(report.impacts, 0);
        let p = sim.particle(id).expect("registered");
        assert!((p.position - DVec3::new(expected_x, 0.0, 0.0)).length() < TOL);
        assert!((p.velocity - DVec3::new(5.0, 0.0, 0.0)).length() < TOL);
    }
    Ok(())
}

/// Off-center hits only reverse the radial part of the velocity.
#[test]
fn oblique_bounce_keeps_tangential_velocity() -> Result<()> {
    let s = SphereBoundary::new(DVec3::ZERO, 2.0)?;
    let start = State::new(DVec3::new(5.0, 1.0, 0.0), DVec3::new(-4.0, 0.0, 0.0));
    let res = resolve(&s, start, coast(start, 1.0), 1.0, 1.0, coast);
    assert_eq!(res.impacts(), 1);
    let hit = res.events[0];
    assert!((hit.position.length() - 2.0).abs() < TOL);

    let outward = hit.position.normalize();
    let incoming = start.velocity;
    let tangential_in = incoming - incoming.dot(outward) * outward;
    let tangential_out = hit.velocity - hit.velocity.dot(outward) * outward;
    assert!((tangential_in - tangential_out).length() < TOL);
    assert!((hit.velocity.dot(outward) + incoming.dot(outward)).abs() < TOL);
    assert!(s.admits(res.state.position, TOL));
    Ok(())
}

/// A miss that stays outside the sphere is free flight.
#[test]
fn passing_particle_is_untouched() -> Result<()> {
    let s = SphereBoundary::new(DVec3::ZERO, 1.0)?;
    let start = State::new(DVec3::new(-3.0, 1.5, 0.0), DVec3::new(2.0, 0.0, 0.0));
    let tentative = coast(start, 1.0);
    let res = resolve(&s, start, tentative, 1.0, 1.0, coast);
    assert_eq!(res.impacts(), 0);
    assert_eq!(res.state, tentative);
    Ok(())
}

/// Balls rained onto a dome under gravity never end a frame inside it.
#[test]
fn dome_excludes_falling_particles() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let s = SphereBoundary::new(DVec3::ZERO, 2.0)?;
    let mut sim = Simulation::new(Boundary::Sphere(s), ForceModel::default(), Some(11));
    let mut rng = StdRng::seed_from_u64(77);
    for _ in 0..24 {
        let position = DVec3::new(
            rng.random_range(-1.2..=1.2),
            rng.random_range(3.0..=8.0),
            rng.random_range(-1.2..=1.2),
        );
        let config = ParticleConfig {
            restitution: rng.random_range(0.0..=1.0),
            ..Default::default()
        };
        sim.add_particle(position, DVec3::ZERO, config)?;
    }

    let mut impacts = 0;
    for _ in 0..240 {
        let report = sim.tick(1.0 / 60.0)?;
        impacts += report.impacts;
        if report.capped > 0 {
            continue;
        }
        for p in &sim.particles {
            assert!(
                s.admits(p.position, TOL),
                "particle {} inside the sphere at {} (|r| = {})",
                p.id,
                p.position,
                p.position.length()
            );
        }
    }
    assert!(impacts >= 24);
    Ok(())
}
