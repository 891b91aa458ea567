//! Python bindings (feature `python`).
//!
//! Exposes `boundsim.Simulation`, built from a YAML scenario string, with NumPy
//! views of positions and velocities.

use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::path::PathBuf;

use crate::config::SimulationConfig;
use crate::core::{ParticleConfig, Simulation};
use glam::DVec3;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn to_array(rows: &[DVec3]) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((rows.len(), 3));
    for (i, v) in rows.iter().enumerate() {
        arr[[i, 0]] = v.x;
        arr[[i, 1]] = v.y;
        arr[[i, 2]] = v.z;
    }
    arr
}

/// Read an (N, 3) float64 array, checking shape and finiteness.
fn from_array(values: &PyReadonlyArray2<'_, f64>, n: usize, what: &str) -> PyResult<Vec<DVec3>> {
    let arr = values.as_array();
    if arr.dim() != (n, 3) {
        return Err(py_err(format!(
            "{what} must have shape ({n}, 3), got {:?}",
            arr.shape()
        )));
    }
    let rows: Vec<DVec3> = arr
        .rows()
        .into_iter()
        .map(|r| DVec3::new(r[0], r[1], r[2]))
        .collect();
    if !rows.iter().all(|v| v.is_finite()) {
        return Err(py_err(format!("{what} values must be finite")));
    }
    Ok(rows)
}

/// Python-facing wrapper around the Rust `Simulation`.
///
/// - __new__(scenario_yaml)
/// - from_file(path)
/// - add_particle(position, velocity=(0,0,0), mass=1.0, drag=0.0, repulsion=0.0, restitution=1.0)
/// - tick(dt) -> number of boundary impacts
/// - get_positions() / get_velocities() -> np.ndarray, shape (N, 3)
#[pyclass(name = "Simulation")]
pub struct PySimulation {
    sim: Simulation,
}

#[pymethods]
impl PySimulation {
    /// Build a simulation from a YAML scenario.
    ///
    /// Errors: raises ValueError on malformed YAML or invalid parameters.
    #[new]
    fn new(scenario_yaml: &str) -> PyResult<Self> {
        let cfg = SimulationConfig::from_yaml_str(scenario_yaml).map_err(py_err)?;
        let sim = Simulation::from_config(&cfg).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Build a simulation from a YAML scenario file.
    #[staticmethod]
    fn from_file(path: PathBuf) -> PyResult<Self> {
        let cfg = SimulationConfig::from_path(path).map_err(py_err)?;
        let sim = Simulation::from_config(&cfg).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Register a particle; returns its id.
    #[pyo3(signature = (position, velocity=[0.0, 0.0, 0.0], mass=1.0, drag=0.0, repulsion=0.0, restitution=1.0))]
    fn add_particle(
        &mut self,
        position: [f64; 3],
        velocity: [f64; 3],
        mass: f64,
        drag: f64,
        repulsion: f64,
        restitution: f64,
    ) -> PyResult<u32> {
        let config = ParticleConfig {
            mass,
            drag,
            repulsion,
            restitution,
            ..Default::default()
        };
        self.sim
            .add_particle(DVec3::from_array(position), DVec3::from_array(velocity), config)
            .map_err(py_err)
    }

    /// Remove a particle by id; returns whether it existed.
    fn remove_particle(&mut self, id: u32) -> bool {
        self.sim.remove_particle(id).is_some()
    }

    /// Advance one frame (releases the GIL during computation).
    fn tick(&mut self, py: Python<'_>, dt: f64) -> PyResult<usize> {
        py.detach(|| self.sim.tick(dt))
            .map(|report| report.impacts)
            .map_err(py_err)
    }

    fn time(&self) -> f64 {
        self.sim.time()
    }

    fn frame(&self) -> u64 {
        self.sim.frame()
    }

    fn num_particles(&self) -> usize {
        self.sim.num_particles()
    }

    fn kinetic_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }

    /// Return positions as a NumPy array of shape (N, 3), dtype=float64.
    fn get_positions(&self, py: Python<'_>) -> Py<PyArray2<f64>> {
        to_array(&self.sim.positions()).into_pyarray(py).unbind()
    }

    /// Return velocities as a NumPy array of shape (N, 3), dtype=float64.
    fn get_velocities(&self, py: Python<'_>) -> Py<PyArray2<f64>> {
        to_array(&self.sim.velocities()).into_pyarray(py).unbind()
    }

    /// Overwrite all positions from an (N, 3) float64 array.
    fn set_positions(&mut self, positions: PyReadonlyArray2<'_, f64>) -> PyResult<()> {
        let rows = from_array(&positions, self.sim.num_particles(), "positions")?;
        for (p, r) in self.sim.particles.iter_mut().zip(rows) {
            p.position = r;
        }
        Ok(())
    }

    /// Overwrite all velocities from an (N, 3) float64 array.
    fn set_velocities(&mut self, velocities: PyReadonlyArray2<'_, f64>) -> PyResult<()> {
        let rows = from_array(&velocities, self.sim.num_particles(), "velocities")?;
        for (p, v) in self.sim.particles.iter_mut().zip(rows) {
            p.velocity = v;
        }
        Ok(())
    }
}

/// The boundsim Python module entry point.
#[pymodule]
fn boundsim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySimulation>()?;
    Ok(())
}
