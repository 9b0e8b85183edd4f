use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::particle::DIM;
use crate::core::{Flock, FlockParams};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// FlockSim: Python-facing wrapper around the Rust flocking driver.
///
/// API:
/// - __new__(num_particles, side_length, cutoff, disturbance, radius=0.0, speed=0.03,
///   seed=None, strict_geometry=False)
/// - advance(ticks)
/// - get_positions() -> np.ndarray, shape (N, 2)
/// - get_orientations() -> np.ndarray, shape (N,)
#[pyclass]
pub struct FlockSim {
    flock: Flock,
}

#[pymethods]
impl FlockSim {
    /// Create a flock of randomly placed, non-overlapping disks on a periodic square domain.
    ///
    /// Parameters
    /// - num_particles: number of particles (int, > 0)
    /// - side_length: domain side L (float, > 0)
    /// - cutoff: interaction radius rc (float, 0 < rc <= L)
    /// - disturbance: noise amplitude (float, >= 0)
    /// - radius: disk radius (float, >= 0)
    /// - speed: displacement per tick (float, >= 0)
    /// - seed: RNG seed (int) for reproducibility; None for nondeterministic
    /// - strict_geometry: fail ticks that break the cell-size condition instead of warning
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (num_particles, side_length, cutoff, disturbance, radius=0.0, speed=0.03, seed=None, strict_geometry=false))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        num_particles: usize,
        side_length: f64,
        cutoff: f64,
        disturbance: f64,
        radius: f64,
        speed: f64,
        seed: Option<u64>,
        strict_geometry: bool,
    ) -> PyResult<Self> {
        let params = FlockParams::new(side_length, cutoff, disturbance)
            .map_err(py_err)?
            .with_strict_geometry(strict_geometry);
        let flock = Flock::random(num_particles, params, radius, speed, seed).map_err(py_err)?;
        Ok(Self { flock })
    }

    /// Run `ticks` synchronous ticks (releases the GIL during computation).
    fn advance(&mut self, py: Python<'_>, ticks: u64) -> PyResult<()> {
        py.detach(|| self.flock.advance(ticks)).map_err(py_err)
    }

    /// Number of completed ticks.
    fn tick_count(&self) -> u64 {
        self.flock.tick_count()
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let n = self.flock.num_particles();
        let mut arr = Array2::<f64>::zeros((n, DIM));
        for (i, p) in self.flock.particles().iter().enumerate() {
            for k in 0..DIM {
                arr[[i, k]] = p.r[k];
            }
        }
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Return headings in radians as a NumPy array of shape (N,).
    fn get_orientations<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<f64>>> {
        Ok(self.flock.orientations().into_pyarray(py).to_owned().into())
    }

    /// Particle ids, in the same order as positions and orientations.
    fn get_ids(&self) -> Vec<u32> {
        self.flock.particles().iter().map(|p| p.id).collect()
    }

    /// Ids of the particles currently within the cutoff of particle `id`.
    ///
    /// Errors: raises ValueError for an unknown id.
    fn get_neighbors(&self, id: u32) -> PyResult<Vec<u32>> {
        let map = self.flock.neighbors().map_err(py_err)?;
        map.neighbors(id)
            .map(|set| set.iter().copied().collect())
            .ok_or_else(|| py_err(format!("unknown particle id {id}")))
    }

    /// Polarization of the flock, in [0, 1].
    fn get_order_parameter(&self) -> f64 {
        self.flock.order_parameter()
    }
}

/// The flocksim Python module entry point.
#[pymodule]
fn flocksim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<FlockSim>()?;
    Ok(())
}
