use crate::core::brute_force::min_image_distance;
use crate::core::flocking::{order_parameter, step};
use crate::core::geometry::check_geometry;
use crate::core::neighbors::NeighborMap;
use crate::core::particle::DIM;
use crate::core::{find_neighbors, FlockParams, Particle};
use crate::error::{Error, Result};
use log::{debug, warn};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeSet;
use std::f64::consts::PI;

/// Give up placing a particle after this many overlapping draws.
const MAX_PLACEMENT_ATTEMPTS: usize = 1_000_000;

/// Off-lattice flocking run on a periodic square domain.
///
/// Holds the particle set between ticks together with the parameters and the noise RNG.
/// Each [`Flock::tick`] replaces the whole set at once, or leaves it untouched on error.
#[derive(Debug)]
pub struct Flock {
    tick: u64,
    params: FlockParams,
    particles: Vec<Particle>,
    rng: StdRng,
    geometry_warned: bool,
}

impl Flock {
    /// Start a run from caller-supplied particles.
    ///
    /// Errors:
    /// - `Error::InvalidGridGeometry`/`Error::InvalidParam` if `params` are invalid.
    /// - `Error::InvalidParam` if two particles share an id.
    /// - `Error::OutOfDomainParticle` if a particle lies outside `[0, L)²`.
    pub fn new(particles: Vec<Particle>, params: FlockParams, seed: Option<u64>) -> Result<Self> {
        params.validate()?;
        let l = params.side_length;
        let mut ids = BTreeSet::new();
        for p in &particles {
            if !ids.insert(p.id) {
                return Err(Error::InvalidParam(format!(
                    "duplicate particle id {}",
                    p.id
                )));
            }
            if !p.r.iter().all(|&v| (0.0..l).contains(&v)) {
                return Err(Error::OutOfDomainParticle {
                    id: p.id,
                    x: p.x(),
                    y: p.y(),
                });
            }
        }
        Ok(Self {
            tick: 0,
            params,
            particles,
            rng: seeded_rng(seed),
            geometry_warned: false,
        })
    }

    /// Start a run with `num_particles` disks of equal `radius` and `speed`.
    ///
    /// Positions are rejection-sampled in `[0, L)²` so that no two disks overlap across
    /// the periodic boundary; headings are uniform in `[-π, π)`. Ids are `0..num_particles`.
    pub fn random(
        num_particles: usize,
        params: FlockParams,
        radius: f64,
        speed: f64,
        seed: Option<u64>,
    ) -> Result<Self> {
        if num_particles == 0 {
            return Err(Error::InvalidParam("num_particles must be > 0".into()));
        }
        if num_particles > u32::MAX as usize {
            return Err(Error::InvalidParam(format!(
                "num_particles must fit in a u32 id, got {num_particles}"
            )));
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::InvalidParam("radius must be finite and >= 0".into()));
        }
        if !speed.is_finite() || speed < 0.0 {
            return Err(Error::InvalidParam("speed must be finite and >= 0".into()));
        }
        params.validate()?;
        let l = params.side_length;
        if l < 2.0 * radius {
            return Err(Error::InvalidParam(
                "side_length must be at least 2 * radius".into(),
            ));
        }

        let mut rng = seeded_rng(seed);
        let mut particles: Vec<Particle> = Vec::with_capacity(num_particles);
        for id in 0..(num_particles as u32) {
            let mut attempts = 0usize;
            let candidate = loop {
                if attempts >= MAX_PLACEMENT_ATTEMPTS {
                    return Err(Error::InvalidParam(format!(
                        "failed to place particle {id} without overlap; try fewer particles or a smaller radius"
                    )));
                }
                attempts += 1;
                let mut r = [0.0_f64; DIM];
                r.iter_mut().for_each(|v| *v = rng.random_range(0.0..l));
                let theta = rng.random_range(-PI..PI);
                let candidate = Particle::new(id, r, radius, theta, speed)?;
                if !overlaps_existing(&particles, &candidate, l) {
                    break candidate;
                }
            };
            particles.push(candidate);
        }
        debug!(
            "placed {} particles (density {:.4})",
            particles.len(),
            params.density(particles.len())
        );

        Ok(Self {
            tick: 0,
            params,
            particles,
            rng,
            geometry_warned: false,
        })
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn params(&self) -> &FlockParams {
        &self.params
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Current particle states, in creation order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Positions as a Vec of fixed-size arrays.
    pub fn positions(&self) -> Vec<[f64; DIM]> {
        self.particles.iter().map(|p| p.r).collect()
    }

    /// Headings in radians.
    pub fn orientations(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.orientation).collect()
    }

    /// Advance by one synchronous tick.
    ///
    /// With `strict_geometry` a broken cell-size condition fails the tick with
    /// `Error::GeometryPreconditionViolation`; otherwise it is logged once and the tick runs.
    pub fn tick(&mut self) -> Result<()> {
        self.check_geometry()?;
        let FlockParams {
            side_length,
            cutoff,
            disturbance,
            ..
        } = self.params;
        let next = step(
            &self.particles,
            side_length,
            cutoff,
            disturbance,
            &mut self.rng,
        )?;
        self.particles = next;
        self.tick += 1;
        Ok(())
    }

    /// Run `ticks` ticks, stopping at the first error.
    pub fn advance(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.tick()?;
        }
        debug!(
            "tick {}: order parameter {:.4}",
            self.tick,
            self.order_parameter()
        );
        Ok(())
    }

    /// Neighbor map of the current state, as the next tick will see it.
    pub fn neighbors(&self) -> Result<NeighborMap> {
        let m = self.params.grid_size()?;
        find_neighbors(
            &self.particles,
            self.params.side_length,
            m,
            self.params.cutoff,
            true,
        )
    }

    /// Polarization `|Σ (cos θ, sin θ)| / N` of the current state.
    pub fn order_parameter(&self) -> f64 {
        order_parameter(&self.particles)
    }

    /// Mean number of neighbors per particle in the current state.
    pub fn mean_neighbor_count(&self) -> Result<f64> {
        Ok(self.neighbors()?.mean_degree())
    }

    fn check_geometry(&mut self) -> Result<()> {
        let m = self.params.grid_size()?;
        match check_geometry(
            self.params.side_length,
            m,
            self.params.cutoff,
            &self.particles,
        ) {
            Ok(()) => Ok(()),
            Err(e) if self.params.strict_geometry => Err(e),
            Err(e) => {
                if !self.geometry_warned {
                    warn!("{e}; neighbor sets may be incomplete");
                    self.geometry_warned = true;
                }
                Ok(())
            }
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => SeedableRng::seed_from_u64(s),
        None => SeedableRng::seed_from_u64(rng().random()),
    }
}

fn overlaps_existing(existing: &[Particle], candidate: &Particle, l: f64) -> bool {
    existing
        .iter()
        .any(|p| min_image_distance(p, candidate, l) < 0.0)
}
