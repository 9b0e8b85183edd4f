//! Off-lattice flocking automaton: one synchronous tick.
//!
//! Every particle moves one `speed` along its current heading and takes the circular mean
//! heading of itself and its neighbors, plus uniform noise. Both updates read the state at
//! the start of the tick only.

use crate::core::cell_index::find_neighbors;
use crate::core::geometry::wrap_coordinate;
use crate::core::neighbors::NeighborMap;
use crate::core::particle::Particle;
use crate::error::{Error, Result};
use log::debug;
use rand::Rng;
use rayon::prelude::*;
use std::collections::HashMap;

/// Grid resolution used by the automaton: `M = floor(L / rc)`.
///
/// Errors:
/// - `Error::InvalidGridGeometry` if `l` is not positive, `rc` is not positive (the
///   resolution would be unbounded) or `rc > l` (no cell fits).
pub fn grid_size(l: f64, rc: f64) -> Result<usize> {
    if !l.is_finite() || l <= 0.0 {
        return Err(Error::InvalidGridGeometry(format!(
            "side length L must be finite and > 0, got {l}"
        )));
    }
    if !rc.is_finite() || rc <= 0.0 {
        return Err(Error::InvalidGridGeometry(format!(
            "cutoff rc must be finite and > 0 to derive the grid size, got {rc}"
        )));
    }
    let m = (l / rc).floor();
    if m < 1.0 {
        return Err(Error::InvalidGridGeometry(format!(
            "cutoff rc = {rc} exceeds side length L = {l}"
        )));
    }
    Ok(m as usize)
}

/// Circular mean `atan2(mean sin, mean cos)` of a set of angles, in `(-π, π]`.
///
/// Returns `None` for an empty input.
pub fn circular_mean<I>(angles: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut n = 0usize;
    let (mut sin_sum, mut cos_sum) = (0.0_f64, 0.0_f64);
    for theta in angles {
        let (s, c) = theta.sin_cos();
        sin_sum += s;
        cos_sum += c;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    let n = n as f64;
    Some((sin_sum / n).atan2(cos_sum / n))
}

/// Polarization of the flock: `|Σ (cos θ, sin θ)| / N`, in `[0, 1]`.
///
/// 1 means every particle shares a heading; 0 for an empty set.
pub fn order_parameter(particles: &[Particle]) -> f64 {
    if particles.is_empty() {
        return 0.0;
    }
    let (sx, sy) = particles.iter().fold((0.0_f64, 0.0_f64), |(sx, sy), p| {
        let [c, s] = p.heading();
        (sx + c, sy + s)
    });
    sx.hypot(sy) / particles.len() as f64
}

/// Draw one noise sample per particle from `[-disturbance/2, disturbance/2)`.
///
/// Drawn serially so a seeded RNG gives the same sequence regardless of thread count.
pub fn draw_noise<R: Rng>(n: usize, disturbance: f64, rng: &mut R) -> Result<Vec<f64>> {
    if !disturbance.is_finite() || disturbance < 0.0 {
        return Err(Error::InvalidParam(format!(
            "disturbance must be finite and >= 0, got {disturbance}"
        )));
    }
    if disturbance == 0.0 {
        return Ok(vec![0.0; n]);
    }
    let half = disturbance / 2.0;
    Ok((0..n).map(|_| rng.random_range(-half..half)).collect())
}

/// Apply one tick given the neighbor map of `particles` and one noise value per particle.
///
/// Every output particle is built from the input slice alone, so the update is synchronous.
/// The output keeps the input order.
///
/// Errors:
/// - `Error::InvalidParam` if `noise` has the wrong length, a particle has no map entry,
///   or the map names a neighbor that is not in `particles`.
pub fn apply_tick(
    particles: &[Particle],
    neighbors: &NeighborMap,
    l: f64,
    noise: &[f64],
) -> Result<Vec<Particle>> {
    if noise.len() != particles.len() {
        return Err(Error::InvalidParam(format!(
            "expected {} noise samples, got {}",
            particles.len(),
            noise.len()
        )));
    }
    let orientation_of: HashMap<u32, f64> =
        particles.iter().map(|p| (p.id, p.orientation)).collect();

    particles
        .par_iter()
        .zip(noise.par_iter())
        .map(|(p, &eta)| -> Result<Particle> {
            let ids = neighbors.neighbors(p.id).ok_or_else(|| {
                Error::InvalidParam(format!("particle {} missing from neighbor map", p.id))
            })?;
            let mut headings = Vec::with_capacity(ids.len() + 1);
            for id in ids {
                let theta = orientation_of.get(id).copied().ok_or_else(|| {
                    Error::InvalidParam(format!(
                        "neighbor {id} of particle {} is not in the particle set",
                        p.id
                    ))
                })?;
                headings.push(theta);
            }
            headings.push(p.orientation);
            let mean = circular_mean(headings).unwrap_or(p.orientation);

            let [c, s] = p.heading();
            let x = wrap_coordinate(p.x() + c * p.speed, l)?;
            let y = wrap_coordinate(p.y() + s * p.speed, l)?;
            Ok(p.advanced([x, y], mean + eta))
        })
        .collect()
}

/// One synchronous tick of the automaton on a periodic domain of side `l`.
///
/// Neighbors are found with the Cell Index Method at `M = floor(l / rc)` before anything
/// moves; any error aborts the tick and nothing is returned.
pub fn step<R: Rng>(
    particles: &[Particle],
    l: f64,
    rc: f64,
    disturbance: f64,
    rng: &mut R,
) -> Result<Vec<Particle>> {
    let m = grid_size(l, rc)?;
    let neighbors = find_neighbors(particles, l, m, rc, true)?;
    let noise = draw_noise(particles.len(), disturbance, rng)?;
    debug!(
        "flocking tick: {} particles, M = {m}, {} neighbor pairs",
        particles.len(),
        neighbors.pair_count()
    );
    apply_tick(particles, &neighbors, l, &noise)
}
