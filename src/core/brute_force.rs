//! All-pairs reference neighbor finder, used to cross-check the Cell Index Method.

use crate::core::geometry::{distance, periodic_distance, within_cutoff};
use crate::core::neighbors::{NeighborMap, Pair};
use crate::core::particle::{Particle, DIM};
use log::trace;

/// Gap between `a` and the nearest periodic image of `b` in a domain of side `l`.
///
/// Considers the real position and its translations by `{-l, 0, l}` on both axes,
/// corners included.
pub fn min_image_distance(a: &Particle, b: &Particle, l: f64) -> f64 {
    let shifts = [-l, 0.0, l];
    let mut best = f64::INFINITY;
    for dx in shifts {
        for dy in shifts {
            let offset: [f64; DIM] = [dx, dy];
            best = best.min(periodic_distance(a, b, offset));
        }
    }
    best
}

/// Test every unordered pair of particles. O(N²).
///
/// Uses the same inclusive predicate as [`crate::core::cell_index::find_neighbors`]. With
/// `periodic` set, the distance is the minimum over periodic images, so the result matches
/// the grid search whenever the grid's geometry precondition holds. Particle ids are assumed
/// unique; `l` is only read for periodic runs.
pub fn find_neighbors_naive(particles: &[Particle], l: f64, rc: f64, periodic: bool) -> NeighborMap {
    let mut pairs = Vec::new();
    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            let gap = if periodic {
                min_image_distance(a, b, l)
            } else {
                distance(a, b)
            };
            if within_cutoff(gap, rc) {
                pairs.extend(Pair::new(a.id, b.id));
            }
        }
    }
    trace!(
        "brute force: {} particles, {} pairs within {rc}",
        particles.len(),
        pairs.len()
    );
    NeighborMap::from_pairs(particles.iter().map(|p| p.id), pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(id: u32, x: f64, y: f64, r: f64) -> Particle {
        Particle::at(id, x, y, r).unwrap()
    }

    #[test]
    fn min_image_wraps_each_axis_and_corner() {
        let l = 10.0;
        let a = disk(0, 0.5, 5.0, 0.0);
        let b = disk(1, 9.5, 5.0, 0.0);
        assert!((min_image_distance(&a, &b, l) - 1.0).abs() < 1e-12);

        let c = disk(2, 5.0, 9.5, 0.0);
        let d = disk(3, 5.0, 0.5, 0.0);
        assert!((min_image_distance(&c, &d, l) - 1.0).abs() < 1e-12);

        let e = disk(4, 0.5, 0.5, 0.0);
        let f = disk(5, 9.5, 9.5, 0.0);
        assert!((min_image_distance(&e, &f, l) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn periodicity_only_adds_pairs() {
        let ps = vec![
            disk(0, 0.5, 5.0, 0.0),
            disk(1, 9.5, 5.0, 0.0),
            disk(2, 5.0, 5.0, 0.0),
        ];
        let open = find_neighbors_naive(&ps, 10.0, 1.0, false);
        assert_eq!(open.pair_count(), 0);
        let wrapped = find_neighbors_naive(&ps, 10.0, 1.0, true);
        assert!(wrapped.are_neighbors(0, 1));
        assert!(!wrapped.are_neighbors(0, 2));
        assert!(wrapped.is_symmetric());
    }

    #[test]
    fn radii_are_subtracted() {
        let ps = vec![disk(0, 1.0, 1.0, 0.5), disk(1, 4.0, 1.0, 1.0)];
        // center distance 3, gap 1.5
        assert!(find_neighbors_naive(&ps, 10.0, 1.5, false).are_neighbors(0, 1));
        assert!(!find_neighbors_naive(&ps, 10.0, 1.4, false).are_neighbors(0, 1));
    }

    #[test]
    fn empty_and_single() {
        assert!(find_neighbors_naive(&[], 10.0, 1.0, true).is_empty());
        let one = find_neighbors_naive(&[disk(7, 1.0, 1.0, 0.0)], 10.0, 1.0, true);
        assert_eq!(one.len(), 1);
        assert_eq!(one.neighbors(7).map(|s| s.len()), Some(0));
    }
}
