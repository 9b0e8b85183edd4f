//! Property-based checks of the neighbor finders and the flocking tick using proptest.
//!
//! Invariants exercised over random particle sets:
//! - Symmetric neighbor relation without self-references
//! - Grid search equals brute force when the cell-size condition holds
//! - A tick neither creates nor drops particle ids, and keeps positions in the domain
//! - Feeding a tick's output back in keeps working for many ticks

use flocksim::core::{find_neighbors, find_neighbors_naive, step, validate_geometry, Particle};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::BTreeSet;

const L: f64 = 20.0;
const RC: f64 = 1.0;
const MAX_RADIUS: f64 = 0.2;
// k = 20/14 > RC + 2 * MAX_RADIUS
const M: usize = 14;

fn particle_set() -> impl Strategy<Value = Vec<Particle>> {
    prop::collection::vec((0.0..L, 0.0..L, 0.0..MAX_RADIUS, -3.0..3.0f64), 0..80).prop_map(
        |raw| {
            raw.into_iter()
                .enumerate()
                .filter_map(|(i, (x, y, r, theta))| {
                    Particle::new(i as u32, [x, y], r, theta, 0.3).ok()
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn neighbor_relation_is_symmetric(ps in particle_set(), periodic in any::<bool>()) {
        let map = find_neighbors(&ps, L, M, RC, periodic).unwrap();
        prop_assert_eq!(map.len(), ps.len());
        for (id, set) in &map {
            prop_assert!(!set.contains(id));
            for other in set {
                prop_assert!(map.are_neighbors(*other, *id));
            }
        }
    }

    #[test]
    fn grid_equals_brute_force(ps in particle_set(), periodic in any::<bool>()) {
        prop_assume!(validate_geometry(L, M, RC, &ps));
        let grid = find_neighbors(&ps, L, M, RC, periodic).unwrap();
        let naive = find_neighbors_naive(&ps, L, RC, periodic);
        prop_assert_eq!(grid, naive);
    }

    #[test]
    fn tick_preserves_identity(ps in particle_set(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let next = step(&ps, L, RC, 0.5, &mut rng).unwrap();
        let before: BTreeSet<u32> = ps.iter().map(|p| p.id).collect();
        let after: BTreeSet<u32> = next.iter().map(|p| p.id).collect();
        prop_assert_eq!(next.len(), ps.len());
        prop_assert_eq!(before, after);
        for p in &next {
            prop_assert!((0.0..L).contains(&p.x()));
            prop_assert!((0.0..L).contains(&p.y()));
        }
    }

    #[test]
    fn ticks_chain_without_leaving_domain(ps in particle_set(), seed in any::<u64>(), ticks in 1usize..20) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut current = ps;
        for _ in 0..ticks {
            current = step(&current, L, RC, 0.5, &mut rng).unwrap();
            for p in &current {
                prop_assert!((0.0..L).contains(&p.x()));
                prop_assert!((0.0..L).contains(&p.y()));
            }
        }
    }
}
