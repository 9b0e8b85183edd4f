use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

/// Unordered pair of particle ids, stored with the smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair(u32, u32);

impl Pair {
    /// Returns `None` for a particle paired with itself.
    #[inline]
    pub fn new(a: u32, b: u32) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self(a, b)),
            std::cmp::Ordering::Greater => Some(Self(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    #[inline]
    pub fn ids(&self) -> (u32, u32) {
        (self.0, self.1)
    }
}

/// Neighbor relation of one particle set: every particle id maps to the ids it neighbors.
///
/// Built from an undirected pair list, so the relation is symmetric and never contains
/// self-references. Ordered containers keep iteration deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborMap {
    entries: BTreeMap<u32, BTreeSet<u32>>,
}

impl NeighborMap {
    /// Derive the per-particle view from the particle ids and the detected pairs.
    ///
    /// Every id gets an entry, even when it has no neighbors. Repeated pairs are harmless.
    pub fn from_pairs<I, P>(ids: I, pairs: P) -> Self
    where
        I: IntoIterator<Item = u32>,
        P: IntoIterator<Item = Pair>,
    {
        let mut entries: BTreeMap<u32, BTreeSet<u32>> =
            ids.into_iter().map(|id| (id, BTreeSet::new())).collect();
        for Pair(a, b) in pairs {
            entries.entry(a).or_default().insert(b);
            entries.entry(b).or_default().insert(a);
        }
        Self { entries }
    }

    /// Neighbor ids of particle `id`, or `None` if `id` was not part of the input.
    #[inline]
    pub fn neighbors(&self, id: u32) -> Option<&BTreeSet<u32>> {
        self.entries.get(&id)
    }

    /// Whether `a` and `b` were found to be neighbors.
    pub fn are_neighbors(&self, a: u32, b: u32) -> bool {
        self.entries.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Number of particles in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct unordered neighbor pairs.
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Distinct unordered pairs, in ascending order.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.entries.iter().flat_map(|(&a, set)| {
            set.range(a..)
                .filter_map(move |&b| Pair::new(a, b))
        })
    }

    /// Iterate over `(id, neighbor ids)` in ascending id order.
    pub fn iter(&self) -> btree_map::Iter<'_, u32, BTreeSet<u32>> {
        self.entries.iter()
    }

    /// Mean neighbor count per particle (0 for an empty map).
    pub fn mean_degree(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        2.0 * self.pair_count() as f64 / self.entries.len() as f64
    }

    /// Checks `b ∈ N(a) ⇔ a ∈ N(b)` and `a ∉ N(a)` for every entry.
    pub fn is_symmetric(&self) -> bool {
        self.entries.iter().all(|(a, set)| {
            !set.contains(a) && set.iter().all(|b| self.are_neighbors(*b, *a))
        })
    }
}

impl<'a> IntoIterator for &'a NeighborMap {
    type Item = (&'a u32, &'a BTreeSet<u32>);
    type IntoIter = btree_map::Iter<'a, u32, BTreeSet<u32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_unordered_and_rejects_self() {
        assert_eq!(Pair::new(3, 1), Pair::new(1, 3));
        assert_eq!(Pair::new(3, 1).map(|p| p.ids()), Some((1, 3)));
        assert!(Pair::new(2, 2).is_none());
    }

    #[test]
    fn from_pairs_is_symmetric_with_empty_entries() {
        let pairs = [Pair::new(0, 1), Pair::new(1, 2), Pair::new(2, 1)]
            .into_iter()
            .flatten();
        let map = NeighborMap::from_pairs(0..4, pairs);
        assert_eq!(map.len(), 4);
        assert!(map.is_symmetric());
        assert!(map.are_neighbors(1, 0));
        assert!(map.are_neighbors(2, 1));
        assert!(!map.are_neighbors(0, 2));
        assert_eq!(map.neighbors(3).map(BTreeSet::len), Some(0));
        assert!(map.neighbors(99).is_none());
        assert_eq!(map.pair_count(), 2);
        assert!((map.mean_degree() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pairs_lists_each_relation_once() {
        let pairs = [Pair::new(4, 1), Pair::new(1, 2), Pair::new(4, 2)]
            .into_iter()
            .flatten();
        let map = NeighborMap::from_pairs([1, 2, 4], pairs);
        let listed: Vec<_> = map.pairs().map(|p| p.ids()).collect();
        assert_eq!(listed, vec![(1, 2), (1, 4), (2, 4)]);
    }

    #[test]
    fn empty_map() {
        let map = NeighborMap::from_pairs(std::iter::empty(), std::iter::empty());
        assert!(map.is_empty());
        assert_eq!(map.mean_degree(), 0.0);
        assert!(map.is_symmetric());
    }
}
