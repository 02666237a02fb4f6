/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Renumbering: map construction and in-place rewriting.
 */

//! Renumbering of citations and bibliography labels.
//!
//! [`RenumberPlanner`] turns the first-appearance citation order and the set
//! of defined references into a [`RenumberMap`]. [`RenumberApplier`] then
//! rewrites the document through the map. Bibliography entries stay in their
//! physical order; only their displayed numbers change.

mod apply;
mod render;

pub use apply::{ApplyStats, RenumberApplier};
pub use render::{compact_numbers, render_segment, rewrite_citation_text, rewrite_first_number};

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

/// A bijection from old labels to new labels, numbered from 1.
///
/// Numbers outside the map pass through [`get`](Self::get) unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenumberMap {
    map: BTreeMap<u64, u64>,
}

impl RenumberMap {
    /// Number `order` from 1, ignoring repeats.
    pub fn from_order(order: impl IntoIterator<Item = u64>) -> Self {
        let mut map = BTreeMap::new();
        let mut next = 1;
        for old in order {
            if let Entry::Vacant(slot) = map.entry(old) {
                slot.insert(next);
                next += 1;
            }
        }
        Self { map }
    }

    pub fn get(&self, old: u64) -> u64 {
        self.map.get(&old).copied().unwrap_or(old)
    }

    pub fn contains(&self, old: u64) -> bool {
        self.map.contains_key(&old)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Whether every number maps to itself.
    pub fn is_identity(&self) -> bool {
        self.map.iter().all(|(old, new)| old == new)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.map.iter().map(|(&old, &new)| (old, new))
    }

    pub fn as_map(&self) -> &BTreeMap<u64, u64> {
        &self.map
    }
}

impl FromIterator<(u64, u64)> for RenumberMap {
    fn from_iter<I: IntoIterator<Item = (u64, u64)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// Computes the renumbering that restores first-appearance order.
pub struct RenumberPlanner;

impl RenumberPlanner {
    /// Cited numbers in first-appearance order take `1..`; defined but
    /// uncited references follow in ascending original order.
    pub fn plan(unique_sequence: &[u64], reference_numbers: &BTreeSet<u64>) -> RenumberMap {
        let cited: HashSet<u64> = unique_sequence.iter().copied().collect();
        let uncited = reference_numbers
            .iter()
            .copied()
            .filter(|number| !cited.contains(number));
        let map = RenumberMap::from_order(unique_sequence.iter().copied().chain(uncited));
        tracing::debug!(
            cited = cited.len(),
            mapped = map.len(),
            "Planned renumbering"
        );
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_follows_first_appearance() {
        let map = RenumberPlanner::plan(&[3, 1, 2], &BTreeSet::from([1, 2, 3]));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(1, 2), (2, 3), (3, 1)]);
    }

    #[test]
    fn test_uncited_references_continue_in_ascending_order() {
        let map = RenumberPlanner::plan(&[5, 2], &BTreeSet::from([1, 2, 4, 5, 7]));
        assert_eq!(map.get(5), 1);
        assert_eq!(map.get(2), 2);
        assert_eq!(map.get(1), 3);
        assert_eq!(map.get(4), 4);
        assert_eq!(map.get(7), 5);
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_plan_covers_missing_references() {
        // 9 is cited but undefined; it still gets a slot.
        let map = RenumberPlanner::plan(&[9, 1], &BTreeSet::from([1]));
        assert_eq!(map.get(9), 1);
        assert_eq!(map.get(1), 2);
    }

    #[test]
    fn test_plan_is_a_bijection_onto_one_to_n() {
        let map = RenumberPlanner::plan(&[8, 3, 6, 1], &BTreeSet::from([1, 2, 3, 4, 6, 8, 10]));
        let mut values: Vec<u64> = map.iter().map(|(_, new)| new).collect();
        values.sort_unstable();
        assert_eq!(values, (1..=map.len() as u64).collect::<Vec<_>>());
    }

    #[test]
    fn test_unmapped_numbers_pass_through() {
        let map = RenumberMap::from_order([4, 4, 2]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(4), 1);
        assert_eq!(map.get(2), 2);
        assert_eq!(map.get(99), 99);
        assert!(!map.contains(99));
        assert!(!map.is_identity());
        assert!(RenumberMap::from_order([1, 2]).is_identity());
    }

    #[test]
    fn test_serializes_as_object() {
        let map = RenumberMap::from_order([3, 1]);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"1":2,"3":1}"#
        );
    }
}
