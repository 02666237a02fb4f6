/*
 * sequence.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * First-appearance order analysis of citation sequences.
 */

use std::collections::HashSet;

/// First-appearance order of a citation sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceAnalysis {
    /// Each cited number once, in the order it is first cited.
    pub unique_sequence: Vec<u64>,
    /// Whether `unique_sequence` is strictly ascending.
    pub ordered: bool,
    /// The first adjacent pair of `unique_sequence` that descends.
    pub first_violation: Option<(u64, u64)>,
}

impl SequenceAnalysis {
    pub fn analyze(sequence: &[u64]) -> Self {
        let unique_sequence = first_appearance_order(sequence);
        let first_violation = unique_sequence
            .windows(2)
            .find(|pair| pair[0] > pair[1])
            .map(|pair| (pair[0], pair[1]));
        Self {
            ordered: first_violation.is_none(),
            unique_sequence,
            first_violation,
        }
    }
}

/// Keep the first occurrence of each number, preserving order.
pub fn first_appearance_order(sequence: &[u64]) -> Vec<u64> {
    let mut seen = HashSet::with_capacity(sequence.len());
    sequence
        .iter()
        .copied()
        .filter(|number| seen.insert(*number))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeats_do_not_break_order() {
        let analysis = SequenceAnalysis::analyze(&[1, 2, 1, 3, 2, 4]);
        assert_eq!(analysis.unique_sequence, vec![1, 2, 3, 4]);
        assert!(analysis.ordered);
        assert_eq!(analysis.first_violation, None);
    }

    #[test]
    fn test_out_of_order() {
        let analysis = SequenceAnalysis::analyze(&[1, 3, 2]);
        assert_eq!(analysis.unique_sequence, vec![1, 3, 2]);
        assert!(!analysis.ordered);
        assert_eq!(analysis.first_violation, Some((3, 2)));
    }

    #[test]
    fn test_gaps_are_ordered() {
        assert!(SequenceAnalysis::analyze(&[1, 5, 9]).ordered);
    }

    #[test]
    fn test_trivially_ordered() {
        assert!(SequenceAnalysis::analyze(&[]).ordered);
        assert!(SequenceAnalysis::analyze(&[7]).ordered);
        assert!(SequenceAnalysis::analyze(&[7, 7, 7]).ordered);
    }

    #[test]
    fn test_range_before_standalone_number() {
        // "[2, 5-7]" extracts as 5, 6, 7, 2.
        let analysis = SequenceAnalysis::analyze(&[5, 6, 7, 2]);
        assert!(!analysis.ordered);
        assert_eq!(analysis.first_violation, Some((7, 2)));
    }
}
