/*
 * report.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Reconciliation of citations against the bibliography.
 */

use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Serialize;

use crate::collect::{CitationCollection, ReferenceCollection};
use crate::renumber::compact_numbers;
use crate::sequence::SequenceAnalysis;

pub const IN_SEQUENCE_MESSAGE: &str = "Citations are in proper sequence.";
pub const OUT_OF_SEQUENCE_MESSAGE: &str = "Citations are NOT in sequence.";

/// Totals, set differences and the ordering verdict for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Number of distinct reference numbers defined.
    pub total_references: usize,
    /// Number of citation markers that yielded at least one number.
    pub total_citations: usize,
    /// Cited but never defined.
    pub missing_references: BTreeSet<u64>,
    /// Defined but never cited.
    pub unused_references: BTreeSet<u64>,
    /// Every cited number in document order, duplicates included.
    pub citation_sequence: Vec<u64>,
    pub sequence_ordered: bool,
    pub sequence_message: String,
    /// Empty when ordered; otherwise one entry holding the full sequence.
    pub sequence_issues: Vec<Vec<u64>>,
    pub warnings: Vec<String>,
}

impl ReconciliationReport {
    pub fn build(references: &ReferenceCollection, citations: &CitationCollection) -> Self {
        let reference_numbers = references.numbers();
        let cited_numbers = citations.cited_numbers();
        let citation_sequence = citations.citation_sequence();
        let analysis = SequenceAnalysis::analyze(&citation_sequence);

        let (sequence_message, sequence_issues) = if analysis.ordered {
            (IN_SEQUENCE_MESSAGE, Vec::new())
        } else {
            (OUT_OF_SEQUENCE_MESSAGE, vec![citation_sequence.clone()])
        };

        Self {
            total_references: reference_numbers.len(),
            total_citations: citations.occurrences.len(),
            missing_references: cited_numbers
                .difference(&reference_numbers)
                .copied()
                .collect(),
            unused_references: reference_numbers
                .difference(&cited_numbers)
                .copied()
                .collect(),
            citation_sequence,
            sequence_ordered: analysis.ordered,
            sequence_message: sequence_message.to_string(),
            sequence_issues,
            warnings: references.warnings.clone(),
        }
    }

    /// Every reference defined and cited, and citations in order.
    pub fn is_clean(&self) -> bool {
        self.missing_references.is_empty()
            && self.unused_references.is_empty()
            && self.sequence_ordered
    }

    pub fn cited_numbers(&self) -> BTreeSet<u64> {
        self.citation_sequence.iter().copied().collect()
    }

    /// The defined reference numbers, recovered from the cited set and the
    /// two differences.
    pub fn reference_numbers(&self) -> BTreeSet<u64> {
        let mut numbers: BTreeSet<u64> = self
            .cited_numbers()
            .difference(&self.missing_references)
            .copied()
            .collect();
        numbers.extend(&self.unused_references);
        numbers
    }

    pub fn analysis(&self) -> SequenceAnalysis {
        SequenceAnalysis::analyze(&self.citation_sequence)
    }

    /// Human-readable multi-line summary.
    pub fn summary(&self) -> String {
        let analysis = self.analysis();
        let mut out = String::new();
        let _ = writeln!(out, "References defined: {}", self.total_references);
        let _ = writeln!(out, "Citation markers: {}", self.total_citations);
        let _ = writeln!(
            out,
            "Missing references: {}",
            or_none(&compact_numbers(self.missing_references.iter().copied()))
        );
        let _ = writeln!(
            out,
            "Unused references: {}",
            or_none(&compact_numbers(self.unused_references.iter().copied()))
        );
        let order: Vec<String> = analysis
            .unique_sequence
            .iter()
            .map(u64::to_string)
            .collect();
        let _ = writeln!(out, "First citation order: {}", or_none(&order.join(", ")));
        let _ = write!(out, "{}", self.sequence_message);
        if let Some((before, after)) = analysis.first_violation {
            let _ = write!(out, " ({} is cited before {})", before, after);
        }
        for warning in &self.warnings {
            let _ = write!(out, "\nwarning: {}", warning);
        }
        out
    }
}

fn or_none(text: &str) -> &str {
    if text.is_empty() { "none" } else { text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::{CitationOccurrence, ReferenceEntry};
    use crate::extract::NumberExtractor;
    use pretty_assertions::assert_eq;

    fn references(numbers: &[u64]) -> ReferenceCollection {
        ReferenceCollection {
            entries: numbers
                .iter()
                .enumerate()
                .map(|(paragraph, &number)| ReferenceEntry { number, paragraph })
                .collect(),
            warnings: Vec::new(),
        }
    }

    fn citations(texts: &[&str]) -> CitationCollection {
        let extractor = NumberExtractor::new();
        CitationCollection {
            occurrences: texts
                .iter()
                .enumerate()
                .map(|(position, text)| CitationOccurrence {
                    position,
                    text: text.to_string(),
                    start: position * 10,
                    end: position * 10 + text.len(),
                    tokens: extractor.tokens(text),
                })
                .collect(),
        }
    }

    #[test]
    fn test_set_differences() {
        let report = ReconciliationReport::build(
            &references(&[1, 2, 3, 3, 6]),
            &citations(&["[1]", "[2, 4]", "[1]"]),
        );
        assert_eq!(report.total_references, 4);
        assert_eq!(report.total_citations, 3);
        assert_eq!(report.missing_references, BTreeSet::from([4]));
        assert_eq!(report.unused_references, BTreeSet::from([3, 6]));
        assert_eq!(report.citation_sequence, vec![1, 2, 4, 1]);
        assert!(report.sequence_ordered);
        assert_eq!(report.sequence_message, IN_SEQUENCE_MESSAGE);
        assert!(report.sequence_issues.is_empty());
        assert!(!report.is_clean());
        assert_eq!(report.reference_numbers(), BTreeSet::from([1, 2, 3, 6]));
    }

    #[test]
    fn test_disorder_is_reported_with_full_sequence() {
        let report =
            ReconciliationReport::build(&references(&[1, 2, 3]), &citations(&["[3]", "[1]", "[2]"]));
        assert!(!report.sequence_ordered);
        assert_eq!(report.sequence_message, OUT_OF_SEQUENCE_MESSAGE);
        assert_eq!(report.sequence_issues, vec![vec![3, 1, 2]]);
        assert!(report.missing_references.is_empty());
        assert!(report.unused_references.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let report = ReconciliationReport::build(&references(&[]), &citations(&[]));
        assert!(report.sequence_ordered);
        assert!(report.is_clean());
        assert_eq!(report.total_citations, 0);
    }

    #[test]
    fn test_summary() {
        let mut refs = references(&[1, 2, 3, 5, 6, 7]);
        refs.warnings
            .push("Bibliography label style 'bib_number' not found".to_string());
        let report = ReconciliationReport::build(&refs, &citations(&["[3]", "[1, 2]", "[9]"]));
        insta::assert_snapshot!(report.summary(), @r"
        References defined: 6
        Citation markers: 3
        Missing references: 9
        Unused references: 5-7
        First citation order: 3, 1, 2, 9
        Citations are NOT in sequence. (3 is cited before 1)
        warning: Bibliography label style 'bib_number' not found
        ");
    }

    #[test]
    fn test_serializes_sets_as_arrays() {
        let report = ReconciliationReport::build(&references(&[1, 2]), &citations(&["[2]"]));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unused_references"], serde_json::json!([1]));
        assert_eq!(json["citation_sequence"], serde_json::json!([2]));
        assert_eq!(json["sequence_ordered"], serde_json::json!(true));
    }
}
