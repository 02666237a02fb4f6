/*
 * collect.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Collection of reference numbers and citation occurrences.
 */

//! Collectors for both sides of the reconciliation.
//!
//! - [`ReferenceNumberCollector`] reads the ordinal of every bibliography
//!   entry. A missing bibliography style only degrades collection.
//! - [`CitationCollector`] reads every citation marker in document order. A
//!   missing citation style is fatal: without it there is nothing to check.

use std::collections::BTreeSet;

use crate::config::StyleNames;
use crate::document::{Scope, StyleHandle, StyledDocument};
use crate::error::Result;
use crate::extract::{NumberExtractor, NumberToken, first_number};

/// The first integer anywhere in `text`.
fn first_integer(text: &str) -> Option<u64> {
    first_number(text).map(|(_, n)| n)
}

/// Resolve a style whose absence is tolerated.
pub(crate) fn resolve_optional<D: StyledDocument + ?Sized>(
    doc: &D,
    name: &str,
) -> Option<StyleHandle> {
    match doc.resolve_style(name) {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::debug!(style = name, error = %err, "Optional style unavailable");
            None
        }
    }
}

/// One bibliography number and the paragraph it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub number: u64,
    pub paragraph: usize,
}

/// Result of [`ReferenceNumberCollector::collect`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceCollection {
    /// Entries in document order. Duplicate numbers are kept here.
    pub entries: Vec<ReferenceEntry>,
    /// Non-fatal degradations encountered while collecting.
    pub warnings: Vec<String>,
}

impl ReferenceCollection {
    /// The distinct reference numbers.
    pub fn numbers(&self) -> BTreeSet<u64> {
        self.entries.iter().map(|entry| entry.number).collect()
    }
}

/// Reads the defined reference numbers from the bibliography.
///
/// For each bibliography-entry paragraph the number is read from the nested
/// label style, falling back to the first integer of the paragraph text.
/// Without a bibliography-entry style, every label-styled range in the
/// document is read instead.
pub struct ReferenceNumberCollector<'a> {
    styles: &'a StyleNames,
}

impl<'a> ReferenceNumberCollector<'a> {
    pub fn new(styles: &'a StyleNames) -> Self {
        Self { styles }
    }

    pub fn collect<D: StyledDocument + ?Sized>(&self, doc: &D) -> Result<ReferenceCollection> {
        let entry_style = resolve_optional(doc, &self.styles.bibliography_entry);
        let label_style = resolve_optional(doc, &self.styles.bibliography_label);
        let mut collection = ReferenceCollection::default();

        match (entry_style, label_style) {
            (Some(entry), label) => {
                if label.is_none() {
                    collection.warn(format!(
                        "Bibliography label style '{}' not found; reading the first number of each entry",
                        self.styles.bibliography_label
                    ));
                }
                for paragraph in doc.paragraphs() {
                    if !entry.matches_paragraph(&paragraph) {
                        continue;
                    }
                    let labelled = match &label {
                        Some(label) => doc
                            .find_by_style(label, Scope::Paragraph(paragraph.index))?
                            .next()
                            .and_then(|range| first_integer(&range.text)),
                        None => None,
                    };
                    match labelled.or_else(|| first_integer(&paragraph.text)) {
                        Some(number) => collection.entries.push(ReferenceEntry {
                            number,
                            paragraph: paragraph.index,
                        }),
                        None => tracing::debug!(
                            paragraph = paragraph.index,
                            "Bibliography entry has no number"
                        ),
                    }
                }
            }
            (None, Some(label)) => {
                collection.warn(format!(
                    "Bibliography entry style '{}' not found; reading '{}' labels anywhere in the document",
                    self.styles.bibliography_entry, self.styles.bibliography_label
                ));
                for range in doc.find_by_style(&label, Scope::Document)? {
                    if let Some(number) = first_integer(range.text.trim()) {
                        collection.entries.push(ReferenceEntry {
                            number,
                            paragraph: range.paragraph,
                        });
                    }
                }
            }
            (None, None) => {
                collection.warn(format!(
                    "Neither '{}' nor '{}' style found; no references collected",
                    self.styles.bibliography_entry, self.styles.bibliography_label
                ));
            }
        }

        tracing::debug!(
            entries = collection.entries.len(),
            distinct = collection.numbers().len(),
            "Collected reference numbers"
        );
        Ok(collection)
    }
}

impl ReferenceCollection {
    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }
}

/// The numbers parsed from one citation marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationOccurrence {
    /// Discovery index, increasing in document order.
    pub position: usize,
    /// Marker text with surrounding whitespace stripped.
    pub text: String,
    /// Document span of the marker.
    pub start: usize,
    pub end: usize,
    /// Parsed numbers; spans are relative to `text`.
    pub tokens: Vec<NumberToken>,
}

impl CitationOccurrence {
    pub fn numbers(&self) -> impl Iterator<Item = u64> + '_ {
        self.tokens.iter().map(|token| token.value)
    }
}

/// Result of [`CitationCollector::collect`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationCollection {
    pub occurrences: Vec<CitationOccurrence>,
}

impl CitationCollection {
    /// Every cited number, duplicates included, in document order.
    pub fn citation_sequence(&self) -> Vec<u64> {
        self.occurrences
            .iter()
            .flat_map(CitationOccurrence::numbers)
            .collect()
    }

    pub fn cited_numbers(&self) -> BTreeSet<u64> {
        self.occurrences
            .iter()
            .flat_map(CitationOccurrence::numbers)
            .collect()
    }
}

/// Reads every citation marker in document order.
pub struct CitationCollector<'a> {
    styles: &'a StyleNames,
    extractor: NumberExtractor,
}

impl<'a> CitationCollector<'a> {
    pub fn new(styles: &'a StyleNames, extractor: NumberExtractor) -> Self {
        Self { styles, extractor }
    }

    /// # Errors
    ///
    /// Fails with [`RefcheckError::StyleNotFound`](crate::RefcheckError::StyleNotFound)
    /// if the document does not define the citation style.
    pub fn collect<D: StyledDocument + ?Sized>(&self, doc: &D) -> Result<CitationCollection> {
        let style = doc.resolve_style(&self.styles.citation)?;

        // The style may be applied to whole paragraphs or to runs, so union
        // a paragraph scan with a content scan.
        let mut spans: Vec<(usize, usize, String)> = doc
            .paragraphs()
            .into_iter()
            .filter(|paragraph| style.matches_paragraph(paragraph))
            .map(|paragraph| (paragraph.start, paragraph.end, paragraph.text))
            .collect();
        spans.extend(
            doc.find_by_style(&style, Scope::Document)?
                .map(|range| (range.start, range.end, range.text)),
        );
        spans.sort_by_key(|&(start, end, _)| (start, end));
        spans.dedup_by_key(|(start, end, _)| (*start, *end));

        let mut collection = CitationCollection::default();
        for (start, end, raw) in spans {
            let text = raw.trim();
            if text.is_empty() {
                continue;
            }
            let tokens = self.extractor.tokens(text);
            if tokens.is_empty() {
                tracing::debug!(text, start, "Citation marker has no numbers; skipping");
                continue;
            }
            collection.occurrences.push(CitationOccurrence {
                position: collection.occurrences.len(),
                text: text.to_string(),
                start,
                end,
                tokens,
            });
        }

        tracing::debug!(
            occurrences = collection.occurrences.len(),
            "Collected citations"
        );
        Ok(collection)
    }
}
