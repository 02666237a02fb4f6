/*
 * apply.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * In-place rewriting of citations and bibliography labels.
 */

use serde::Serialize;

use super::RenumberMap;
use super::render::{rewrite_citation_text, rewrite_first_number};
use crate::collect::resolve_optional;
use crate::config::StyleNames;
use crate::document::{Scope, StyleHandle, StyledDocument};
use crate::error::Result;
use crate::extract::NumberExtractor;

/// How many ranges a [`RenumberApplier`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    pub citations: usize,
    pub labels: usize,
}

/// Rewrites a document's citations and bibliography labels through a
/// [`RenumberMap`].
pub struct RenumberApplier<'a> {
    styles: &'a StyleNames,
    extractor: NumberExtractor,
}

impl<'a> RenumberApplier<'a> {
    pub fn new(styles: &'a StyleNames, extractor: NumberExtractor) -> Self {
        Self { styles, extractor }
    }

    pub fn apply<D: StyledDocument + ?Sized>(
        &self,
        doc: &mut D,
        map: &RenumberMap,
    ) -> Result<ApplyStats> {
        let stats = ApplyStats {
            citations: self.rewrite_citations(doc, map)?,
            labels: self.rewrite_labels(doc, map)?,
        };
        tracing::info!(
            citations = stats.citations,
            labels = stats.labels,
            "Applied renumbering"
        );
        Ok(stats)
    }

    fn rewrite_citations<D: StyledDocument + ?Sized>(
        &self,
        doc: &mut D,
        map: &RenumberMap,
    ) -> Result<usize> {
        let style = doc.resolve_style(&self.styles.citation)?;
        let mut cursor = doc.find_by_style_mut(&style, Scope::Document)?;
        let mut changed = 0;
        while let Some(range) = cursor.find_next() {
            if range.text.trim().is_empty() {
                continue;
            }
            let rewritten = rewrite_citation_text(&range.text, map, &self.extractor);
            if rewritten != range.text {
                tracing::trace!(from = %range.text, to = %rewritten, "Rewriting citation");
                cursor.set_text(&rewritten)?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Mirrors the lookup order of the reference collector so every number it
    /// read is the number rewritten here.
    fn rewrite_labels<D: StyledDocument + ?Sized>(
        &self,
        doc: &mut D,
        map: &RenumberMap,
    ) -> Result<usize> {
        let entry_style = resolve_optional(&*doc, &self.styles.bibliography_entry);
        let label_style = resolve_optional(&*doc, &self.styles.bibliography_label);

        match (entry_style, label_style) {
            (Some(entry), label) => {
                let entries: Vec<usize> = doc
                    .paragraphs()
                    .into_iter()
                    .filter(|paragraph| entry.matches_paragraph(paragraph))
                    .map(|paragraph| paragraph.index)
                    .collect();
                let mut changed = 0;
                for index in entries {
                    let outcome = match &label {
                        Some(label) => rewrite_first_in(doc, label, Scope::Paragraph(index), map)?,
                        None => LabelRewrite::NoNumber,
                    };
                    let outcome = match outcome {
                        LabelRewrite::NoNumber => {
                            rewrite_first_in(doc, &entry, Scope::Paragraph(index), map)?
                        }
                        found => found,
                    };
                    if outcome == LabelRewrite::Changed {
                        changed += 1;
                    }
                }
                Ok(changed)
            }
            (None, Some(label)) => {
                let mut cursor = doc.find_by_style_mut(&label, Scope::Document)?;
                let mut changed = 0;
                while let Some(range) = cursor.find_next() {
                    match rewrite_first_number(&range.text, map) {
                        Some(rewritten) if rewritten != range.text => {
                            cursor.set_text(&rewritten)?;
                            changed += 1;
                        }
                        _ => {}
                    }
                }
                Ok(changed)
            }
            (None, None) => Ok(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelRewrite {
    Changed,
    Unchanged,
    /// No styled range, or no integer in the first one.
    NoNumber,
}

/// Rewrite the first integer of the first `style` range in `scope`.
fn rewrite_first_in<D: StyledDocument + ?Sized>(
    doc: &mut D,
    style: &StyleHandle,
    scope: Scope,
    map: &RenumberMap,
) -> Result<LabelRewrite> {
    let mut cursor = doc.find_by_style_mut(style, scope)?;
    let Some(range) = cursor.find_next() else {
        return Ok(LabelRewrite::NoNumber);
    };
    match rewrite_first_number(&range.text, map) {
        None => Ok(LabelRewrite::NoNumber),
        Some(rewritten) if rewritten == range.text => Ok(LabelRewrite::Unchanged),
        Some(rewritten) => {
            cursor.set_text(&rewritten)?;
            Ok(LabelRewrite::Changed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;

    fn styles() -> StyleNames {
        StyleNames::default()
    }

    fn map(pairs: &[(u64, u64)]) -> RenumberMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_rewrites_citations_and_labels() {
        let mut doc = MemoryDocument::builder()
            .character_style("cite_bib")
            .paragraph_style("REF-N")
            .character_style("bib_number")
            .paragraph(|p| {
                p.text("A ")
                    .styled("[2", "cite_bib")
                    .styled("-3]", "cite_bib")
                    .text(" B ")
                    .styled("[1]", "cite_bib")
            })
            .styled_paragraph("REF-N", |p| p.styled("1.", "bib_number").text(" One, 1999"))
            .styled_paragraph("REF-N", |p| p.styled("2.", "bib_number").text(" Two"))
            .styled_paragraph("REF-N", |p| p.styled("3.", "bib_number").text(" Three"))
            .build();

        let stats = RenumberApplier::new(&styles(), NumberExtractor::new())
            .apply(&mut doc, &map(&[(2, 1), (3, 2), (1, 3)]))
            .unwrap();

        assert_eq!(stats, ApplyStats { citations: 2, labels: 3 });
        assert_eq!(doc.paragraph_text(0).as_deref(), Some("A [1-2] B [3]"));
        assert_eq!(doc.styled_texts("bib_number"), vec!["3.", "1.", "2."]);
        assert_eq!(doc.paragraph_text(1).as_deref(), Some("3. One, 1999"));
    }

    #[test]
    fn test_unlabelled_entry_falls_back_to_paragraph_text() {
        let mut doc = MemoryDocument::builder()
            .character_style("cite_bib")
            .paragraph_style("REF-N")
            .character_style("bib_number")
            .styled_paragraph("REF-N", |p| p.text("2. Two, vol 1"))
            .styled_paragraph("REF-N", |p| p.styled("1", "bib_number").text(". One"))
            .build();

        let stats = RenumberApplier::new(&styles(), NumberExtractor::new())
            .apply(&mut doc, &map(&[(2, 1), (1, 2)]))
            .unwrap();

        assert_eq!(stats.labels, 2);
        assert_eq!(doc.paragraph_text(0).as_deref(), Some("1. Two, vol 1"));
        assert_eq!(doc.paragraph_text(1).as_deref(), Some("2. One"));
    }

    #[test]
    fn test_labels_without_entry_style() {
        let mut doc = MemoryDocument::builder()
            .character_style("cite_bib")
            .character_style("bib_number")
            .paragraph(|p| p.styled("[2]", "cite_bib"))
            .paragraph(|p| p.styled("1.", "bib_number").text(" One"))
            .paragraph(|p| p.styled("2.", "bib_number").text(" Two"))
            .build();

        let stats = RenumberApplier::new(&styles(), NumberExtractor::new())
            .apply(&mut doc, &map(&[(2, 1), (1, 2)]))
            .unwrap();

        assert_eq!(stats, ApplyStats { citations: 1, labels: 2 });
        assert_eq!(doc.styled_texts("bib_number"), vec!["2.", "1."]);
    }

    #[test]
    fn test_identity_map_changes_nothing() {
        let mut doc = MemoryDocument::builder()
            .character_style("cite_bib")
            .paragraph(|p| p.styled("[1-2]", "cite_bib"))
            .build();

        let stats = RenumberApplier::new(&styles(), NumberExtractor::new())
            .apply(&mut doc, &map(&[(1, 1), (2, 2)]))
            .unwrap();
        assert_eq!(stats, ApplyStats::default());
    }

    #[test]
    fn test_missing_citation_style_fails() {
        let mut doc = MemoryDocument::builder().text_paragraph("[1]").build();
        let err = RenumberApplier::new(&styles(), NumberExtractor::new())
            .apply(&mut doc, &map(&[(1, 2)]))
            .unwrap_err();
        assert!(err.is_style_not_found());
    }
}
