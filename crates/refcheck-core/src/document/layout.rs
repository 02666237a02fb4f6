/*
 * layout.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Paragraphs of styled runs, and style search over them.
 */

//! Paragraphs of styled runs, and style search over them.
//!
//! [`RunLayout`] is the model behind both [`MemoryDocument`](super::MemoryDocument)
//! and the DOCX backend. Backends own the style registry and persistence;
//! the layout answers `paragraphs`, `find_by_style` and `find_by_style_mut`.
//!
//! A character-style search yields maximal groups of consecutive runs that
//! carry the style, skipping groups with no text. A paragraph-style search
//! yields whole non-empty paragraphs.

use super::{DocumentError, FoundRange, Paragraph, RangeCursor, Scope, StyleHandle, StyleKind};

/// A run of text sharing one character style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    /// Display name of the character style.
    pub style: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>, style: Option<String>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LayoutParagraph {
    style: Option<String>,
    runs: Vec<Run>,
}

impl LayoutParagraph {
    fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    fn len(&self) -> usize {
        self.runs.iter().map(|run| run.text.chars().count()).sum()
    }
}

/// Ordered paragraphs, each an ordered list of runs.
///
/// Offsets count characters, with a one-character terminator after every
/// paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLayout {
    paragraphs: Vec<LayoutParagraph>,
}

/// A match: one paragraph and the half-open interval of runs it covers.
#[derive(Debug, Clone, Copy)]
struct Hit {
    paragraph: usize,
    first_run: usize,
    end_run: usize,
}

/// Search position: next paragraph to look at and first run within it.
type Position = (usize, usize);

impl RunLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_paragraph(&mut self, style: Option<String>, runs: Vec<Run>) {
        self.paragraphs.push(LayoutParagraph { style, runs });
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn paragraph_text(&self, index: usize) -> Option<String> {
        self.paragraphs.get(index).map(LayoutParagraph::text)
    }

    /// The runs of one paragraph; empty for an out-of-range index.
    pub fn runs(&self, index: usize) -> &[Run] {
        self.paragraphs
            .get(index)
            .map(|paragraph| paragraph.runs.as_slice())
            .unwrap_or_default()
    }

    /// Snapshots of every paragraph, in order.
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        let mut start = 0;
        self.paragraphs
            .iter()
            .enumerate()
            .map(|(index, paragraph)| {
                let len = paragraph.len();
                let snapshot = Paragraph {
                    index,
                    style: paragraph.style.clone(),
                    text: paragraph.text(),
                    start,
                    end: start + len,
                };
                start += len + 1;
                snapshot
            })
            .collect()
    }

    pub fn find<'a>(
        &'a self,
        style: &StyleHandle,
        scope: Scope,
    ) -> Result<LayoutFind<'a>, DocumentError> {
        let (first, end) = self.scope_bounds(scope)?;
        Ok(LayoutFind {
            layout: self,
            style: style.clone(),
            position: (first, 0),
            end,
        })
    }

    pub fn find_mut<'a>(
        &'a mut self,
        style: &StyleHandle,
        scope: Scope,
    ) -> Result<LayoutCursor<'a>, DocumentError> {
        let (first, end) = self.scope_bounds(scope)?;
        Ok(LayoutCursor {
            layout: self,
            style: style.clone(),
            position: (first, 0),
            end,
            current: None,
        })
    }

    fn scope_bounds(&self, scope: Scope) -> Result<(usize, usize), DocumentError> {
        match scope {
            Scope::Document => Ok((0, self.paragraphs.len())),
            Scope::Paragraph(index) if index < self.paragraphs.len() => Ok((index, index + 1)),
            Scope::Paragraph(index) => Err(DocumentError::ParagraphOutOfRange(index)),
        }
    }

    fn next_hit(&self, style: &StyleHandle, from: Position, end: usize) -> Option<Hit> {
        let (first_paragraph, first_run) = from;
        for index in first_paragraph..end {
            let paragraph = &self.paragraphs[index];
            let start_run = if index == first_paragraph { first_run } else { 0 };
            match style.kind() {
                StyleKind::Paragraph => {
                    if start_run == 0
                        && paragraph.style.as_deref() == Some(style.name())
                        && paragraph.len() > 0
                    {
                        return Some(Hit {
                            paragraph: index,
                            first_run: 0,
                            end_run: paragraph.runs.len(),
                        });
                    }
                }
                StyleKind::Character => {
                    let runs = &paragraph.runs;
                    let mut run = start_run;
                    while run < runs.len() {
                        if runs[run].style.as_deref() != Some(style.name()) {
                            run += 1;
                            continue;
                        }
                        let mut end_run = run;
                        while end_run < runs.len()
                            && runs[end_run].style.as_deref() == Some(style.name())
                        {
                            end_run += 1;
                        }
                        if runs[run..end_run].iter().any(|r| !r.text.is_empty()) {
                            return Some(Hit {
                                paragraph: index,
                                first_run: run,
                                end_run,
                            });
                        }
                        run = end_run;
                    }
                }
            }
        }
        None
    }

    fn paragraph_start(&self, index: usize) -> usize {
        self.paragraphs[..index].iter().map(|p| p.len() + 1).sum()
    }

    fn hit_text(&self, hit: Hit) -> String {
        self.paragraphs[hit.paragraph].runs[hit.first_run..hit.end_run]
            .iter()
            .map(|run| run.text.as_str())
            .collect()
    }

    fn found_range(&self, hit: Hit) -> FoundRange {
        let paragraph = &self.paragraphs[hit.paragraph];
        let before: usize = paragraph.runs[..hit.first_run]
            .iter()
            .map(|run| run.text.chars().count())
            .sum();
        let text = self.hit_text(hit);
        let start = self.paragraph_start(hit.paragraph) + before;
        FoundRange {
            start,
            end: start + text.chars().count(),
            text,
            paragraph: hit.paragraph,
        }
    }
}

fn resume_after(hit: Hit, kind: StyleKind) -> Position {
    match kind {
        StyleKind::Paragraph => (hit.paragraph + 1, 0),
        StyleKind::Character => (hit.paragraph, hit.end_run),
    }
}

/// Read-only style search over a [`RunLayout`].
pub struct LayoutFind<'a> {
    layout: &'a RunLayout,
    style: StyleHandle,
    position: Position,
    end: usize,
}

impl Iterator for LayoutFind<'_> {
    type Item = FoundRange;

    fn next(&mut self) -> Option<FoundRange> {
        let hit = self.layout.next_hit(&self.style, self.position, self.end)?;
        self.position = resume_after(hit, self.style.kind());
        Some(self.layout.found_range(hit))
    }
}

/// Rewriting style search over a [`RunLayout`].
///
/// [`set_text`](RangeCursor::set_text) edits only the run holding the
/// changed characters when the change falls inside one run. Otherwise the
/// new text goes into the first non-empty run of the range and the others
/// are emptied.
pub struct LayoutCursor<'a> {
    layout: &'a mut RunLayout,
    style: StyleHandle,
    position: Position,
    end: usize,
    current: Option<Hit>,
}

impl RangeCursor for LayoutCursor<'_> {
    fn find_next(&mut self) -> Option<FoundRange> {
        let hit = self.layout.next_hit(&self.style, self.position, self.end)?;
        self.position = resume_after(hit, self.style.kind());
        self.current = Some(hit);
        Some(self.layout.found_range(hit))
    }

    fn set_text(&mut self, text: &str) -> Result<(), DocumentError> {
        let hit = self.current.ok_or(DocumentError::NoActiveRange)?;
        let runs = &mut self.layout.paragraphs[hit.paragraph].runs[hit.first_run..hit.end_run];
        if let Some((index, edited)) = single_run_edit(runs, text) {
            runs[index].text = edited;
            return Ok(());
        }
        let Some(target) = runs.iter().position(|run| !run.text.is_empty()) else {
            return Err(DocumentError::NotWritable(format!(
                "paragraph {} has no text to replace",
                hit.paragraph
            )));
        };
        for (i, run) in runs.iter_mut().enumerate() {
            if i == target {
                run.text = text.to_string();
            } else {
                run.text.clear();
            }
        }
        Ok(())
    }
}

/// The run index and new run text when the difference between the runs'
/// text and `text` lies within a single non-empty run.
fn single_run_edit(runs: &[Run], text: &str) -> Option<(usize, String)> {
    let old: Vec<char> = runs.iter().flat_map(|run| run.text.chars()).collect();
    let new: Vec<char> = text.chars().collect();
    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(old.len().min(new.len()) - prefix)
        .take_while(|(a, b)| a == b)
        .count();
    let (edit_start, edit_end) = (prefix, old.len() - suffix);

    let mut start = 0;
    for (index, run) in runs.iter().enumerate() {
        let chars: Vec<char> = run.text.chars().collect();
        let end = start + chars.len();
        if !chars.is_empty() && start <= edit_start && edit_end <= end {
            let mut edited: String = chars[..edit_start - start].iter().collect();
            edited.extend(&new[prefix..new.len() - suffix]);
            edited.extend(&chars[edit_end - start..]);
            return Some((index, edited));
        }
        start = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, style: Option<&str>) -> Run {
        Run::new(text, style.map(str::to_string))
    }

    fn layout() -> RunLayout {
        let mut layout = RunLayout::new();
        layout.push_paragraph(
            None,
            vec![
                run("x ", None),
                run("", Some("cite")),
                run("[4", Some("cite")),
                run("]", Some("cite")),
            ],
        );
        layout.push_paragraph(None, vec![run("", Some("cite"))]);
        layout.push_paragraph(Some("Ref".into()), vec![]);
        layout
    }

    #[test]
    fn test_empty_groups_and_paragraphs_are_skipped() {
        let layout = layout();
        let cite = StyleHandle::new("cite", StyleKind::Character);
        let found: Vec<_> = layout.find(&cite, Scope::Document).unwrap().collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "[4]");
        assert_eq!((found[0].start, found[0].end), (2, 5));

        let reference = StyleHandle::new("Ref", StyleKind::Paragraph);
        assert_eq!(layout.find(&reference, Scope::Document).unwrap().count(), 0);
    }

    fn run_texts(layout: &RunLayout, paragraph: usize) -> Vec<&str> {
        layout
            .runs(paragraph)
            .iter()
            .map(|r| r.text.as_str())
            .collect()
    }

    #[test]
    fn test_set_text_edits_only_the_changed_run() {
        let mut layout = layout();
        let cite = StyleHandle::new("cite", StyleKind::Character);
        let mut cursor = layout.find_mut(&cite, Scope::Document).unwrap();
        cursor.find_next().unwrap();
        cursor.set_text("[12]").unwrap();
        assert!(cursor.find_next().is_none());

        assert_eq!(run_texts(&layout, 0), vec!["x ", "", "[12", "]"]);
        assert!(layout.runs(7).is_empty());
    }

    #[test]
    fn test_set_text_across_runs_uses_first_non_empty_run() {
        let mut layout = layout();
        let cite = StyleHandle::new("cite", StyleKind::Character);
        let mut cursor = layout.find_mut(&cite, Scope::Document).unwrap();
        cursor.find_next().unwrap();
        cursor.set_text("(5)").unwrap();

        assert_eq!(run_texts(&layout, 0), vec!["x ", "", "(5)", ""]);
    }

    #[test]
    fn test_single_run_edit() {
        let runs = vec![run("[1", None), run("-3]", None)];
        assert_eq!(
            single_run_edit(&runs, "[10-12]"),
            Some((1, "0-12]".to_string()))
        );
        assert_eq!(single_run_edit(&runs, "[1-3]"), Some((1, "-3]".to_string())));
        assert_eq!(single_run_edit(&runs, "<1-3>"), None);
        assert_eq!(single_run_edit(&[run("", None)], "x"), None);
    }

    #[test]
    fn test_paragraph_snapshots() {
        let paragraphs = layout().paragraphs();
        assert_eq!(paragraphs[0].text, "x [4]");
        assert_eq!((paragraphs[1].start, paragraphs[1].end), (6, 6));
        assert_eq!(paragraphs[2].start, 7);
        assert_eq!(paragraphs[2].style.as_deref(), Some("Ref"));
    }
}
