/*
 * memory.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * In-memory StyledDocument implementation.
 */

use std::path::{Path, PathBuf};

use super::layout::{Run, RunLayout};
use super::{
    DocumentError, FoundRange, Paragraph, RangeCursor, Scope, StyleHandle, StyleKind,
    StyledDocument,
};

/// A styled document held entirely in memory.
///
/// Built with [`MemoryDocument::builder`]. Saves are recorded rather than
/// written anywhere; [`fail_saves_with`](Self::fail_saves_with) makes every
/// subsequent save fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    styles: Vec<StyleHandle>,
    layout: RunLayout,
    saves: Vec<Option<PathBuf>>,
    save_failure: Option<String>,
}

impl MemoryDocument {
    pub fn builder() -> MemoryDocumentBuilder {
        MemoryDocumentBuilder::default()
    }

    pub fn paragraph_count(&self) -> usize {
        self.layout.paragraph_count()
    }

    pub fn paragraph_text(&self, index: usize) -> Option<String> {
        self.layout.paragraph_text(index)
    }

    /// Texts of every range carrying `style`, in document order.
    ///
    /// Returns an empty list for undefined styles.
    pub fn styled_texts(&self, style: &str) -> Vec<String> {
        let Ok(handle) = self.resolve_style(style) else {
            return Vec::new();
        };
        match self.layout.find(&handle, Scope::Document) {
            Ok(found) => found.map(|range| range.text).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Paths passed to successful saves, in order.
    pub fn saves(&self) -> &[Option<PathBuf>] {
        &self.saves
    }

    pub fn fail_saves_with(&mut self, message: impl Into<String>) {
        self.save_failure = Some(message.into());
    }
}

impl StyledDocument for MemoryDocument {
    fn resolve_style(&self, name: &str) -> Result<StyleHandle, DocumentError> {
        self.styles
            .iter()
            .find(|style| style.name() == name)
            .cloned()
            .ok_or_else(|| DocumentError::StyleNotFound(name.to_string()))
    }

    fn paragraphs(&self) -> Vec<Paragraph> {
        self.layout.paragraphs()
    }

    fn find_by_style<'a>(
        &'a self,
        style: &StyleHandle,
        scope: Scope,
    ) -> Result<Box<dyn Iterator<Item = FoundRange> + 'a>, DocumentError> {
        Ok(Box::new(self.layout.find(style, scope)?))
    }

    fn find_by_style_mut<'a>(
        &'a mut self,
        style: &StyleHandle,
        scope: Scope,
    ) -> Result<Box<dyn RangeCursor + 'a>, DocumentError> {
        Ok(Box::new(self.layout.find_mut(style, scope)?))
    }

    fn save(&mut self, path: Option<&Path>) -> Result<(), DocumentError> {
        if let Some(message) = &self.save_failure {
            return Err(DocumentError::Persistence {
                path: path.map(Path::to_path_buf),
                message: message.clone(),
            });
        }
        self.saves.push(path.map(Path::to_path_buf));
        Ok(())
    }
}

/// Builder for [`MemoryDocument`].
///
/// ```rust,ignore
/// let doc = MemoryDocument::builder()
///     .character_style("cite_bib")
///     .paragraph(|p| p.text("See ").styled("[1]", "cite_bib"))
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct MemoryDocumentBuilder {
    doc: MemoryDocument,
}

impl MemoryDocumentBuilder {
    pub fn paragraph_style(mut self, name: impl Into<String>) -> Self {
        self.doc
            .styles
            .push(StyleHandle::new(name, StyleKind::Paragraph));
        self
    }

    pub fn character_style(mut self, name: impl Into<String>) -> Self {
        self.doc
            .styles
            .push(StyleHandle::new(name, StyleKind::Character));
        self
    }

    /// Add a paragraph with no paragraph style.
    pub fn paragraph(self, build: impl FnOnce(ParagraphBuilder) -> ParagraphBuilder) -> Self {
        self.push_paragraph(None, build(ParagraphBuilder::default()))
    }

    pub fn styled_paragraph(
        self,
        style: impl Into<String>,
        build: impl FnOnce(ParagraphBuilder) -> ParagraphBuilder,
    ) -> Self {
        self.push_paragraph(Some(style.into()), build(ParagraphBuilder::default()))
    }

    /// Add an unstyled paragraph made of a single plain run.
    pub fn text_paragraph(self, text: impl Into<String>) -> Self {
        self.paragraph(|p| p.text(text))
    }

    pub fn build(self) -> MemoryDocument {
        self.doc
    }

    fn push_paragraph(mut self, style: Option<String>, builder: ParagraphBuilder) -> Self {
        self.doc.layout.push_paragraph(style, builder.runs);
        self
    }
}

/// Builder for the runs of one paragraph.
#[derive(Debug, Default)]
pub struct ParagraphBuilder {
    runs: Vec<Run>,
}

impl ParagraphBuilder {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.runs.push(Run::new(text, None));
        self
    }

    pub fn styled(mut self, text: impl Into<String>, style: impl Into<String>) -> Self {
        self.runs.push(Run::new(text, Some(style.into())));
        self
    }
}
