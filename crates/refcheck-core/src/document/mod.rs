/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Styled document capability interface.
 */

//! Styled document capability interface.
//!
//! The engine never talks to a concrete document format. Everything it needs
//! is expressed by [`StyledDocument`]: a style registry, an ordered list of
//! paragraphs, and forward-only style searches.
//!
//! Read-only searches ([`StyledDocument::find_by_style`]) borrow the document
//! immutably, so code holding only `&dyn StyledDocument` cannot change it.
//! Rewriting goes through [`StyledDocument::find_by_style_mut`], which hands
//! out a [`RangeCursor`] with find-next semantics: the only way to move is
//! forward, and [`RangeCursor::set_text`] applies to the range most recently
//! returned.
//!
//! Both implementations keep their text in a [`RunLayout`]:
//! - [`MemoryDocument`] - paragraphs of styled runs held in memory
//! - `DocxDocument` (in refcheck-docx) - a WordprocessingML package

pub mod layout;
mod memory;

pub use layout::{Run, RunLayout};
pub use memory::{MemoryDocument, MemoryDocumentBuilder, ParagraphBuilder};

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors reported by a [`StyledDocument`] backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("'{0}' style not found")]
    StyleNotFound(String),

    #[error("Failed to save document: {message}")]
    Persistence {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Paragraph {0} is out of range")]
    ParagraphOutOfRange(usize),

    /// `set_text` was called before `find_next` returned a range.
    #[error("No range is selected")]
    NoActiveRange,

    #[error("Range is not writable: {0}")]
    NotWritable(String),

    #[error("{0}")]
    Backend(String),
}

/// Whether a style applies to whole paragraphs or to runs of characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Paragraph,
    Character,
}

/// A style resolved against a document's style registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleHandle {
    name: String,
    kind: StyleKind,
}

impl StyleHandle {
    pub fn new(name: impl Into<String>, kind: StyleKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Display name of the style, as reported in [`Paragraph::style`].
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StyleKind {
        self.kind
    }

    /// Whether a paragraph carries this style as its paragraph style.
    pub fn matches_paragraph(&self, paragraph: &Paragraph) -> bool {
        paragraph.style.as_deref() == Some(self.name.as_str())
    }
}

/// A snapshot of one paragraph.
///
/// Offsets count characters from the start of the document, with paragraphs
/// laid end-to-end and separated by a one-character terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub index: usize,
    /// Display name of the paragraph style, if any.
    pub style: Option<String>,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Where a style search looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Document,
    /// Only inside the paragraph with this index.
    Paragraph(usize),
}

/// A range found by a style search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundRange {
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Index of the paragraph containing the range.
    pub paragraph: usize,
}

/// Forward-only cursor over the ranges carrying one style.
pub trait RangeCursor {
    /// Advance to the next range, or `None` once the scope is exhausted.
    fn find_next(&mut self) -> Option<FoundRange>;

    /// Replace the text of the range most recently returned by `find_next`.
    ///
    /// The replacement keeps the range's style. The cursor continues after
    /// the replaced range.
    fn set_text(&mut self, text: &str) -> Result<(), DocumentError>;
}

/// The capability interface the engine runs against.
///
/// One value represents one exclusive session against one document.
/// Implementations need not be thread-safe.
pub trait StyledDocument {
    /// Look up a style by name.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::StyleNotFound`] if the document does not
    /// define the style.
    fn resolve_style(&self, name: &str) -> Result<StyleHandle, DocumentError>;

    /// All paragraphs, in document order.
    fn paragraphs(&self) -> Vec<Paragraph>;

    /// Lazily iterate the ranges carrying `style` within `scope`, in
    /// document order.
    ///
    /// Character styles yield maximal runs of consecutive styled text;
    /// paragraph styles yield whole paragraphs.
    fn find_by_style<'a>(
        &'a self,
        style: &StyleHandle,
        scope: Scope,
    ) -> Result<Box<dyn Iterator<Item = FoundRange> + 'a>, DocumentError>;

    /// Like [`find_by_style`](Self::find_by_style), but the returned cursor
    /// can rewrite each range it visits.
    fn find_by_style_mut<'a>(
        &'a mut self,
        style: &StyleHandle,
        scope: Scope,
    ) -> Result<Box<dyn RangeCursor + 'a>, DocumentError>;

    /// Persist the document. `None` overwrites the source.
    fn save(&mut self, path: Option<&Path>) -> Result<(), DocumentError>;
}
