//! Citation/reference consistency checking and renumbering
//!
//! This crate checks that the numbered citation markers of a document agree
//! with its numbered bibliography, and renumbers both when citations are not
//! in ascending order of first use.
//!
//! # Architecture
//!
//! The engine runs against the [`StyledDocument`] capability interface and
//! never against a concrete file format:
//!
//! - [`NumberExtractor`] - parses marker text such as `[2, 5-7]` into integers
//! - [`ReferenceNumberCollector`] / [`CitationCollector`] - read both sides
//! - [`SequenceAnalysis`] - first-appearance order and its verdict
//! - [`ReconciliationReport`] - totals, missing/unused sets, ordering
//! - [`RenumberPlanner`] / [`RenumberApplier`] - compute and apply a renumbering
//! - [`Validator`] - the pipeline and its state machine
//!
//! # Example
//!
//! ```ignore
//! use refcheck_core::{MemoryDocument, Validator};
//!
//! let mut doc = MemoryDocument::builder()
//!     .character_style("cite_bib")
//!     .paragraph(|p| p.text("See ").styled("[2]", "cite_bib"))
//!     .paragraph(|p| p.text("and ").styled("[1]", "cite_bib"))
//!     .build();
//!
//! let validator = Validator::default();
//! let report = validator.validate(&doc)?;
//! assert!(!report.sequence_ordered);
//!
//! let outcome = validator.validate_and_renumber(&mut doc, None)?;
//! assert!(outcome.report.sequence_ordered);
//! ```

pub mod collect;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod renumber;
pub mod report;
pub mod sequence;
pub mod validator;

// Re-export commonly used types
pub use collect::{
    CitationCollection, CitationCollector, CitationOccurrence, ReferenceCollection,
    ReferenceEntry, ReferenceNumberCollector,
};
pub use config::{CONFIG_FILE_NAMES, ExtractionConfig, StyleNames, ValidatorConfig};
pub use document::{
    DocumentError, FoundRange, MemoryDocument, Paragraph, RangeCursor, Run, RunLayout, Scope,
    StyleHandle, StyleKind, StyledDocument,
};
pub use error::{RefcheckError, Result};
pub use extract::{
    DEFAULT_MAX_RANGE_SPAN, NumberExtractor, NumberSegment, NumberToken, SegmentKind,
    extract_numbers,
};
pub use renumber::{ApplyStats, RenumberApplier, RenumberMap, RenumberPlanner, compact_numbers};
pub use report::ReconciliationReport;
pub use sequence::{SequenceAnalysis, first_appearance_order};
pub use validator::{RenumberOutcome, ValidationOutcome, ValidationState, Validator};
