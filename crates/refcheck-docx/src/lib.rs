//! WordprocessingML (`.docx`) backend for refcheck
//!
//! [`DocxDocument`] implements [`refcheck_core::StyledDocument`] over a
//! `.docx` package:
//!
//! - `word/styles.xml` becomes a [`StyleRegistry`]; styles resolve by
//!   display name, then by style id
//! - `word/document.xml` becomes paragraphs of styled runs; only `w:t`
//!   elements contribute text
//! - saving splices changed runs back into the original XML and repacks
//!   the archive, leaving every other part untouched
//!
//! # Example
//!
//! ```ignore
//! use refcheck_core::Validator;
//! use refcheck_docx::DocxDocument;
//!
//! let mut doc = DocxDocument::open("paper.docx")?;
//! let outcome = Validator::default()
//!     .validate_and_renumber(&mut doc, Some("renumbered_paper.docx".as_ref()))?;
//! println!("{}", outcome.report.summary());
//! ```

mod body;
pub mod document;
pub mod error;
mod package;
pub mod styles;

pub use document::DocxDocument;
pub use error::{DocxError, Result};
pub use styles::{StyleDef, StyleRegistry};
