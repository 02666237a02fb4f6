/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for refcheck-docx
 */

use std::path::PathBuf;

use refcheck_core::DocumentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid package: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A part the backend cannot work without is absent.
    #[error("Package has no '{0}' part")]
    MissingPart(String),

    #[error("Malformed XML in '{part}': {message}")]
    Xml { part: String, message: String },

    #[error("Part '{0}' is not valid UTF-8")]
    Encoding(String),

    #[error("Document has no source path; a save path is required")]
    NoSourcePath,
}

impl DocxError {
    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        Self::Xml {
            part: part.to_string(),
            message: err.to_string(),
        }
    }

    /// Convert a failure while writing `path` into the capability
    /// interface's persistence error.
    pub(crate) fn into_persistence(self, path: Option<PathBuf>) -> DocumentError {
        DocumentError::Persistence {
            path,
            message: self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocxError>;
