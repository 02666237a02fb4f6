/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for refcheck-core
 */

//! Error types for refcheck-core.
//!
//! Errors are typed by kind so callers can tell "nothing to validate"
//! ([`RefcheckError::StyleNotFound`]) apart from "write failed"
//! ([`RefcheckError::Persistence`]).

use std::path::PathBuf;

use thiserror::Error;

use crate::document::DocumentError;

#[derive(Error, Debug)]
pub enum RefcheckError {
    /// A style required for validation is not defined in the document.
    #[error("'{name}' style not found")]
    StyleNotFound { name: String },

    /// The mutated document could not be written back.
    #[error("Failed to save document{}: {message}", display_path(.path))]
    Persistence {
        path: Option<PathBuf>,
        message: String,
    },

    /// Any other failure reported by the document backend.
    #[error("Document error: {0}")]
    Document(#[source] DocumentError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RefcheckError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error means the document lacks the citation style,
    /// i.e. there is nothing to validate.
    pub fn is_style_not_found(&self) -> bool {
        matches!(self, Self::StyleNotFound { .. })
    }
}

impl From<DocumentError> for RefcheckError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::StyleNotFound(name) => Self::StyleNotFound { name },
            DocumentError::Persistence { path, message } => Self::Persistence { path, message },
            other => Self::Document(other),
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" to {}", path.display()),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, RefcheckError>;
