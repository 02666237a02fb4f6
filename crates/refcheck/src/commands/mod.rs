//! Command implementations for the refcheck CLI
//!
//! Each command module handles the CLI interface and delegates to
//! refcheck-core (and refcheck-docx for documents) for the actual work.

pub mod numbers;
pub mod validate;

use clap::ValueEnum;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
