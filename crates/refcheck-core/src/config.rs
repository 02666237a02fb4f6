/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Validator configuration and `_refcheck.yml` discovery.
 */

//! Validator configuration.
//!
//! Configuration is optional. When present it lives in `_refcheck.yml` (or
//! `_refcheck.yaml`) in the document's directory or one of its parents:
//!
//! ```yaml
//! styles:
//!   citation: cite_bib
//!   bibliography-entry: REF-N
//!   bibliography-label: bib_number
//! extraction:
//!   max-range-span: 999
//! ```
//!
//! Every key is optional and falls back to the value shown above.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RefcheckError, Result};
use crate::extract::{DEFAULT_MAX_RANGE_SPAN, NumberExtractor};

/// File names searched by [`ValidatorConfig::discover`], in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &["_refcheck.yml", "_refcheck.yaml"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ValidatorConfig {
    pub styles: StyleNames,
    pub extraction: ExtractionConfig,
}

/// Names of the three styles the engine looks for, by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct StyleNames {
    /// Character style marking inline citations.
    pub citation: String,
    /// Paragraph style of bibliography entries.
    pub bibliography_entry: String,
    /// Character style marking the ordinal inside a bibliography entry.
    pub bibliography_label: String,
}

impl Default for StyleNames {
    fn default() -> Self {
        Self {
            citation: "cite_bib".to_string(),
            bibliography_entry: "REF-N".to_string(),
            bibliography_label: "bib_number".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ExtractionConfig {
    /// Widest `end - start` still expanded as a citation range.
    pub max_range_span: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_range_span: DEFAULT_MAX_RANGE_SPAN,
        }
    }
}

impl ValidatorConfig {
    pub fn extractor(&self) -> NumberExtractor {
        NumberExtractor::with_max_range_span(self.extraction.max_range_span)
    }

    /// Parse configuration from YAML. An empty document yields the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| RefcheckError::config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| RefcheckError::config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Search `start` and its parents for a configuration file.
    ///
    /// `start` may be a document path or a directory. Returns the path of the
    /// file found together with its parsed contents, or `None` if no
    /// directory up to the filesystem root has one.
    pub fn discover(start: &Path) -> Result<Option<(PathBuf, Self)>> {
        let mut current = if start.is_dir() {
            Some(start)
        } else {
            start.parent()
        };

        while let Some(dir) = current {
            for name in CONFIG_FILE_NAMES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    tracing::debug!(path = %candidate.display(), "Found configuration file");
                    let config = Self::from_file(&candidate)?;
                    return Ok(Some((candidate, config)));
                }
            }
            current = dir.parent();
        }

        Ok(None)
    }
}
