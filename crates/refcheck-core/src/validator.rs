/*
 * validator.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Validation pipeline and renumbering state machine.
 */

//! The validation pipeline.
//!
//! ```text
//! Collected -> Analyzed -> Reported
//!                      \-> Renumbering -> Reapplied -> Reported
//! ```
//!
//! [`Validator::validate`] stops at `Analyzed` and borrows the document
//! immutably, so a plain validation can never change it.
//! [`Validator::validate_and_renumber`] continues through renumbering when
//! the citations are out of sequence, saves the document, and re-runs the
//! whole pipeline to confirm the result.

use std::path::Path;

use serde::Serialize;

use crate::collect::{
    CitationCollection, CitationCollector, ReferenceCollection, ReferenceNumberCollector,
};
use crate::config::ValidatorConfig;
use crate::document::StyledDocument;
use crate::error::{RefcheckError, Result};
use crate::renumber::{RenumberApplier, RenumberMap, RenumberPlanner};
use crate::report::ReconciliationReport;

pub const NO_CITATIONS_MESSAGE: &str = "No citations found.";
pub const ALREADY_IN_SEQUENCE_MESSAGE: &str = "Citations already in sequence.";

/// States of one validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationState {
    Collected,
    Analyzed,
    Renumbering,
    Reapplied,
    Reported,
}

/// Result of a renumbering attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenumberOutcome {
    pub renumbered: bool,
    /// Empty when no renumbering was attempted.
    pub map: RenumberMap,
    pub message: String,
}

impl RenumberOutcome {
    fn skipped(message: &str) -> Self {
        Self {
            renumbered: false,
            map: RenumberMap::default(),
            message: message.to_string(),
        }
    }
}

/// Everything [`Validator::validate_and_renumber`] learned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    /// The confirmed post-renumbering report, or the as-collected report if
    /// no renumbering happened or it could not be saved.
    pub report: ReconciliationReport,
    pub renumber: Option<RenumberOutcome>,
    /// False when a renumbering was applied in memory but not persisted.
    pub confirmed: bool,
    /// States visited, in order.
    pub states: Vec<ValidationState>,
}

/// Both collections from one pass over a document.
#[derive(Debug, Clone)]
pub struct Collected {
    pub references: ReferenceCollection,
    pub citations: CitationCollection,
}

/// Runs the collection, analysis and renumbering pipeline.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run both collectors once.
    pub fn collect<D: StyledDocument + ?Sized>(&self, doc: &D) -> Result<Collected> {
        let styles = &self.config.styles;
        let citations = CitationCollector::new(styles, self.config.extractor()).collect(doc)?;
        let references = ReferenceNumberCollector::new(styles).collect(doc)?;
        Ok(Collected {
            references,
            citations,
        })
    }

    /// Reconcile citations against the bibliography without modifying the
    /// document.
    ///
    /// # Errors
    ///
    /// Fails with [`RefcheckError::StyleNotFound`] if the document has no
    /// citation style.
    pub fn validate<D: StyledDocument + ?Sized>(&self, doc: &D) -> Result<ReconciliationReport> {
        let collected = self.collect(doc)?;
        let report = ReconciliationReport::build(&collected.references, &collected.citations);
        tracing::debug!(
            references = report.total_references,
            citations = report.total_citations,
            ordered = report.sequence_ordered,
            "Validated document"
        );
        Ok(report)
    }

    /// Renumber the document if `report` shows citations out of sequence,
    /// then save it to `save_path` (or over the source).
    ///
    /// A failed save is reported through the outcome, not as an error.
    pub fn renumber_if_needed<D: StyledDocument + ?Sized>(
        &self,
        doc: &mut D,
        report: &ReconciliationReport,
        save_path: Option<&Path>,
    ) -> Result<RenumberOutcome> {
        if report.citation_sequence.is_empty() {
            return Ok(RenumberOutcome::skipped(NO_CITATIONS_MESSAGE));
        }
        let analysis = report.analysis();
        if analysis.ordered {
            return Ok(RenumberOutcome::skipped(ALREADY_IN_SEQUENCE_MESSAGE));
        }

        let map = RenumberPlanner::plan(&analysis.unique_sequence, &report.reference_numbers());
        tracing::info!(
            mapped = map.len(),
            first_violation = ?analysis.first_violation,
            "Citations out of sequence; renumbering"
        );

        let stats = RenumberApplier::new(&self.config.styles, self.config.extractor())
            .apply(doc, &map)?;

        if let Err(err) = doc.save(save_path) {
            let err = RefcheckError::from(err);
            tracing::error!(error = %err, "Renumbered document could not be saved");
            return Ok(RenumberOutcome {
                renumbered: false,
                map,
                message: err.to_string(),
            });
        }
        match save_path {
            Some(path) => tracing::info!(path = %path.display(), "Saved renumbered document"),
            None => tracing::info!("Saved renumbered document over the source"),
        }

        Ok(RenumberOutcome {
            renumbered: true,
            message: format!(
                "Renumbered {} references: {} citations and {} bibliography labels updated.",
                map.len(),
                stats.citations,
                stats.labels
            ),
            map,
        })
    }

    /// Validate, and renumber when the citations are out of sequence.
    ///
    /// After a successful renumbering the whole pipeline runs again on the
    /// modified document and that confirmed report is returned.
    pub fn validate_and_renumber<D: StyledDocument + ?Sized>(
        &self,
        doc: &mut D,
        save_path: Option<&Path>,
    ) -> Result<ValidationOutcome> {
        let mut states = Vec::with_capacity(5);

        let collected = self.collect(&*doc)?;
        states.push(ValidationState::Collected);

        let report = ReconciliationReport::build(&collected.references, &collected.citations);
        states.push(ValidationState::Analyzed);

        if report.sequence_ordered {
            states.push(ValidationState::Reported);
            return Ok(ValidationOutcome {
                report,
                renumber: None,
                confirmed: true,
                states,
            });
        }

        states.push(ValidationState::Renumbering);
        let outcome = self.renumber_if_needed(doc, &report, save_path)?;
        if !outcome.renumbered {
            states.push(ValidationState::Reported);
            return Ok(ValidationOutcome {
                report,
                renumber: Some(outcome),
                confirmed: false,
                states,
            });
        }

        let confirmed = self.validate(&*doc)?;
        states.push(ValidationState::Reapplied);
        if !confirmed.sequence_ordered {
            tracing::warn!(
                sequence = ?confirmed.citation_sequence,
                "Citations are still out of sequence after renumbering"
            );
        }
        states.push(ValidationState::Reported);

        Ok(ValidationOutcome {
            report: confirmed,
            renumber: Some(outcome),
            confirmed: true,
            states,
        })
    }
}
