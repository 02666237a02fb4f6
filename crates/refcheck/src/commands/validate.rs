/*
 * validate.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Validate command implementation
 */

//! Validate command implementation.
//!
//! `refcheck validate` opens a `.docx` document, reconciles its citations
//! against its bibliography and prints the report. With `--renumber`, a
//! document whose citations are out of sequence is renumbered and written to
//! `renumbered_<name>` next to the input, to `--output`, or over the input
//! with `--in-place`. Without `--renumber` the document is never written.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{debug, info};

use refcheck_core::{ReconciliationReport, ValidationOutcome, Validator, ValidatorConfig};
use refcheck_docx::DocxDocument;

use super::OutputFormat;

/// Exit status for `--strict` when the final report is not clean.
const STRICT_FAILURE: u8 = 2;

/// Arguments for the validate command
#[derive(Debug)]
pub struct ValidateArgs {
    pub input: PathBuf,
    pub renumber: bool,
    pub output: Option<PathBuf>,
    pub in_place: bool,
    pub format: OutputFormat,
    pub config: Option<PathBuf>,
    pub citation_style: Option<String>,
    pub entry_style: Option<String>,
    pub label_style: Option<String>,
    pub strict: bool,
}

/// Execute the validate command
pub fn execute(args: ValidateArgs) -> Result<ExitCode> {
    if !args.input.is_file() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let config = load_config(&args)?;
    let validator = Validator::new(config);
    let mut doc = DocxDocument::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    if !args.renumber {
        let report = validator.validate(&doc)?;
        print_report(&report, args.format)?;
        return Ok(exit_code(&report, args.strict));
    }

    let target = target_path(&args);
    debug!(target = ?target, "Renumbering target");
    let outcome = validator.validate_and_renumber(&mut doc, target.as_deref())?;
    print_outcome(&outcome, args.format)?;

    let persisted = outcome
        .renumber
        .as_ref()
        .is_none_or(|renumber| renumber.renumbered);
    if !persisted {
        return Ok(ExitCode::FAILURE);
    }
    Ok(exit_code(&outcome.report, args.strict))
}

/// Configuration from `--config` or discovery, with style flags applied on
/// top.
fn load_config(args: &ValidateArgs) -> Result<ValidatorConfig> {
    let mut config = match &args.config {
        Some(path) => ValidatorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => {
            let start = std::path::absolute(&args.input)?;
            match ValidatorConfig::discover(&start)? {
                Some((path, config)) => {
                    info!(path = %path.display(), "Using configuration");
                    config
                }
                None => ValidatorConfig::default(),
            }
        }
    };

    if let Some(name) = &args.citation_style {
        config.styles.citation = name.clone();
    }
    if let Some(name) = &args.entry_style {
        config.styles.bibliography_entry = name.clone();
    }
    if let Some(name) = &args.label_style {
        config.styles.bibliography_label = name.clone();
    }
    Ok(config)
}

/// Where a renumbered document goes; `None` overwrites the input.
fn target_path(args: &ValidateArgs) -> Option<PathBuf> {
    if args.in_place {
        return None;
    }
    Some(
        args.output
            .clone()
            .unwrap_or_else(|| default_target(&args.input)),
    )
}

/// `renumbered_<name>` next to `input`.
fn default_target(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("renumbered_{}", name))
}

fn exit_code(report: &ReconciliationReport, strict: bool) -> ExitCode {
    if strict && !report.is_clean() {
        ExitCode::from(STRICT_FAILURE)
    } else {
        ExitCode::SUCCESS
    }
}

fn print_report(report: &ReconciliationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", report.summary()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn print_outcome(outcome: &ValidationOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", outcome_text(outcome)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
    }
    Ok(())
}

fn outcome_text(outcome: &ValidationOutcome) -> String {
    let mut out = outcome.report.summary();
    match &outcome.renumber {
        None => out.push_str("\nNo renumbering needed."),
        Some(renumber) => {
            let _ = write!(out, "\n{}", renumber.message);
            for (old, new) in renumber.map.iter() {
                if old != new {
                    let _ = write!(out, "\n  {} -> {}", old, new);
                }
            }
        }
    }
    out
}
