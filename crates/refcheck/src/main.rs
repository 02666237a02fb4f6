//! refcheck CLI - Main entry point

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "refcheck")]
#[command(version)]
#[command(about = "Check and renumber numbered citations in Word documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile citations against the bibliography, optionally renumbering
    Validate {
        /// Input .docx file
        input: PathBuf,

        /// Renumber references when citations are out of sequence
        #[arg(long)]
        renumber: bool,

        /// Write the renumbered document to FILE (default: renumbered_<input>)
        #[arg(short = 'o', long, requires = "renumber", conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Overwrite the input when renumbering
        #[arg(long, requires = "renumber")]
        in_place: bool,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Configuration file (default: _refcheck.yml next to the input or above)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Character style marking citations
        #[arg(long)]
        citation_style: Option<String>,

        /// Paragraph style of bibliography entries
        #[arg(long)]
        entry_style: Option<String>,

        /// Character style of bibliography labels
        #[arg(long)]
        label_style: Option<String>,

        /// Exit with status 2 unless the final report is clean
        #[arg(long)]
        strict: bool,
    },

    /// Show the numbers extracted from a citation text
    Numbers {
        /// Citation text, e.g. "[2, 5-7]"
        text: String,

        /// Widest range still expanded
        #[arg(long)]
        max_range_span: Option<u64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refcheck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            input,
            renumber,
            output,
            in_place,
            format,
            config,
            citation_style,
            entry_style,
            label_style,
            strict,
        } => commands::validate::execute(commands::validate::ValidateArgs {
            input,
            renumber,
            output,
            in_place,
            format,
            config,
            citation_style,
            entry_style,
            label_style,
            strict,
        }),
        Commands::Numbers {
            text,
            max_range_span,
            format,
        } => {
            commands::numbers::execute(&text, max_range_span, format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
