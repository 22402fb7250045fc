//! LogLens CLI
//!
//! Command-line interface for classifying and normalizing log files offline,
//! using the same pipeline as the LogLens API server.
//!
//! # Usage
//!
//! ```bash
//! loglens --help
//! loglens classify 'Mar 15 12:34:56 web-1 sshd[42]: accepted'
//! loglens parse /var/log/nginx/error.log --output json
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use shared::ingest::{IngestOutcome, IngestionPipeline};
use shared::models::TenantId;
use shared::parser::classify;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// LogLens CLI - log format detection and normalization
#[derive(Parser)]
#[command(name = "loglens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the detected format of a single log line
    Classify {
        /// The raw log line
        line: String,
    },
    /// Normalize every line of a log file
    Parse {
        /// Path to the log file
        file: PathBuf,

        /// Tenant recorded on the produced entries
        #[arg(short, long, env = "LOGLENS_TENANT", default_value = "local")]
        tenant: String,

        /// What to print
        #[arg(short, long, value_enum, default_value_t = Output::Summary)]
        output: Output,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Line, entry and error counts
    Summary,
    /// One JSON object per normalized entry
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Some(Commands::Classify { line }) => {
            writeln!(out, "{}", classification(&line))?;
        }
        Some(Commands::Parse {
            file,
            tenant,
            output,
        }) => {
            let outcome = parse_file(&file, TenantId::new(tenant))?;
            render(&outcome, output, &mut out)?;
        }
        None => {
            writeln!(out, "LogLens CLI v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "Use --help for usage information")?;
        }
    }

    Ok(())
}

fn classification(line: &str) -> &'static str {
    classify(line).map_or("unrecognized", |format| format.as_str())
}

fn parse_file(path: &Path, tenant: TenantId) -> Result<IngestOutcome> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("{} is not UTF-8 text", path.display()))?;

    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    tracing::debug!(file = %path.display(), bytes = text.len(), "Parsing log file");
    Ok(IngestionPipeline::new(tenant, file_name).ingest_text(&text))
}

fn render(outcome: &IngestOutcome, output: Output, out: &mut impl Write) -> Result<()> {
    match output {
        Output::Summary => {
            let stats = outcome.stats;
            writeln!(out, "total_lines: {}", stats.total_lines)?;
            writeln!(out, "parsed_logs: {}", stats.parsed_logs)?;
            writeln!(out, "error_count: {}", stats.error_count)?;
        }
        Output::Json => {
            for entry in &outcome.entries {
                serde_json::to_writer(&mut *out, entry)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
