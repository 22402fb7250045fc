//! Batch ingestion of raw log lines.
//!
//! Every non-blank line is classified, parsed and flattened independently. A
//! line that cannot be parsed does not abort the batch: it is replaced by a
//! synthetic error entry describing the failure. Once all lines are processed
//! the whole batch is handed to the store in a single insert.
//!
//! # Example
//!
//! ```
//! use shared::ingest::IngestionPipeline;
//! use shared::models::TenantId;
//!
//! let pipeline = IngestionPipeline::new(TenantId::new("acme"), "app.log");
//! let outcome = pipeline.ingest_text(
//!     "{\"level\":\"warn\",\"msg\":\"disk\"}\n\nnot a log line\n",
//! );
//!
//! assert_eq!(outcome.stats.total_lines, 3);
//! assert_eq!(outcome.stats.parsed_logs, 2);
//! assert_eq!(outcome.stats.error_count, 1);
//! ```

mod flatten;

pub use flatten::{flatten, to_json_object};

use crate::models::{LogFormat, LogLevel, MetaValue, Metadata, NewLogEntry, TenantId};
use crate::parser::{parse_line, DraftEntry, ParseError};
use crate::storage::{LogStore, LogStoreError};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Service name stamped on synthetic error entries.
pub const PARSER_SERVICE: &str = "log-parser";

/// Counters describing one ingested batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Lines in the input, blank ones included.
    pub total_lines: usize,
    /// Entries produced, synthetic error entries included.
    pub parsed_logs: usize,
    /// Lines that could not be parsed.
    pub error_count: usize,
}

/// Entries and statistics produced from one batch.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Normalized entries in input order.
    pub entries: Vec<NewLogEntry>,
    /// Batch counters.
    pub stats: IngestStats,
}

/// Errors that abort a whole ingestion request.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The batch insert failed; nothing was committed.
    #[error("failed to store ingested entries: {0}")]
    Storage(#[from] LogStoreError),
}

enum LineResult {
    Parsed(NewLogEntry),
    Failed(NewLogEntry),
}

/// Drives classification, parsing and flattening over a batch of lines for
/// one tenant and one source file.
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    tenant_id: TenantId,
    file_name: String,
}

impl IngestionPipeline {
    /// Creates a pipeline for the given tenant and source file name.
    #[must_use]
    pub fn new(tenant_id: TenantId, file_name: impl Into<String>) -> Self {
        Self {
            tenant_id,
            file_name: file_name.into(),
        }
    }

    /// Tenant every produced entry is assigned to.
    #[must_use]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Splits `text` into lines (`\n` or `\r\n`) and ingests them.
    #[must_use]
    pub fn ingest_text(&self, text: &str) -> IngestOutcome {
        self.ingest(text.lines())
    }

    /// Ingests a sequence of lines, using the current time for any line
    /// without a timestamp.
    #[must_use]
    pub fn ingest<'a, I>(&self, lines: I) -> IngestOutcome
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.ingest_at(lines, Utc::now())
    }

    /// Ingests a sequence of lines with an explicit clock reading.
    #[must_use]
    pub fn ingest_at<'a, I>(&self, lines: I, now: DateTime<Utc>) -> IngestOutcome
    where
        I: IntoIterator<Item = &'a str>,
    {
        let lines: Vec<&str> = lines.into_iter().collect();
        let total_lines = lines.len();

        // Line numbers are bound before the parallel map; collect keeps input order.
        let results: Vec<LineResult> = lines
            .par_iter()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| self.process_line(index + 1, line, now))
            .collect();

        let mut entries = Vec::with_capacity(results.len());
        let mut error_count = 0;
        for result in results {
            match result {
                LineResult::Parsed(entry) => entries.push(entry),
                LineResult::Failed(entry) => {
                    error_count += 1;
                    entries.push(entry);
                }
            }
        }

        let stats = IngestStats {
            total_lines,
            parsed_logs: entries.len(),
            error_count,
        };

        tracing::info!(
            tenant = %self.tenant_id,
            file = %self.file_name,
            total_lines = stats.total_lines,
            parsed = stats.parsed_logs,
            errors = stats.error_count,
            "Ingested log batch"
        );

        IngestOutcome { entries, stats }
    }

    /// Ingests `lines` and stores every produced entry in one batch.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Storage`] if the batch insert fails.
    pub fn ingest_and_store<'a, I>(
        &self,
        store: &dyn LogStore,
        lines: I,
    ) -> Result<IngestStats, IngestError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let outcome = self.ingest(lines);
        store.insert_many(outcome.entries).map_err(|e| {
            tracing::error!(tenant = %self.tenant_id, error = %e, "Failed to store log batch");
            IngestError::Storage(e)
        })?;
        Ok(outcome.stats)
    }

    fn process_line(&self, line_number: usize, line: &str, now: DateTime<Utc>) -> LineResult {
        match parse_line(line, now) {
            Ok(draft) => LineResult::Parsed(self.entry_from_draft(draft)),
            Err(error) => {
                tracing::debug!(
                    file = %self.file_name,
                    line_number,
                    error = %error,
                    "Failed to parse log line"
                );
                LineResult::Failed(self.synthetic_error(line_number, line, &error, now))
            }
        }
    }

    fn entry_from_draft(&self, draft: DraftEntry) -> NewLogEntry {
        let service = if draft.service.is_empty() {
            "unknown".to_string()
        } else {
            draft.service
        };

        NewLogEntry {
            timestamp: draft.timestamp,
            level: draft.level,
            original_level: draft.original_level,
            service,
            message: draft.message,
            format: draft.format,
            meta: flatten(draft.meta),
            tenant_id: self.tenant_id.clone(),
        }
    }

    fn synthetic_error(
        &self,
        line_number: usize,
        line: &str,
        error: &ParseError,
        now: DateTime<Utc>,
    ) -> NewLogEntry {
        let mut meta = Metadata::new();
        meta.insert("original_line".to_string(), MetaValue::from(line));
        meta.insert("line_number".to_string(), MetaValue::from(line_number));
        meta.insert(
            "file_name".to_string(),
            MetaValue::from(self.file_name.as_str()),
        );

        NewLogEntry::new(
            self.tenant_id.clone(),
            LogFormat::JsonLines,
            format!("Failed to parse line {line_number}: {error}"),
            PARSER_SERVICE,
        )
        .with_level(LogLevel::Error)
        .with_timestamp(now)
        .with_metadata(meta)
    }
}
