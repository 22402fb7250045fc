//! LogLens Shared Library
//!
//! This crate contains the log-format detection, parsing, normalization and
//! query logic used by the LogLens API server and CLI.
//!
//! # Modules
//!
//! - [`models`] - Normalized log entries, levels, formats and metadata
//! - [`parser`] - Format classification and per-format line parsers
//! - [`ingest`] - Batch ingestion with metadata flattening
//! - [`storage`] - Tenant-scoped storage traits and implementations
//! - [`query`] - Filtering, search and pagination
//!
//! # Example
//!
//! ```
//! use shared::ingest::IngestionPipeline;
//! use shared::models::{LogLevel, TenantId};
//!
//! let pipeline = IngestionPipeline::new(TenantId::new("acme"), "error.log");
//! let outcome = pipeline.ingest_text(
//!     "2024/03/15 12:34:56 [error] 1234#1234: *99 Something broke, client: 10.0.0.5",
//! );
//!
//! let entry = &outcome.entries[0];
//! assert_eq!(entry.level, LogLevel::Error);
//! assert_eq!(entry.service, "nginx");
//! assert!(entry.validate_entry().is_ok());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ingest;
pub mod models;
pub mod parser;
pub mod query;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
