//! Data models for LogLens.
//!
//! This module contains the canonical log entry and its metadata types.

pub mod log;
pub mod meta;

pub use log::{
    LogEntry, LogEntryPatch, LogFormat, LogLevel, LogValidationError, NewLogEntry, TenantId,
    UnknownFormat,
};
pub use meta::{MetaValue, Metadata};
