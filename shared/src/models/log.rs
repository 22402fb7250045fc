//! Log data model.
//!
//! Defines the canonical `LogEntry` structure every ingested line is normalized into.

use super::meta::{MetaValue, Metadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Log severity level.
///
/// Recognized aliases fold onto the five canonical levels. Levels that are
/// passed through without folding (nginx severities such as `crit`) are kept
/// lower-cased in [`LogLevel::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// Informational messages.
    #[default]
    Info,
    /// Warning conditions.
    Warn,
    /// Error conditions.
    Error,
    /// Critical/fatal conditions.
    Critical,
    /// A lower-cased level token outside the canonical set.
    Other(String),
}

impl LogLevel {
    /// Normalizes a raw level string, folding known aliases.
    ///
    /// # Example
    ///
    /// ```
    /// use shared::models::LogLevel;
    ///
    /// assert_eq!(LogLevel::from_alias("WARNING"), LogLevel::Warn);
    /// assert_eq!(LogLevel::from_alias("emerg"), LogLevel::Critical);
    /// assert_eq!(LogLevel::from_alias("Verbose").as_str(), "verbose");
    /// ```
    #[must_use]
    pub fn from_alias(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        match lowered.as_str() {
            "trace" | "debug" => Self::Debug,
            "info" | "information" | "notice" => Self::Info,
            "warn" | "warning" => Self::Warn,
            "error" | "err" => Self::Error,
            "critical" | "crit" | "fatal" | "alert" | "emerg" | "emergency" | "panic" => {
                Self::Critical
            }
            _ => Self::Other(lowered),
        }
    }

    /// Lower-cases a raw level without folding aliases.
    ///
    /// Canonical names still map to their variants, so `"ERROR"` becomes
    /// [`LogLevel::Error`] while `"crit"` stays `Other("crit")`.
    #[must_use]
    pub fn passthrough(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        match lowered.as_str() {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" => Self::Warn,
            "error" => Self::Error,
            "critical" => Self::Critical,
            _ => Self::Other(lowered),
        }
    }

    /// Returns the lower-case name of the level.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LogLevel {
    fn from(value: String) -> Self {
        Self::passthrough(&value)
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

/// Wire format a log entry was detected in (or declared as).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON document per line.
    JsonLines,
    /// BSD-style syslog.
    Syslog,
    /// Nginx `error.log`.
    NginxError,
    /// Common Log Format access log.
    Clf,
}

impl LogFormat {
    /// All formats in classification priority order.
    pub const ALL: [Self; 4] = [Self::JsonLines, Self::Syslog, Self::NginxError, Self::Clf];

    /// Returns the wire name of the format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JsonLines => "json_lines",
            Self::Syslog => "syslog",
            Self::NginxError => "nginx_error",
            Self::Clf => "clf",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known [`LogFormat`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log format '{0}'")]
pub struct UnknownFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Identifier of the organization owning a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A normalized log entry that has not been stored yet.
///
/// The store assigns the identifier; see [`NewLogEntry::into_entry`].
///
/// # Example
///
/// ```
/// use shared::models::{LogFormat, LogLevel, NewLogEntry, TenantId};
///
/// let entry = NewLogEntry::new(TenantId::new("acme"), LogFormat::Syslog, "User logged in", "sshd")
///     .with_level(LogLevel::Warn)
///     .with_meta("host", "web-1");
///
/// assert_eq!(entry.original_level, "warn");
/// assert!(entry.validate_entry().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewLogEntry {
    /// Timestamp when the log event occurred.
    pub timestamp: DateTime<Utc>,

    /// Normalized severity level.
    pub level: LogLevel,

    /// Level string as it appeared before normalization.
    pub original_level: String,

    /// Name of the service that generated the log.
    #[validate(custom(function = "not_blank", message = "Service name cannot be empty"))]
    pub service: String,

    /// The log message content.
    pub message: String,

    /// Source format of the entry.
    pub format: LogFormat,

    /// Flattened metadata.
    #[serde(default)]
    pub meta: Metadata,

    /// Owning organization.
    pub tenant_id: TenantId,
}

/// A stored log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Store-assigned identifier.
    pub id: Uuid,

    /// Timestamp when the log event occurred.
    pub timestamp: DateTime<Utc>,

    /// Normalized severity level.
    pub level: LogLevel,

    /// Level string as it appeared before normalization.
    pub original_level: String,

    /// Name of the service that generated the log.
    pub service: String,

    /// The log message content.
    pub message: String,

    /// Source format of the entry.
    pub format: LogFormat,

    /// Flattened metadata.
    #[serde(default)]
    pub meta: Metadata,

    /// Owning organization.
    pub tenant_id: TenantId,
}

/// Errors that can occur during log entry validation.
///
/// Wraps every field that failed, so callers can report them together.
#[derive(Debug, Error)]
#[error("Validation failed: {}", describe(.0))]
pub struct LogValidationError(#[from] ValidationErrors);

impl LogValidationError {
    /// Failing fields with their messages, ordered by field name.
    #[must_use]
    pub fn field_errors(&self) -> Vec<(String, String)> {
        sorted_fields(&self.0)
    }
}

fn sorted_fields(errors: &ValidationErrors) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| {
                let message = failure
                    .message
                    .as_ref()
                    .map_or_else(|| failure.code.to_string(), ToString::to_string);
                (field.to_string(), message)
            })
        })
        .collect();
    fields.sort();
    fields
}

fn describe(errors: &ValidationErrors) -> String {
    sorted_fields(errors)
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

fn blank_message() -> ValidationError {
    ValidationError::new("blank").with_message(Cow::Borrowed("Log message cannot be empty"))
}

impl NewLogEntry {
    /// Creates a new info-level entry stamped with the current time.
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        format: LogFormat,
        message: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        let level = LogLevel::Info;
        Self {
            timestamp: Utc::now(),
            original_level: level.to_string(),
            level,
            service: service.into(),
            message: message.into(),
            format,
            meta: Metadata::new(),
            tenant_id,
        }
    }

    /// Sets the level, recording it as the original level as well.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.original_level = level.to_string();
        self.level = level;
        self
    }

    /// Overrides the original (pre-normalization) level string.
    #[must_use]
    pub fn with_original_level(mut self, original_level: impl Into<String>) -> Self {
        self.original_level = original_level.into();
        self
    }

    /// Sets the event timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Adds a single metadata field.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Replaces the metadata map.
    #[must_use]
    pub fn with_metadata(mut self, meta: Metadata) -> Self {
        self.meta = meta;
        self
    }

    /// Validates fields every entry must carry.
    ///
    /// # Errors
    ///
    /// Returns an error if the service name is blank.
    pub fn validate_entry(&self) -> Result<(), LogValidationError> {
        self.validate()?;
        Ok(())
    }

    /// Validates an entry submitted directly by a client, which must also
    /// carry a message.
    ///
    /// # Errors
    ///
    /// Returns an error naming every blank field among message and service.
    pub fn validate_manual(&self) -> Result<(), LogValidationError> {
        let mut errors = self.validate().err().unwrap_or_default();
        if not_blank(&self.message).is_err() {
            errors.add("message", blank_message());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }

    /// Turns the draft into a stored entry with the given identifier.
    #[must_use]
    pub fn into_entry(self, id: Uuid) -> LogEntry {
        LogEntry {
            id,
            timestamp: self.timestamp,
            level: self.level,
            original_level: self.original_level,
            service: self.service,
            message: self.message,
            format: self.format,
            meta: self.meta,
            tenant_id: self.tenant_id,
        }
    }
}

/// Partial update of a stored entry.
///
/// Only these fields are mutable; the timestamp and tenant never change.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct LogEntryPatch {
    /// New level.
    pub level: Option<LogLevel>,
    /// New original level string.
    pub original_level: Option<String>,
    /// New service name.
    #[validate(custom(function = "not_blank", message = "Service name cannot be empty"))]
    pub service: Option<String>,
    /// New message.
    #[validate(custom(function = "not_blank", message = "Log message cannot be empty"))]
    pub message: Option<String>,
    /// New format.
    pub format: Option<LogFormat>,
    /// Replacement metadata.
    pub meta: Option<Metadata>,
}

impl LogEntryPatch {
    /// Returns true when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.original_level.is_none()
            && self.service.is_none()
            && self.message.is_none()
            && self.format.is_none()
            && self.meta.is_none()
    }

    /// Checks the patch would not break entry invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch blanks the service name or message.
    pub fn validate_patch(&self) -> Result<(), LogValidationError> {
        self.validate()?;
        Ok(())
    }
}

impl LogEntry {
    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: LogEntryPatch) {
        if let Some(level) = patch.level {
            self.level = level;
        }
        if let Some(original_level) = patch.original_level {
            self.original_level = original_level;
        }
        if let Some(service) = patch.service {
            self.service = service;
        }
        if let Some(message) = patch.message {
            self.message = message;
        }
        if let Some(format) = patch.format {
            self.format = format;
        }
        if let Some(meta) = patch.meta {
            self.meta = meta;
        }
    }
}
