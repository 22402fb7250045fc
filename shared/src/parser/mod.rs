//! Log format detection and parsing.
//!
//! Raw lines are classified against an ordered table of format rules; the first
//! rule whose grammar accepts the line wins and its parser produces a
//! [`DraftEntry`]. Priority order is JSON-Lines, syslog, nginx error log, then
//! Common Log Format.
//!
//! # Example
//!
//! ```
//! use shared::models::{LogFormat, LogLevel};
//! use shared::parser::{classify, parse_line};
//!
//! let line = r#"127.0.0.1 - - [15/Mar/2024:12:00:00 +0000] "GET /health HTTP/1.1" 503 12"#;
//! assert_eq!(classify(line), Some(LogFormat::Clf));
//!
//! let draft = parse_line(line, chrono::Utc::now()).unwrap();
//! assert_eq!(draft.level, LogLevel::Error);
//! assert_eq!(draft.message, "GET /health 503");
//! ```

mod clf;
mod json_lines;
mod nginx;
mod syslog;
mod timestamp;

pub use clf::level_for_status;
pub use timestamp::parse_timestamp;

use crate::models::{LogFormat, LogLevel};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Parser output before metadata flattening.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftEntry {
    /// Detected format.
    pub format: LogFormat,
    /// Event time, or the parse time when the line carried none.
    pub timestamp: DateTime<Utc>,
    /// Normalized level.
    pub level: LogLevel,
    /// Level token as found in the line.
    pub original_level: String,
    /// Source service.
    pub service: String,
    /// Message body.
    pub message: String,
    /// Metadata, possibly nested.
    pub meta: Map<String, Value>,
}

/// Errors raised while classifying or parsing a single line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No known grammar accepts the line.
    #[error("unrecognized log format")]
    UnrecognizedFormat,

    /// The line has the outer shape of a format but its fields could not be extracted.
    #[error("malformed {format} line: {reason}")]
    Malformed {
        /// Format whose grammar matched.
        format: LogFormat,
        /// What went wrong.
        reason: String,
    },
}

impl ParseError {
    pub(crate) fn malformed(format: LogFormat, reason: impl Into<String>) -> Self {
        Self::Malformed {
            format,
            reason: reason.into(),
        }
    }
}

type ParseFn = fn(&str, DateTime<Utc>) -> Result<DraftEntry, ParseError>;

/// A format grammar paired with its parser.
struct FormatRule {
    format: LogFormat,
    matches: fn(&str) -> bool,
    parse: ParseFn,
}

/// Classification rules, highest priority first.
static RULES: [FormatRule; 4] = [
    FormatRule {
        format: LogFormat::JsonLines,
        matches: json_lines::matches,
        parse: json_lines::parse,
    },
    FormatRule {
        format: LogFormat::Syslog,
        matches: syslog::matches,
        parse: syslog::parse,
    },
    FormatRule {
        format: LogFormat::NginxError,
        matches: nginx::matches,
        parse: nginx::parse,
    },
    FormatRule {
        format: LogFormat::Clf,
        matches: clf::matches,
        parse: clf::parse,
    },
];

fn rule_for(line: &str) -> Option<&'static FormatRule> {
    RULES.iter().find(|rule| (rule.matches)(line))
}

/// Detects the format of a raw line, or `None` if no grammar accepts it.
#[must_use]
pub fn classify(line: &str) -> Option<LogFormat> {
    rule_for(line).map(|rule| rule.format)
}

/// Classifies and parses a raw line.
///
/// `now` stands in for timestamps the line does not carry (and supplies the
/// year for syslog).
///
/// # Errors
///
/// Returns [`ParseError::UnrecognizedFormat`] when no grammar matches and
/// [`ParseError::Malformed`] when the matching parser cannot extract its fields.
pub fn parse_line(line: &str, now: DateTime<Utc>) -> Result<DraftEntry, ParseError> {
    let rule = rule_for(line).ok_or(ParseError::UnrecognizedFormat)?;
    (rule.parse)(line, now)
}
