//! Common Log Format parser.
//!
//! `127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326`

use super::{DraftEntry, ParseError};
use crate::models::{LogFormat, LogLevel};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static CLF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\S+) (\S+) (\S+) \[([\w:/]+\s[+\-]\d{4})\] "([^"]*)" (\d{3}) (\d+)$"#)
        .expect("clf pattern is valid")
});

pub(crate) fn matches(line: &str) -> bool {
    CLF_RE.is_match(line)
}

/// Maps an HTTP status onto a log level.
#[must_use]
pub fn level_for_status(status: u16) -> LogLevel {
    match status {
        500.. => LogLevel::Error,
        400..=499 => LogLevel::Warn,
        _ => LogLevel::Info,
    }
}

fn optional_field(raw: &str) -> Value {
    if raw == "-" {
        Value::Null
    } else {
        Value::String(raw.to_string())
    }
}

pub(crate) fn parse(line: &str, _now: DateTime<Utc>) -> Result<DraftEntry, ParseError> {
    let caps = CLF_RE.captures(line).ok_or_else(|| {
        ParseError::malformed(LogFormat::Clf, "line does not match common log format")
    })?;

    let timestamp = DateTime::parse_from_str(&caps[4], "%d/%b/%Y:%H:%M:%S %z")
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            ParseError::malformed(LogFormat::Clf, format!("invalid timestamp '{}': {e}", &caps[4]))
        })?;

    let mut request = caps[5].split_whitespace();
    let (Some(method), Some(path)) = (request.next(), request.next()) else {
        return Err(ParseError::malformed(
            LogFormat::Clf,
            format!("malformed request line '{}'", &caps[5]),
        ));
    };
    let protocol = request.next();

    let status: u16 = caps[6]
        .parse()
        .map_err(|_| ParseError::malformed(LogFormat::Clf, format!("invalid status '{}'", &caps[6])))?;
    // Sizes past u64 keep their digits rather than failing the line.
    let size = caps[7]
        .parse::<u64>()
        .map_or_else(|_| Value::String(caps[7].to_string()), Value::from);

    let level = level_for_status(status);

    let mut meta = Map::new();
    meta.insert("ip".to_string(), Value::String(caps[1].to_string()));
    meta.insert("ident".to_string(), optional_field(&caps[2]));
    meta.insert("user".to_string(), optional_field(&caps[3]));
    meta.insert("status".to_string(), Value::from(status));
    meta.insert("size".to_string(), size);
    meta.insert("method".to_string(), Value::String(method.to_string()));
    meta.insert("path".to_string(), Value::String(path.to_string()));
    meta.insert(
        "protocol".to_string(),
        protocol.map_or(Value::Null, |p| Value::String(p.to_string())),
    );

    Ok(DraftEntry {
        format: LogFormat::Clf,
        timestamp,
        original_level: level.to_string(),
        level,
        service: "http".to_string(),
        message: format!("{method} {path} {status}"),
        meta,
    })
}
