//! BSD syslog parser.
//!
//! `Mar 15 12:34:56 web-1 sshd[4211]: error: connection reset`

use super::{DraftEntry, ParseError};
use crate::models::{LogFormat, LogLevel};
use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static SYSLOG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([A-Z][a-z]{2})\s+(\d{1,2})\s+(\d{2}:\d{2}:\d{2})\s+(\S+)\s+([^:\[]+)(?:\[(\d+)\])?:\s+(.*)",
    )
    .expect("syslog pattern is valid")
});

static LEVEL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(debug|info|notice|warning|warn|error|err|crit|alert|emerg):")
        .expect("syslog level pattern is valid")
});

pub(crate) fn matches(line: &str) -> bool {
    SYSLOG_RE.is_match(line)
}

pub(crate) fn parse(line: &str, now: DateTime<Utc>) -> Result<DraftEntry, ParseError> {
    let caps = SYSLOG_RE
        .captures(line)
        .ok_or_else(|| ParseError::malformed(LogFormat::Syslog, "line does not match syslog layout"))?;

    // Syslog omits the year; assume the current one.
    let stamp = format!("{} {} {} {}", &caps[1], &caps[2], &caps[3], now.year());
    let timestamp = NaiveDateTime::parse_from_str(&stamp, "%b %d %H:%M:%S %Y")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| {
            ParseError::malformed(LogFormat::Syslog, format!("invalid timestamp '{stamp}': {e}"))
        })?;

    let host = caps[4].to_string();
    let service = caps[5].trim().to_string();
    let pid = caps.get(6).map(|m| m.as_str().to_string());
    let message = caps[7].to_string();

    let original_level = LEVEL_PREFIX_RE
        .captures(&message)
        .map_or_else(|| "info".to_string(), |c| c[1].to_string());

    let mut meta = Map::new();
    meta.insert("host".to_string(), Value::String(host));
    meta.insert("pid".to_string(), pid.map_or(Value::Null, Value::String));

    Ok(DraftEntry {
        format: LogFormat::Syslog,
        timestamp,
        level: LogLevel::from_alias(&original_level),
        original_level,
        service,
        message,
        meta,
    })
}
