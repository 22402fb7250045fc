//! Nginx `error.log` parser.
//!
//! `2024/03/15 12:34:56 [error] 1234#1234: *99 upstream timed out, client: 10.0.0.5`

use super::{DraftEntry, ParseError};
use crate::models::{LogFormat, LogLevel};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static NGINX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}) \[([^\]]+)\] (\d+)#(\d+): (?:\*(\d+) )?(.*)",
    )
    .expect("nginx pattern is valid")
});

static CLIENT_IP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"client: (\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})").expect("client ip pattern is valid")
});

pub(crate) fn matches(line: &str) -> bool {
    NGINX_RE.is_match(line)
}

pub(crate) fn parse(line: &str, _now: DateTime<Utc>) -> Result<DraftEntry, ParseError> {
    let caps = NGINX_RE.captures(line).ok_or_else(|| {
        ParseError::malformed(LogFormat::NginxError, "line does not match nginx error layout")
    })?;

    let timestamp = NaiveDateTime::parse_from_str(&caps[1], "%Y/%m/%d %H:%M:%S")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| {
            ParseError::malformed(
                LogFormat::NginxError,
                format!("invalid timestamp '{}': {e}", &caps[1]),
            )
        })?;

    let original_level = caps[2].to_string();
    let message = caps[6].to_string();

    let mut meta = Map::new();
    meta.insert("pid".to_string(), Value::String(caps[3].to_string()));
    meta.insert("thread_id".to_string(), Value::String(caps[4].to_string()));
    meta.insert(
        "connection_id".to_string(),
        caps.get(5)
            .map_or(Value::Null, |m| Value::String(m.as_str().to_string())),
    );
    if let Some(client) = CLIENT_IP_RE.captures(&message) {
        meta.insert("client_ip".to_string(), Value::String(client[1].to_string()));
    }

    Ok(DraftEntry {
        format: LogFormat::NginxError,
        timestamp,
        level: LogLevel::passthrough(&original_level),
        original_level,
        service: "nginx".to_string(),
        message,
        meta,
    })
}
