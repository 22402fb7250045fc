//! JSON-Lines parser.

use super::timestamp::timestamp_from_json;
use super::{DraftEntry, ParseError};
use crate::models::{LogFormat, LogLevel};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

const TIMESTAMP_KEYS: [&str; 3] = ["timestamp", "time", "@timestamp"];
const LEVEL_KEYS: [&str; 2] = ["level", "severity"];
const SERVICE_KEYS: [&str; 3] = ["service", "application", "app"];
const MESSAGE_KEYS: [&str; 2] = ["message", "msg"];

/// Returns true if the line is a syntactically valid JSON value.
pub(crate) fn matches(line: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(line).is_ok()
}

/// Removes every key in `keys` from `fields`, returning the first one that
/// held a usable value. `null` and `""` count as missing.
fn take_first(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        if let Some(value) = fields.remove(*key) {
            let usable = match &value {
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                _ => true,
            };
            if usable && found.is_none() {
                found = Some(value);
            }
        }
    }
    found
}

fn text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

pub(crate) fn parse(line: &str, now: DateTime<Utc>) -> Result<DraftEntry, ParseError> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| ParseError::malformed(LogFormat::JsonLines, e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(ParseError::malformed(
            LogFormat::JsonLines,
            "expected a JSON object",
        ));
    };

    let timestamp = take_first(&mut fields, &TIMESTAMP_KEYS)
        .as_ref()
        .and_then(timestamp_from_json)
        .unwrap_or(now);
    let original_level = take_first(&mut fields, &LEVEL_KEYS).map_or_else(|| "info".to_string(), text);
    let service = take_first(&mut fields, &SERVICE_KEYS).map_or_else(|| "unknown".to_string(), text);
    let message = take_first(&mut fields, &MESSAGE_KEYS).map(text).unwrap_or_default();

    Ok(DraftEntry {
        format: LogFormat::JsonLines,
        timestamp,
        level: LogLevel::from_alias(&original_level),
        original_level,
        service,
        message,
        meta: fields,
    })
}
