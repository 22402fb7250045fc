//! Flat log metadata.
//!
//! Metadata attached to a stored log entry is always one level deep: values are
//! scalars or arrays, never nested objects. Nested structures are collapsed by
//! [`crate::ingest::flatten`] before they reach a [`MetaValue`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Flat metadata map keyed by field name.
pub type Metadata = BTreeMap<String, MetaValue>;

/// A single metadata value.
///
/// Serializes to the plain JSON value it wraps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Explicitly absent value (e.g. a syslog line without a pid).
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(serde_json::Number),
    /// String value.
    String(String),
    /// Array value, copied through unchanged.
    Array(Vec<Value>),
}

impl MetaValue {
    /// Converts a JSON value into a metadata value.
    ///
    /// Returns `None` for objects, which must be flattened instead.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => Some(Self::Number(n)),
            Value::String(s) => Some(Self::String(s)),
            Value::Array(items) => Some(Self::Array(items)),
            Value::Object(_) => None,
        }
    }

    /// Returns true if this value is [`MetaValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Renders a JSON value the way tag matching compares it: strings verbatim,
/// arrays as comma-joined elements, everything else via its JSON text.
fn render_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_json).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Array(items) => {
                let rendered: Vec<String> = items.iter().map(render_json).collect();
                write!(f, "{}", rendered.join(","))
            }
        }
    }
}

impl From<MetaValue> for Value {
    fn from(value: MetaValue) -> Self {
        match value {
            MetaValue::Null => Value::Null,
            MetaValue::Bool(b) => Value::Bool(b),
            MetaValue::Number(n) => Value::Number(n),
            MetaValue::String(s) => Value::String(s),
            MetaValue::Array(items) => Value::Array(items),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for MetaValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<usize> for MetaValue {
    fn from(value: usize) -> Self {
        Self::Number(serde_json::Number::from(value as u64))
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl<T: Into<MetaValue>> From<Option<T>> for MetaValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
