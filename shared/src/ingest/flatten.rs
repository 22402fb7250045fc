//! Metadata flattening.
//!
//! Nested objects are merged into their parent level and the parent key is
//! dropped: `{"http": {"status": 500}}` becomes `{"status": 500}`. When two
//! paths end in the same key the one visited last wins. Keys are visited in
//! map order, so the result is deterministic for a given input.

use crate::models::{MetaValue, Metadata};
use serde_json::{Map, Value};

/// Flattens a nested key/value structure into a flat [`Metadata`] map.
///
/// ```
/// use serde_json::json;
/// use shared::ingest::flatten;
///
/// let nested = json!({"env": "prod", "http": {"status": 500, "tags": ["a", "b"]}});
/// let flat = flatten(nested.as_object().unwrap().clone());
///
/// assert_eq!(flat.len(), 3);
/// assert!(flat.contains_key("status"));
/// assert!(!flat.contains_key("http"));
/// ```
#[must_use]
pub fn flatten(fields: Map<String, Value>) -> Metadata {
    let mut out = Metadata::new();
    flatten_into(fields, &mut out);
    out
}

fn flatten_into(fields: Map<String, Value>, out: &mut Metadata) {
    for (key, value) in fields {
        let flat = match value {
            Value::Object(nested) => {
                flatten_into(nested, out);
                continue;
            }
            Value::Null => MetaValue::Null,
            Value::Bool(b) => MetaValue::Bool(b),
            Value::Number(n) => MetaValue::Number(n),
            Value::String(s) => MetaValue::String(s),
            Value::Array(items) => MetaValue::Array(items),
        };
        out.insert(key, flat);
    }
}

/// Converts flat metadata back into a JSON object.
#[must_use]
pub fn to_json_object(meta: &Metadata) -> Map<String, Value> {
    meta.iter()
        .map(|(key, value)| (key.clone(), Value::from(value.clone())))
        .collect()
}
