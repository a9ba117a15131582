//! Structural coercion: flatten arbitrary JSON shapes into clean string arrays.
//!
//! Imported records store list-ish fields as arrays, objects, or bare scalars
//! depending on which export produced them. Coercion makes them uniform:
//! normalized, trimmed, with empty-container leftovers dropped.

use std::collections::HashSet;

use serde_json::Value;

use crate::text::value_text;

/// Serialized empty containers that survive stringification but carry no data.
const NOISE_VALUES: [&str; 2] = ["{}", "[]"];

/// Coerce any JSON value into an ordered array of non-empty strings.
///
/// Arrays iterate elements, objects iterate values, scalars become a single
/// entry, null becomes nothing. Order is preserved and duplicates are kept;
/// use [`unique_trimmed_string_array`] when dedup is wanted.
pub fn to_string_array(value: &Value) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Value::Null => return Vec::new(),
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        other => vec![other],
    };

    let mut out = Vec::new();
    for item in items {
        let text = value_text(item).trim().to_string();
        if !text.is_empty() && !NOISE_VALUES.contains(&text.as_str()) {
            out.push(text);
        }
    }
    out
}

/// Deduplicate trimmed strings by case-insensitive key, first occurrence wins.
pub fn unique_trimmed(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for item in items {
        let text = item.trim().to_string();
        if text.is_empty() {
            continue;
        }
        if seen.insert(text.to_lowercase()) {
            result.push(text);
        }
    }
    result
}

/// [`to_string_array`] followed by case-insensitive dedup.
pub fn unique_trimmed_string_array(value: &Value) -> Vec<String> {
    unique_trimmed(to_string_array(value))
}
