//! Scenario record normalizer: one loosely-shaped record into the storage schema.
//!
//! Records accumulated legacy field names over several exports
//! (`blocklistedWords`, `guidelines`, top-level `source`/`orders`/...).
//! Normalization migrates them to canonical names/locations, canonicalizes
//! the list fields, and rebuilds `notes`. Applying it twice yields the same
//! record as applying it once.

use serde_json::{Map, Value};

use crate::coerce::unique_trimmed_string_array;
use crate::notes::normalize_notes_value;

/// Legacy top-level keys folded into `rightPanel`, applied in order.
/// The camelCase spelling outranks the snake_case one when both exist.
const RIGHT_PANEL_ALIASES: [(&str, &str); 5] = [
    ("source", "source"),
    ("browsingHistory", "browsingHistory"),
    ("browsing_history", "browsingHistory"),
    ("orders", "orders"),
    ("templatesUsed", "templates"),
];

/// String-array fields: canonical snake_case key and its legacy camelCase alias.
const LIST_FIELD_ALIASES: [(&str, &str); 2] = [
    ("blocklisted_words", "blocklistedWords"),
    ("escalation_preferences", "escalationPreferences"),
];

/// Normalize a scenario record into the storage schema.
///
/// Non-object input yields an empty record. Legacy top-level keys are always
/// removed; their values move into `rightPanel` only when the canonical key
/// is absent there (`rightPanel` wins on conflict). Unrecognized fields pass
/// through untouched so shallow merge can see them later.
pub fn normalize_scenario(scenario: &Value) -> Value {
    let Some(source) = scenario.as_object() else {
        return Value::Object(Map::new());
    };
    let mut out = source.clone();

    let mut right_panel = match out.get("rightPanel") {
        Some(Value::Object(panel)) => panel.clone(),
        _ => Map::new(),
    };
    for (legacy, canonical) in RIGHT_PANEL_ALIASES {
        if let Some(value) = out.shift_remove(legacy) {
            right_panel.entry(canonical.to_string()).or_insert(value);
        }
    }
    if !right_panel.is_empty() {
        out.insert("rightPanel".to_string(), Value::Object(right_panel));
    }

    for (canonical, legacy) in LIST_FIELD_ALIASES {
        let value = out
            .get(canonical)
            .or_else(|| out.get(legacy))
            .cloned()
            .unwrap_or(Value::Null);
        let items = unique_trimmed_string_array(&value);
        out.insert(
            canonical.to_string(),
            Value::Array(items.into_iter().map(Value::String).collect()),
        );
        out.shift_remove(legacy);
    }

    let notes_value = out.get("notes").or_else(|| out.get("guidelines")).cloned();
    out.insert(
        "notes".to_string(),
        Value::Object(normalize_notes_value(notes_value.as_ref())),
    );
    out.shift_remove("guidelines");

    Value::Object(out)
}
