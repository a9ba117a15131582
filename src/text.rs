//! Text normalization primitives shared by every pipeline stage.
//!
//! Source records arrive from spreadsheets and hand-edited JSON, so string
//! fields routinely carry fullwidth characters, ligatures, and styled Unicode.
//! Everything is funneled through NFKC before comparison or storage.

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

/// NFKC-normalize a string. Total: never fails, empty in → empty out.
pub fn normalize_text(value: &str) -> String {
    value.nfkc().collect()
}

/// Render any JSON value as normalized display text.
///
/// Null becomes the empty string; scalars render their natural form;
/// containers render as compact JSON (which lets downstream coercion drop
/// empty `{}` / `[]` leftovers).
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => normalize_text(s),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => normalize_text(&value.to_string()),
    }
}

/// Best-effort JSON parse of free text.
///
/// Returns `None` for blank input or malformed JSON instead of an error;
/// callers fall back to looser parsing strategies.
pub fn parse_json_text(text: &str) -> Option<Value> {
    let raw = text.trim();
    if raw.is_empty() {
        return None;
    }
    serde_json::from_str(raw).ok()
}
