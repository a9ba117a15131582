//! Best-effort parser for list-like text blobs found in spreadsheet cells.
//!
//! Vendors export list columns as strict JSON (`["a"]`), Python-literal text
//! (`['a', "b"]`), or loose comma/newline blobs, sometimes bracket-wrapped.
//! Strategies are tried in order; the first that produces a shape wins.

use std::sync::OnceLock;

use regex::Regex;

use crate::coerce::to_string_array;
use crate::text::{normalize_text, parse_json_text};

// Compile-once regex patterns via OnceLock.
fn re_quoted() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"'([^']*)'|"([^"]*)""#).unwrap())
}

fn re_separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,\n\r]+").unwrap())
}

/// Parse loosely list-like text into an ordered list of strings.
///
/// Order of attempts:
/// 1. blank or `[]` → empty
/// 2. strict JSON, coerced through [`to_string_array`]
/// 3. quoted substrings anywhere in the text, in order
/// 4. strip one wrapping bracket pair, split on commas/newlines
///
/// Never fails; worst case is an empty result.
pub fn parse_list_like(text: &str) -> Vec<String> {
    let normalized = normalize_text(text);
    let raw = normalized.trim();
    if raw.is_empty() || raw == "[]" {
        return Vec::new();
    }

    // JSON null parses but carries nothing; let looser strategies try.
    if let Some(parsed) = parse_json_text(raw) {
        if !parsed.is_null() {
            return to_string_array(&parsed);
        }
    }

    let mut matched_quotes = false;
    let mut quoted = Vec::new();
    for caps in re_quoted().captures_iter(raw) {
        matched_quotes = true;
        let val = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or("");
        if !val.is_empty() {
            quoted.push(val.to_string());
        }
    }
    if matched_quotes {
        return quoted;
    }

    let fallback = raw.strip_prefix('[').unwrap_or(raw);
    let fallback = fallback.strip_suffix(']').unwrap_or(fallback);
    if fallback.trim().is_empty() {
        return Vec::new();
    }
    re_separators()
        .split(fallback)
        .map(|part| part.trim_matches([' ', '"', '\'']).to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
