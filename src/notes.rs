//! Notes normalizer: raw guideline text/blocks into categorized bullet lists.
//!
//! Two entry points share the heading categorizer:
//! - [`notes_from_freeform_text`] splits a raw text blob on line breaks,
//!   `# Heading` lines switching the active category.
//! - [`notes_from_structured`] walks a heading→value mapping, honoring
//!   inline `# Heading` redirect markers and rerouting CS-handoff phrases
//!   out of `important`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::categorize::{categorize_heading, DEFAULT_CATEGORY};
use crate::coerce::{to_string_array, unique_trimmed_string_array};
use crate::text::normalize_text;

const SEND_TO_CS: &str = "send_to_cs";

/// An entry that is nothing but bold markers carries no content.
const EMPTY_BOLD: &str = "**";

// Entry shaped like "**# Heading**" / "# Heading": a category redirect, not content.
fn re_heading_redirect() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*{0,2}\s*#\s*(.+)$").unwrap())
}

// Phrases that mark an "important" entry as a CS-handoff instruction.
fn re_cs_trigger() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)send\s*to\s*cs|cssupport@|post-purchase|shipping inquiries on a current order")
            .unwrap()
    })
}

/// True if any character falls in the Mathematical Alphanumeric Symbols block
/// (U+1D400–U+1D7FF), i.e. styled "bold/italic" lettering pasted from docs.
pub fn has_styled_math_chars(text: &str) -> bool {
    text.chars()
        .any(|ch| ('\u{1D400}'..='\u{1D7FF}').contains(&ch))
}

/// Category buckets in first-seen order. Categories created by a heading
/// stay registered even while empty so redirects land somewhere stable;
/// empty buckets are dropped only at output time.
#[derive(Default)]
struct NoteBuckets {
    buckets: Vec<(String, Vec<String>)>,
}

impl NoteBuckets {
    fn ensure(&mut self, key: &str) {
        if !self.buckets.iter().any(|(k, _)| k == key) {
            self.buckets.push((key.to_string(), Vec::new()));
        }
    }

    fn push(&mut self, key: &str, item: String) {
        self.ensure(key);
        if let Some((_, items)) = self.buckets.iter_mut().find(|(k, _)| k == key) {
            items.push(item);
        }
    }

    /// Move CS-handoff phrases from `important` to `send_to_cs` and drop
    /// entries that are bare bold markers.
    fn reroute_cs_triggers(&mut self) {
        let Some(position) = self.buckets.iter().position(|(k, _)| k == DEFAULT_CATEGORY) else {
            return;
        };
        let entries = std::mem::take(&mut self.buckets[position].1);
        let mut keep = Vec::new();
        let mut moved = Vec::new();
        for entry in entries {
            let text = entry.trim().to_string();
            if re_cs_trigger().is_match(&text) {
                moved.push(text);
            } else if text != EMPTY_BOLD {
                keep.push(text);
            }
        }
        self.buckets[position].1 = keep;
        for entry in moved {
            self.push(SEND_TO_CS, entry);
        }
    }

    /// Finish into the storage shape: optional case-insensitive dedup per
    /// category, empty categories dropped, insertion order preserved.
    fn into_map(self, dedupe: bool) -> Map<String, Value> {
        let mut out = Map::new();
        for (key, items) in self.buckets {
            let items = if dedupe {
                // Same coercion as every other string-array field, so noise
                // entries ("{}", "[]") fall out here too.
                let array = Value::Array(items.into_iter().map(Value::String).collect());
                unique_trimmed_string_array(&array)
            } else {
                items
            };
            if items.is_empty() {
                continue;
            }
            out.insert(key, Value::Array(items.into_iter().map(Value::String).collect()));
        }
        out
    }
}

/// Split raw note text into categorized bullet lists.
///
/// `# Heading` lines switch the active category and are dropped; leading
/// bullet markers (`•`, `-`) are stripped; a line carrying styled math
/// characters is wrapped in `**` bold markup. Lines before any heading
/// land in `important`.
pub fn notes_from_freeform_text(text: &str) -> Map<String, Value> {
    let normalized = normalize_text(text);
    let raw = normalized.trim();
    if raw.is_empty() {
        return Map::new();
    }

    let mut buckets = NoteBuckets::default();
    buckets.ensure(DEFAULT_CATEGORY);
    let mut current = DEFAULT_CATEGORY.to_string();

    for line in raw.split('\n') {
        let mut item = line.trim();
        if item.is_empty() {
            continue;
        }
        if let Some(rest) = item.strip_prefix('#') {
            current = categorize_heading(rest.trim_start_matches('#').trim());
            buckets.ensure(&current);
            continue;
        }
        if let Some(rest) = item.strip_prefix('•') {
            item = rest.trim();
        }
        if let Some(rest) = item.strip_prefix('-') {
            item = rest.trim();
        }
        if item.is_empty() {
            continue;
        }
        let entry = if has_styled_math_chars(item) {
            format!("**{}**", item)
        } else {
            item.to_string()
        };
        buckets.push(&current, entry);
    }

    buckets.into_map(false)
}

/// Normalize a structured heading→value notes mapping.
///
/// Each heading is categorized; each value is coerced to a string array.
/// An array entry shaped like `# Heading` is a redirect marker: it creates
/// (or selects) that category instead of being stored as content. After the
/// walk, CS-handoff phrases are rerouted out of `important`, and every
/// category is deduplicated case-insensitively.
pub fn notes_from_structured(value: &Map<String, Value>) -> Map<String, Value> {
    let mut buckets = NoteBuckets::default();

    for (raw_key, raw_val) in value {
        let key = categorize_heading(raw_key.trim());
        buckets.ensure(&key);
        for item in to_string_array(raw_val) {
            let txt = item.trim();
            if txt.is_empty() {
                continue;
            }
            if let Some(caps) = re_heading_redirect().captures(txt) {
                let moved = categorize_heading(caps[1].trim());
                buckets.ensure(&moved);
                continue;
            }
            buckets.push(&key, txt.to_string());
        }
    }

    buckets.reroute_cs_triggers();
    buckets.into_map(true)
}

/// Shape-dispatch for a scenario's `notes`/`guidelines` value.
///
/// Objects take the structured path. Strings take the freeform path and are
/// then re-run through the structured pass so freeform imports reach the same
/// fixpoint (trigger reroute + dedup) as stored notes. Anything else carries
/// no notes.
pub fn normalize_notes_value(value: Option<&Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => notes_from_structured(map),
        Some(Value::String(text)) => notes_from_structured(&notes_from_freeform_text(text)),
        _ => Map::new(),
    }
}
