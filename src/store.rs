//! Canonical JSON document store.
//!
//! Two whole-document stores live in the working folder: `scenarios.json`
//! (`{"scenarios": [...]}`) and `templates.json` (`{"templates": [...]}`).
//! Reads tolerate missing/blank files; writes are atomic full replacements
//! so a failed import never truncates a store.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::error::ImportError;

pub const SCENARIOS_FILE: &str = "scenarios.json";
pub const TEMPLATES_FILE: &str = "templates.json";

/// How many ancestor directories to probe when locating the working folder.
const FOLDER_SEARCH_DEPTH: usize = 6;

pub fn scenarios_path(folder: &Path) -> PathBuf {
    folder.join(SCENARIOS_FILE)
}

pub fn templates_path(folder: &Path) -> PathBuf {
    folder.join(TEMPLATES_FILE)
}

/// Walk up from `start` looking for a folder that already holds one of the
/// stores; fall back to `start` itself.
pub fn resolve_working_folder(start: &Path) -> PathBuf {
    let mut candidate = start.to_path_buf();
    for _ in 0..FOLDER_SEARCH_DEPTH {
        if candidate.join(SCENARIOS_FILE).exists() || candidate.join(TEMPLATES_FILE).exists() {
            return candidate;
        }
        match candidate.parent() {
            Some(parent) => candidate = parent.to_path_buf(),
            None => break,
        }
    }
    start.to_path_buf()
}

/// Read a store document. Missing file or blank content is an empty object;
/// malformed JSON is an error so the store is never silently clobbered.
pub fn read_document(path: &Path) -> Result<Value, ImportError> {
    if !path.exists() {
        return Ok(json!({}));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(content.trim()).map_err(|source| ImportError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a store document: pretty-printed, atomic (temp file + rename).
pub fn write_document(path: &Path, value: &Value) -> Result<(), ImportError> {
    let content = serde_json::to_string_pretty(value).map_err(|source| ImportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write_str(path, &content).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn atomic_write_str(path: &Path, content: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, content)?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        // Don't leave the temp file behind in the working folder.
        let _ = std::fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}

/// True for objects that look like a conversation message rather than a
/// scenario: they carry message-level keys.
pub fn is_message_like(item: &Value) -> bool {
    let Some(obj) = item.as_object() else {
        return false;
    };
    ["message_text", "message_type", "content", "role"]
        .iter()
        .any(|key| obj.contains_key(*key))
}

/// A bare array of message-like objects is one scenario pasted without its
/// wrapper, not N scenarios.
fn scenario_array_count(items: &[Value]) -> usize {
    if items.is_empty() {
        0
    } else if items.iter().all(is_message_like) {
        1
    } else {
        items.len()
    }
}

/// Count scenarios in a store document or raw import payload.
pub fn scenario_count(doc: &Value) -> usize {
    match doc {
        Value::Array(items) => scenario_array_count(items),
        Value::Object(map) => match map.get("scenarios") {
            Some(Value::Array(items)) => scenario_array_count(items),
            Some(Value::Object(by_id)) => by_id.len(),
            _ => 0,
        },
        _ => 0,
    }
}

/// Count templates in a store document or raw import payload.
pub fn template_count(doc: &Value) -> usize {
    match doc {
        Value::Array(items) => items.len(),
        Value::Object(map) => match map.get("templates") {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        },
        _ => 0,
    }
}

/// Flatten a scenario container into a record list: a bare array, or a
/// `scenarios` key holding an array or an id→record map.
pub fn scenario_list_from_container(container: &Value) -> Vec<Value> {
    match container {
        Value::Array(items) => items.clone(),
        Value::Object(map) => match map.get("scenarios") {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Object(by_id)) => by_id.values().cloned().collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
