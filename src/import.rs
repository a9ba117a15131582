//! Top-level import/clear actions over the document stores.
//!
//! Each action is a single attempt: read, transform, then one atomic write.
//! A source that fails to parse (or, for JSON scenario imports, yields zero
//! records) leaves the existing store untouched.

use std::path::Path;

use serde_json::{json, Value};

use crate::csv_import;
use crate::error::ImportError;
use crate::merge::merge_by_id;
use crate::store;

/// Counters reported back to the user after a scenario import.
#[derive(Debug)]
pub struct ScenarioImportStats {
    pub added: usize,
    pub updated: usize,
    pub total: usize,
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn read_json_source(path: &Path) -> Result<Value, ImportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ImportError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Import scenarios from a JSON or CSV source and merge them into the store.
///
/// JSON sources must yield at least one scenario record; an empty result is
/// rejected rather than silently merging nothing. CSV sources map row-by-row
/// through the scenario row mapper.
pub fn import_scenarios(folder: &Path, source: &Path) -> Result<ScenarioImportStats, ImportError> {
    let store_path = store::scenarios_path(folder);
    let existing_doc = store::read_document(&store_path)?;
    let existing = store::scenario_list_from_container(&existing_doc);

    let incoming = if is_csv(source) {
        csv_import::read_scenario_rows(source)?
    } else {
        let parsed = read_json_source(source)?;
        let records = store::scenario_list_from_container(&parsed);
        if records.is_empty() {
            return Err(ImportError::NoScenarios {
                path: source.to_path_buf(),
            });
        }
        records
    };

    let outcome = merge_by_id(&existing, &incoming);
    let total = outcome.scenarios.len();
    store::write_document(&store_path, &json!({ "scenarios": outcome.scenarios }))?;
    log::info!(
        "scenarios store updated from {}: {} added, {} updated, {} total",
        source.display(),
        outcome.added,
        outcome.updated,
        total
    );

    Ok(ScenarioImportStats {
        added: outcome.added,
        updated: outcome.updated,
        total,
    })
}

/// Import templates from a JSON or CSV source as a full store replacement.
///
/// CSV rows missing a name or content are skipped. JSON sources are written
/// through as the whole document. Returns the resulting template count.
pub fn import_templates(folder: &Path, source: &Path) -> Result<usize, ImportError> {
    let store_path = store::templates_path(folder);

    if is_csv(source) {
        let templates = csv_import::read_template_rows(source)?;
        let count = templates.len();
        store::write_document(&store_path, &json!({ "templates": templates }))?;
        log::info!(
            "templates store updated from {}: {} template(s)",
            source.display(),
            count
        );
        return Ok(count);
    }

    let parsed = read_json_source(source)?;
    let count = store::template_count(&parsed);
    store::write_document(&store_path, &parsed)?;
    log::info!(
        "templates store replaced from {}: {} template(s)",
        source.display(),
        count
    );
    Ok(count)
}

/// Reset the scenarios store to an empty document.
pub fn clear_scenarios(folder: &Path) -> Result<(), ImportError> {
    store::write_document(&store::scenarios_path(folder), &json!({ "scenarios": [] }))
}

/// Reset the templates store to an empty document.
pub fn clear_templates(folder: &Path) -> Result<(), ImportError> {
    store::write_document(&store::templates_path(folder), &json!({ "templates": [] }))
}
