//! Merge engine: fold an incoming scenario batch into an existing batch by id.
//!
//! Every record is normalized on the way in, matched records are
//! shallow-merged (incoming fields win) with a key-by-key deep merge for
//! `rightPanel`, and the merged result is normalized again. Records without
//! an id are always appended, never matched.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::scenario::normalize_scenario;
use crate::text::value_text;

/// Result of a merge: the merged batch plus change counters.
#[derive(Debug)]
pub struct MergeOutcome {
    pub scenarios: Vec<Value>,
    pub added: usize,
    pub updated: usize,
}

fn record_id(record: &Value) -> String {
    record
        .get("id")
        .map(value_text)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Shallow-merge `incoming` onto `base`; `rightPanel` merges key-by-key so
/// panel sections present only on one side survive.
fn merge_records(base: &Map<String, Value>, incoming: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in incoming {
        merged.insert(key.clone(), value.clone());
    }

    let base_panel = base.get("rightPanel").and_then(Value::as_object);
    let incoming_panel = incoming.get("rightPanel").and_then(Value::as_object);
    if base_panel.is_some() || incoming_panel.is_some() {
        let mut panel = base_panel.cloned().unwrap_or_default();
        if let Some(incoming_panel) = incoming_panel {
            for (key, value) in incoming_panel {
                panel.insert(key.clone(), value.clone());
            }
        }
        merged.insert("rightPanel".to_string(), Value::Object(panel));
    }

    merged
}

/// Merge `incoming` scenarios into `existing` by stable id.
///
/// Existing records keep their relative order, updates happen in place, and
/// appends land at the end in incoming order. For duplicate ids within
/// `existing`, the first occurrence wins as the merge target. Appended
/// records with an id become merge targets for later records in the same
/// incoming batch.
pub fn merge_by_id(existing: &[Value], incoming: &[Value]) -> MergeOutcome {
    let mut result: Vec<Value> = existing.iter().map(normalize_scenario).collect();

    let mut id_to_index: HashMap<String, usize> = HashMap::new();
    for (index, record) in result.iter().enumerate() {
        let id = record_id(record);
        if !id.is_empty() {
            id_to_index.entry(id).or_insert(index);
        }
    }

    let mut added = 0;
    let mut updated = 0;

    for record in incoming {
        let normalized = normalize_scenario(record);
        let incoming_id = record_id(&normalized);

        if !incoming_id.is_empty() {
            if let Some(&index) = id_to_index.get(&incoming_id) {
                let base = result[index].as_object().cloned().unwrap_or_default();
                let incoming_obj = normalized.as_object().cloned().unwrap_or_default();
                let merged = merge_records(&base, &incoming_obj);
                result[index] = normalize_scenario(&Value::Object(merged));
                updated += 1;
                continue;
            }
        }

        result.push(normalized);
        added += 1;
        if !incoming_id.is_empty() {
            id_to_index.insert(incoming_id, result.len() - 1);
        }
    }

    MergeOutcome {
        scenarios: result,
        added,
        updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_incoming_returns_existing_normalized() {
        let existing = vec![json!({"id": "1", "companyName": "A", "blocklistedWords": ["x"]})];
        let outcome = merge_by_id(&existing, &[]);
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.updated, 0);
        assert_eq!(outcome.scenarios.len(), 1);
        // Normalization ran: legacy alias migrated.
        assert_eq!(outcome.scenarios[0]["blocklisted_words"], json!(["x"]));
        assert!(outcome.scenarios[0].get("blocklistedWords").is_none());
    }

    #[test]
    fn incoming_overrides_matched_record() {
        let existing = vec![json!({"id": "1", "companyName": "A"})];
        let incoming = vec![json!({"id": "1", "companyName": "B"})];
        let outcome = merge_by_id(&existing, &incoming);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.scenarios.len(), 1);
        assert_eq!(outcome.scenarios[0]["companyName"], "B");
    }

    #[test]
    fn fields_absent_from_incoming_survive() {
        let existing = vec![json!({"id": "1", "companyName": "A", "agentName": "Sam"})];
        let incoming = vec![json!({"id": "1", "companyName": "B"})];
        let outcome = merge_by_id(&existing, &incoming);
        assert_eq!(outcome.scenarios[0]["agentName"], "Sam");
        assert_eq!(outcome.scenarios[0]["companyName"], "B");
    }

    #[test]
    fn empty_id_always_appends() {
        let existing = vec![json!({"id": "", "companyName": "A"})];
        let incoming = vec![json!({"id": "", "companyName": "B"}), json!({"companyName": "C"})];
        let outcome = merge_by_id(&existing, &incoming);
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.updated, 0);
        assert_eq!(outcome.scenarios.len(), 3);
    }

    #[test]
    fn right_panel_deep_merge_preserves_existing_sections() {
        let existing = vec![json!({
            "id": "1",
            "rightPanel": {
                "source": {"label": "Website", "value": "old.com", "date": ""},
                "orders": [{"orderNumber": "1001"}],
            },
        })];
        let incoming = vec![json!({
            "id": "1",
            "rightPanel": {"source": {"label": "Website", "value": "new.com", "date": ""}},
        })];
        let outcome = merge_by_id(&existing, &incoming);
        let panel = &outcome.scenarios[0]["rightPanel"];
        assert_eq!(panel["source"]["value"], "new.com");
        assert_eq!(panel["orders"][0]["orderNumber"], "1001");
    }

    #[test]
    fn first_occurrence_wins_for_duplicate_existing_ids() {
        let existing = vec![
            json!({"id": "1", "companyName": "first"}),
            json!({"id": "1", "companyName": "second"}),
        ];
        let incoming = vec![json!({"id": "1", "companyName": "updated"})];
        let outcome = merge_by_id(&existing, &incoming);
        assert_eq!(outcome.scenarios[0]["companyName"], "updated");
        assert_eq!(outcome.scenarios[1]["companyName"], "second");
    }

    #[test]
    fn appended_record_becomes_target_within_same_batch() {
        let incoming = vec![
            json!({"id": "9", "companyName": "new"}),
            json!({"id": "9", "companyName": "newer"}),
        ];
        let outcome = merge_by_id(&[], &incoming);
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.scenarios.len(), 1);
        assert_eq!(outcome.scenarios[0]["companyName"], "newer");
    }

    #[test]
    fn order_is_existing_then_appends_in_incoming_order() {
        let existing = vec![json!({"id": "a"}), json!({"id": "b"})];
        let incoming = vec![json!({"id": "c"}), json!({"id": "b"}), json!({"id": "d"})];
        let outcome = merge_by_id(&existing, &incoming);
        let ids: Vec<&str> = outcome
            .scenarios
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.updated, 1);
    }

    #[test]
    fn numeric_ids_match_string_ids() {
        let existing = vec![json!({"id": "7", "companyName": "A"})];
        let incoming = vec![json!({"id": 7, "companyName": "B"})];
        let outcome = merge_by_id(&existing, &incoming);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.scenarios[0]["companyName"], "B");
    }
}
