//! CSV row mappers: vendor export columns into canonical record shapes.
//!
//! Scenario CSVs carry fixed column names (`SEND_ID`, `CONVERSATION_JSON`,
//! ...) with JSON blobs embedded in several cells. Template CSVs vary by
//! vendor, so each field tries an ordered list of column aliases.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::coerce::to_string_array;
use crate::error::ImportError;
use crate::list_literal::parse_list_like;
use crate::notes::notes_from_freeform_text;
use crate::text::{normalize_text, parse_json_text, value_text};

/// One CSV row addressed by header name, DictReader-style.
pub struct CsvRow {
    columns: HashMap<String, String>,
}

impl CsvRow {
    pub fn from_record(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let columns = headers
            .iter()
            .zip(record.iter())
            // Excel exports prepend a UTF-8 BOM to the first header
            .map(|(header, value)| (header.trim_start_matches('\u{feff}').to_string(), value.to_string()))
            .collect();
        CsvRow { columns }
    }

    pub fn get(&self, column: &str) -> &str {
        self.columns.get(column).map(String::as_str).unwrap_or("")
    }

    /// Normalized, trimmed value of the first non-empty column among `names`.
    pub fn first_non_empty(&self, names: &[&str]) -> String {
        for name in names {
            let value = normalize_text(self.get(name));
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
        String::new()
    }

    fn normalized(&self, column: &str) -> String {
        normalize_text(self.get(column)).trim().to_string()
    }
}

// =============================================================================
// Scenario rows
// =============================================================================

/// Conversation message in the storage schema.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message_media: Vec<String>,
    pub message_text: String,
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct BrowsingItem {
    item: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    #[serde(rename = "timeAgo", skip_serializing_if = "Option::is_none")]
    time_ago: Option<String>,
}

#[derive(Debug, Serialize)]
struct OrderItem {
    name: String,
    /// Price passes through untouched: exports send both numbers and strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<Value>,
    #[serde(rename = "productLink", skip_serializing_if = "Option::is_none")]
    product_link: Option<String>,
}

#[derive(Debug, Serialize)]
struct OrderEntry {
    #[serde(rename = "orderNumber")]
    order_number: String,
    #[serde(rename = "orderDate")]
    order_date: String,
    items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<Value>,
}

/// First present property among `names`, for exports that renamed fields.
fn prop<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name))
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    let text = value.map(value_text).unwrap_or_default().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Keep a value only when its display form is non-blank (0 and false count).
fn non_blank_value(value: Option<&Value>) -> Option<Value> {
    let value = value?;
    if value_text(value).trim().is_empty() {
        None
    } else {
        Some(value.clone())
    }
}

/// Flatten message media into a plain string list. A string element that is
/// itself a bracketed JSON array (double-encoded media) is parsed and spliced
/// in place.
fn normalize_message_media(media: Option<&Value>) -> Vec<String> {
    let mut result = Vec::new();
    let Some(media) = media else {
        return result;
    };
    let items: Vec<&Value> = match media {
        Value::Null => return result,
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    for item in items {
        let text = value_text(item).trim().to_string();
        if text.is_empty() {
            continue;
        }
        if text.starts_with('[') && text.ends_with(']') {
            if let Some(Value::Array(nested)) = parse_json_text(&text) {
                for nested_item in nested {
                    let nested_text = value_text(&nested_item).trim().to_string();
                    if !nested_text.is_empty() {
                        result.push(nested_text);
                    }
                }
                continue;
            }
        }
        result.push(text);
    }
    result
}

fn parse_conversation(raw: &str) -> Vec<Message> {
    let Some(Value::Array(messages)) = parse_json_text(&normalize_text(raw)) else {
        return Vec::new();
    };
    messages
        .iter()
        .filter_map(Value::as_object)
        .map(|msg| Message {
            message_media: normalize_message_media(prop(msg, &["message_media", "media"])),
            message_text: prop(msg, &["message_text", "content"])
                .map(value_text)
                .unwrap_or_default(),
            message_type: prop(msg, &["message_type", "role"])
                .map(value_text)
                .unwrap_or_default()
                .to_lowercase(),
            date_time: non_empty_text(prop(msg, &["date_time", "dateTime", "timestamp"])),
            message_id: non_empty_text(prop(msg, &["message_id", "id"])),
        })
        .collect()
}

fn parse_browsing_history(raw: &str) -> Vec<BrowsingItem> {
    let Some(Value::Array(products)) = parse_json_text(&normalize_text(raw)) else {
        return Vec::new();
    };
    let mut history = Vec::new();
    for product in products.iter().filter_map(Value::as_object) {
        let name = non_empty_text(product.get("product_name"));
        let link = non_empty_text(product.get("product_link"));
        let view_date = non_empty_text(product.get("view_date"));
        // An entry needs at least a name or a link to display.
        let Some(item) = name.clone().or_else(|| link.clone()) else {
            continue;
        };
        history.push(BrowsingItem {
            item,
            link,
            time_ago: view_date,
        });
    }
    history
}

fn parse_orders(raw: &str) -> Vec<OrderEntry> {
    let Some(Value::Array(orders)) = parse_json_text(&normalize_text(raw)) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for order in orders.iter().filter_map(Value::as_object) {
        let mut items = Vec::new();
        if let Some(Value::Array(products)) = order.get("products") {
            for product in products.iter().filter_map(Value::as_object) {
                items.push(OrderItem {
                    name: non_empty_text(product.get("product_name")).unwrap_or_default(),
                    price: non_blank_value(prop(product, &["product_price", "price"])),
                    product_link: non_empty_text(product.get("product_link")),
                });
            }
        }
        out.push(OrderEntry {
            order_number: non_empty_text(order.get("order_number")).unwrap_or_default(),
            order_date: non_empty_text(order.get("order_date")).unwrap_or_default(),
            items,
            link: non_empty_text(order.get("order_status_url")),
            total: non_blank_value(order.get("total")),
        });
    }
    out
}

/// Map one scenario CSV row to a raw record in the storage field order.
/// The record still goes through scenario normalization during merge.
pub fn scenario_from_csv_row(row: &CsvRow) -> Value {
    let conversation = parse_conversation(row.get("CONVERSATION_JSON"));
    let browsing_history = parse_browsing_history(row.get("LAST_5_PRODUCTS"));
    let orders = parse_orders(row.get("ORDERS"));
    let website = row.normalized("COMPANY_WEBSITE");

    let mut right_panel = Map::new();
    right_panel.insert(
        "source".to_string(),
        json!({"label": "Website", "value": website, "date": ""}),
    );
    if !browsing_history.is_empty() {
        right_panel.insert("browsingHistory".to_string(), json!(browsing_history));
    }
    if !orders.is_empty() {
        right_panel.insert("orders".to_string(), json!(orders));
    }

    let notes = notes_from_freeform_text(row.get("COMPANY_NOTES"));

    json!({
        "id": row.normalized("SEND_ID"),
        "companyName": row.normalized("COMPANY_NAME"),
        "companyWebsite": website,
        "agentName": row.normalized("PERSONA"),
        "messageTone": row.normalized("MESSAGE_TONE"),
        "conversation": conversation,
        "notes": notes,
        "rightPanel": right_panel,
        "escalation_preferences": to_string_array(&json!(parse_list_like(row.get("ESCALATION_TOPICS")))),
        "blocklisted_words": to_string_array(&json!(parse_list_like(row.get("BLOCKLISTED_WORDS")))),
    })
}

/// Read all scenario rows from a CSV file.
pub fn read_scenario_rows(path: &Path) -> Result<Vec<Value>, ImportError> {
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|source| csv_error(path, source))?
        .clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| csv_error(path, source))?;
        rows.push(scenario_from_csv_row(&CsvRow::from_record(&headers, &record)));
    }
    Ok(rows)
}

// =============================================================================
// Template rows
// =============================================================================

/// Reusable response snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    #[serde(rename = "companyName", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

const NAME_COLUMNS: [&str; 5] = ["TEMPLATE_TITLE", "TEMPLATE_NAME", "NAME", "TEMPLATE", "TITLE"];
const CONTENT_COLUMNS: [&str; 6] = [
    "TEMPLATE_TEXT",
    "CONTENT",
    "TEMPLATE_CONTENT",
    "BODY",
    "TEXT",
    "MESSAGE",
];
const SHORTCUT_COLUMNS: [&str; 3] = ["SHORTCUT", "CODE", "KEYWORD"];
const COMPANY_COLUMNS: [&str; 3] = ["COMPANY_NAME", "COMPANY", "BRAND"];
const ID_COLUMNS: [&str; 2] = ["TEMPLATE_ID", "ID"];

fn opt(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Map one template CSV row, or skip it when name or content is missing.
pub fn template_from_csv_row(row: &CsvRow) -> Option<TemplateRecord> {
    let name = row.first_non_empty(&NAME_COLUMNS);
    let content = row.first_non_empty(&CONTENT_COLUMNS);
    if name.is_empty() || content.is_empty() {
        return None;
    }
    Some(TemplateRecord {
        name,
        content,
        id: opt(row.first_non_empty(&ID_COLUMNS)),
        shortcut: opt(row.first_non_empty(&SHORTCUT_COLUMNS)),
        company_name: opt(row.first_non_empty(&COMPANY_COLUMNS)),
    })
}

/// Read all usable template rows from a CSV file; incomplete rows are skipped.
pub fn read_template_rows(path: &Path) -> Result<Vec<TemplateRecord>, ImportError> {
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|source| csv_error(path, source))?
        .clone();
    let mut templates = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| csv_error(path, source))?;
        if let Some(template) = template_from_csv_row(&CsvRow::from_record(&headers, &record)) {
            templates.push(template);
        }
    }
    Ok(templates)
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, ImportError> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| csv_error(path, source))
}

fn csv_error(path: &Path, source: csv::Error) -> ImportError {
    ImportError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(headers: &[&str], values: &[&str]) -> CsvRow {
        CsvRow::from_record(
            &csv::StringRecord::from(headers.to_vec()),
            &csv::StringRecord::from(values.to_vec()),
        )
    }

    #[test]
    fn template_row_missing_name_or_content_is_skipped() {
        let r = row(&["SHORTCUT"], &["/hi"]);
        assert!(template_from_csv_row(&r).is_none());

        let r = row(&["TEMPLATE_TITLE", "CONTENT"], &["Greeting", ""]);
        assert!(template_from_csv_row(&r).is_none());

        let r = row(&["TEMPLATE_TITLE", "CONTENT"], &["", "Hello there"]);
        assert!(template_from_csv_row(&r).is_none());
    }

    #[test]
    fn template_row_takes_first_non_empty_alias() {
        let r = row(
            &["TEMPLATE_TITLE", "NAME", "TEMPLATE_TEXT", "CODE", "BRAND", "ID"],
            &["", "Greeting", "Hello {name}!", "/hi", "Acme", "t-1"],
        );
        let tpl = template_from_csv_row(&r).unwrap();
        assert_eq!(tpl.name, "Greeting");
        assert_eq!(tpl.content, "Hello {name}!");
        assert_eq!(tpl.shortcut.as_deref(), Some("/hi"));
        assert_eq!(tpl.company_name.as_deref(), Some("Acme"));
        assert_eq!(tpl.id.as_deref(), Some("t-1"));
    }

    #[test]
    fn bom_on_first_header_is_stripped() {
        let r = row(&["\u{feff}TEMPLATE_TITLE", "CONTENT"], &["Greeting", "Hi"]);
        assert!(template_from_csv_row(&r).is_some());
    }

    #[test]
    fn scenario_row_maps_fixed_columns() {
        let r = row(
            &[
                "SEND_ID",
                "COMPANY_NAME",
                "COMPANY_WEBSITE",
                "PERSONA",
                "MESSAGE_TONE",
            ],
            &[" s-1 ", "Acme", "acme.com", "Sam", "friendly"],
        );
        let record = scenario_from_csv_row(&r);
        assert_eq!(record["id"], "s-1");
        assert_eq!(record["companyName"], "Acme");
        assert_eq!(record["agentName"], "Sam");
        assert_eq!(record["messageTone"], "friendly");
        assert_eq!(record["rightPanel"]["source"]["value"], "acme.com");
        assert_eq!(record["conversation"], serde_json::json!([]));
    }

    #[test]
    fn conversation_tolerates_alternate_field_names() {
        let conversation = r#"[
            {"content": "Hi there", "role": "Customer", "id": "m1"},
            {"message_text": "Hello!", "message_type": "AGENT", "timestamp": "2024-01-01"}
        ]"#;
        let r = row(&["CONVERSATION_JSON"], &[conversation]);
        let record = scenario_from_csv_row(&r);
        let messages = record["conversation"].as_array().unwrap();
        assert_eq!(messages[0]["message_text"], "Hi there");
        assert_eq!(messages[0]["message_type"], "customer");
        assert_eq!(messages[0]["message_id"], "m1");
        assert_eq!(messages[1]["message_type"], "agent");
        assert_eq!(messages[1]["date_time"], "2024-01-01");
        assert!(messages[1].get("message_id").is_none());
    }

    #[test]
    fn double_encoded_media_is_flattened() {
        let conversation = r#"[
            {"message_text": "look", "message_type": "agent",
             "message_media": ["[\"a.png\", \"b.png\"]", "c.png"]}
        ]"#;
        let r = row(&["CONVERSATION_JSON"], &[conversation]);
        let record = scenario_from_csv_row(&r);
        assert_eq!(
            record["conversation"][0]["message_media"],
            serde_json::json!(["a.png", "b.png", "c.png"])
        );
    }

    #[test]
    fn browsing_history_requires_name_or_link() {
        let products = r#"[
            {"product_name": "Shoes", "product_link": "https://a", "view_date": "2d"},
            {"view_date": "3d"},
            {"product_link": "https://b"}
        ]"#;
        let r = row(&["LAST_5_PRODUCTS"], &[products]);
        let record = scenario_from_csv_row(&r);
        let history = record["rightPanel"]["browsingHistory"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["item"], "Shoes");
        assert_eq!(history[0]["timeAgo"], "2d");
        // Link-only entry uses the link as its display item.
        assert_eq!(history[1]["item"], "https://b");
    }

    #[test]
    fn orders_map_products_and_passthrough_prices() {
        let orders = r#"[{
            "order_number": "1001",
            "order_date": "2024-02-02",
            "order_status_url": "https://o/1001",
            "total": 59.98,
            "products": [
                {"product_name": "Mug", "product_price": 12.5},
                {"product_name": "Cap", "price": "47.48", "product_link": "https://p/cap"}
            ]
        }]"#;
        let r = row(&["ORDERS"], &[orders]);
        let record = scenario_from_csv_row(&r);
        let order = &record["rightPanel"]["orders"][0];
        assert_eq!(order["orderNumber"], "1001");
        assert_eq!(order["link"], "https://o/1001");
        assert_eq!(order["total"], 59.98);
        assert_eq!(order["items"][0]["price"], 12.5);
        assert_eq!(order["items"][1]["price"], "47.48");
        assert_eq!(order["items"][1]["productLink"], "https://p/cap");
    }

    #[test]
    fn list_columns_accept_loose_literals() {
        let r = row(
            &["ESCALATION_TOPICS", "BLOCKLISTED_WORDS"],
            &["['refunds', 'legal']", "cheap, knockoff"],
        );
        let record = scenario_from_csv_row(&r);
        assert_eq!(
            record["escalation_preferences"],
            serde_json::json!(["refunds", "legal"])
        );
        assert_eq!(
            record["blocklisted_words"],
            serde_json::json!(["cheap", "knockoff"])
        );
    }

    #[test]
    fn company_notes_use_the_freeform_path() {
        let r = row(
            &["COMPANY_NOTES"],
            &["Greet warmly\n# Escalation\n• Angry customers"],
        );
        let record = scenario_from_csv_row(&r);
        assert_eq!(
            record["notes"]["important"],
            serde_json::json!(["Greet warmly"])
        );
        assert_eq!(
            record["notes"]["escalate"],
            serde_json::json!(["Angry customers"])
        );
    }
}
