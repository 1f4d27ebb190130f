//! Response envelope and metadata DTOs for the Autotask REST API.
//!
//! The API exposes records under either a plural (`items`) or singular
//! (`item`) key depending on the endpoint. The envelope types here keep both
//! as optional fields and normalize to a single record sequence, so call
//! sites never branch on which key exists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pagination metadata attached to query responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDetails {
    /// Total number of records matching the query.
    #[serde(default)]
    pub count: i64,

    /// Number of records requested per page.
    #[serde(default, rename = "requestCount")]
    pub request_count: i64,

    /// Opaque URL of the next page; `None` signals the terminal page.
    #[serde(default, rename = "nextPageUrl")]
    pub next_page_url: Option<String>,

    /// Opaque URL of the previous page.
    #[serde(default, rename = "prevPageUrl")]
    pub prev_page_url: Option<String>,
}

/// Top-level response wrapper for query and item endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelope {
    /// Records, for endpoints that return a page of results.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Value>,

    /// The single record, for by-id endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Value>,

    /// Pagination metadata, present on query responses.
    #[serde(default, rename = "pageDetails", skip_serializing_if = "Option::is_none")]
    pub page_details: Option<PageDetails>,
}

impl QueryEnvelope {
    /// Normalizes the plural/singular record keys into one sequence.
    pub fn into_records(self) -> Vec<Value> {
        if !self.items.is_empty() {
            return self.items;
        }
        match self.item {
            // A null item means the record does not exist.
            Some(Value::Null) | None => Vec::new(),
            Some(single) => vec![single],
        }
    }

    /// Returns the next-page cursor, if any.
    pub fn next_page_url(&self) -> Option<&str> {
        self.page_details
            .as_ref()
            .and_then(|details| details.next_page_url.as_deref())
    }
}

/// Response from the `/query/count` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEnvelope {
    /// Number of records matching the filter.
    #[serde(rename = "queryCount")]
    pub query_count: i64,
}

/// Envelope for `/entityInformation/fields` responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldInfoEnvelope {
    /// The resource's field descriptors.
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
}

/// A field descriptor from the entity information endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldInfo {
    /// The field name.
    pub name: String,

    /// Whether the field is picklist-typed.
    #[serde(default, rename = "isPickList")]
    pub is_pick_list: bool,

    /// Candidate values for picklist fields.
    #[serde(default, rename = "picklistValues")]
    pub picklist_values: Vec<PicklistValue>,
}

/// A single picklist candidate value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PicklistValue {
    /// The raw value, numeric or string depending on the field.
    pub value: Value,

    /// The human-readable label.
    pub label: String,

    /// Whether the value is still selectable.
    #[serde(default = "default_true", rename = "isActive")]
    pub is_active: bool,
}

impl PicklistValue {
    /// The normalized string key for this value.
    ///
    /// Numeric and string representations of the same value must produce
    /// the same key, so `5` and `"5"` both normalize to `"5"`.
    pub fn key(&self) -> Option<String> {
        normalize_picklist_key(&self.value)
    }
}

/// Normalizes a raw picklist value to its string-form map key.
pub fn normalize_picklist_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => Some(n.to_string()),
        },
        _ => None,
    }
}

fn default_true() -> bool {
    true
}

/// Envelope for `/entityInformation/userDefinedFields` responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UdfFieldEnvelope {
    /// The resource's user-defined field descriptors.
    #[serde(default)]
    pub fields: Vec<UdfFieldInfo>,
}

/// A user-defined field descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UdfFieldInfo {
    /// The field name, the preferred identifier.
    #[serde(default)]
    pub name: Option<String>,

    /// The display label, used as a fallback identifier.
    #[serde(default)]
    pub label: Option<String>,
}

impl UdfFieldInfo {
    /// Returns the identifier for this UDF: name, falling back to label.
    pub fn identifier(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.label.as_deref().filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_normalizes_plural_key() {
        let envelope: QueryEnvelope = serde_json::from_value(json!({
            "items": [{"id": 1}, {"id": 2}],
            "pageDetails": {"count": 2, "requestCount": 500, "nextPageUrl": null, "prevPageUrl": null}
        }))
        .unwrap();

        assert!(envelope.next_page_url().is_none());
        let records = envelope.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], 1);
    }

    #[test]
    fn test_envelope_normalizes_singular_key() {
        let envelope: QueryEnvelope = serde_json::from_value(json!({
            "item": {"id": 7}
        }))
        .unwrap();

        let records = envelope.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], 7);
    }

    #[test]
    fn test_envelope_null_item_yields_no_records() {
        let envelope: QueryEnvelope = serde_json::from_value(json!({"item": null})).unwrap();
        assert!(envelope.into_records().is_empty());
    }

    #[test]
    fn test_envelope_next_page_cursor() {
        let envelope: QueryEnvelope = serde_json::from_value(json!({
            "items": [],
            "pageDetails": {
                "count": 1200,
                "requestCount": 500,
                "nextPageUrl": "https://zone.example/V1.0/Tickets/query?page=2",
                "prevPageUrl": null
            }
        }))
        .unwrap();

        assert_eq!(
            envelope.next_page_url(),
            Some("https://zone.example/V1.0/Tickets/query?page=2")
        );
    }

    #[test]
    fn test_picklist_key_normalizes_numeric_and_string_forms() {
        assert_eq!(normalize_picklist_key(&json!(5)), Some("5".to_string()));
        assert_eq!(normalize_picklist_key(&json!("5")), Some("5".to_string()));
        assert_eq!(normalize_picklist_key(&json!(null)), None);
    }

    #[test]
    fn test_field_info_deserializes_picklist_values() {
        let info: FieldInfo = serde_json::from_value(json!({
            "name": "status",
            "isPickList": true,
            "picklistValues": [
                {"value": 1, "label": "New"},
                {"value": "5", "label": "Complete", "isActive": false}
            ]
        }))
        .unwrap();

        assert!(info.is_pick_list);
        assert_eq!(info.picklist_values[0].key(), Some("1".to_string()));
        assert!(info.picklist_values[0].is_active);
        assert_eq!(info.picklist_values[1].key(), Some("5".to_string()));
        assert!(!info.picklist_values[1].is_active);
    }

    #[test]
    fn test_udf_identifier_prefers_name_over_label() {
        let udf: UdfFieldInfo = serde_json::from_value(json!({
            "name": "CustomRef",
            "label": "Customer Reference"
        }))
        .unwrap();
        assert_eq!(udf.identifier(), Some("CustomRef"));

        let udf: UdfFieldInfo = serde_json::from_value(json!({
            "label": "Customer Reference"
        }))
        .unwrap();
        assert_eq!(udf.identifier(), Some("Customer Reference"));

        let udf: UdfFieldInfo = serde_json::from_value(json!({})).unwrap();
        assert_eq!(udf.identifier(), None);
    }

    #[test]
    fn test_count_envelope() {
        let count: CountEnvelope = serde_json::from_value(json!({"queryCount": 37})).unwrap();
        assert_eq!(count.query_count, 37);
    }
}
