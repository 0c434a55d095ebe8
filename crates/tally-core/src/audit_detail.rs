//! Typed activity log payloads.
//!
//! Actions without a single before/after record (deletion, import, export,
//! item and instance creation) carry one of these as a free-form payload.
//! They also provide the JSON Schemas payloads are validated against.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{CanonicalRecord, Instance};
use crate::ids::{InstanceId, ItemId};

/// Salient fields of a record, kept so the entry stays meaningful after
/// the record itself is gone. Payload of `item_added` and `deleted`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ItemSnapshot {
    pub id: Option<ItemId>,
    pub nomenclature: String,
    pub line_item_number: String,
    pub stock_number: String,
    pub quantity_on_hand: f64,
    #[serde(default)]
    pub instance_count: usize,
}

impl ItemSnapshot {
    #[must_use]
    pub fn of(record: &CanonicalRecord, instance_count: usize) -> Self {
        Self {
            id: record.id,
            nomenclature: record.nomenclature.clone(),
            line_item_number: record.line_item_number.clone(),
            stock_number: record.stock_number.clone(),
            quantity_on_hand: record.quantity_on_hand,
            instance_count,
        }
    }
}

/// Payload of `instance_added` and `instance_deleted`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InstanceSnapshot {
    pub id: InstanceId,
    pub item_id: ItemId,
    pub serial_number: String,
    pub location: Option<String>,
}

impl From<&Instance> for InstanceSnapshot {
    fn from(instance: &Instance) -> Self {
        Self {
            id: instance.id,
            item_id: instance.item_id,
            serial_number: instance.fields.serial_number.clone(),
            location: instance.fields.location.clone(),
        }
    }
}

/// Payload of `imported`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportedDetail {
    /// Rows actually persisted.
    pub accepted: usize,
    /// Zero-based indexes of rows that could not be parsed.
    pub rejected: Vec<usize>,
    /// File name or other description of the row source.
    pub source: Option<String>,
    /// True when the batch was cancelled before every row was processed.
    #[serde(default)]
    pub aborted: bool,
}

/// Payload of `exported`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExportedDetail {
    pub count: usize,
    pub format: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_keeps_identifying_fields() {
        let record = CanonicalRecord {
            id: Some(2),
            nomenclature: "Radio".to_string(),
            line_item_number: "a1b2c3".to_string(),
            stock_number: "1005-01-123-4567".to_string(),
            ..CanonicalRecord::default()
        };
        let snapshot = ItemSnapshot::of(&record, 1);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["nomenclature"], "Radio");
        assert_eq!(json["line_item_number"], "a1b2c3");
        assert_eq!(json["stock_number"], "1005-01-123-4567");
        assert_eq!(json["instance_count"], 1);
    }

    #[test]
    fn imported_detail_defaults_aborted() {
        let detail: ImportedDetail =
            serde_json::from_value(json!({"accepted": 2, "rejected": [1], "source": null}))
                .unwrap();
        assert!(!detail.aborted);
        assert_eq!(detail.rejected, vec![1]);
    }
}
