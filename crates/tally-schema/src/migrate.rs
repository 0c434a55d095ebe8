//! Stored record upgrade.
//!
//! Record shapes by schema version:
//!
//! | v | shape |
//! |---|-------|
//! | 1 | flat item: `name`, `lin`, `nsn`, `status` enum, `serial`, `location`, `quantity` |
//! | 2 | `nomenclature`, `lineItemNumber`, `stockNumber`, `unitOfIssue`, `status` enum, instance fields on the record |
//! | 3 | quantity tracking (`quantityAuthorized`, `quantityOnHand`), `isFlagged`, instances stored separately |
//! | 4 | current [`CanonicalRecord`] |
//!
//! Status enums predate quantity tracking. A `missing` status means nothing
//! on hand; a `flagged` status sets the flag. Instance fields carried on
//! v1 and v2 records are split off into an instance.

use serde_json::{Map, Value};
use tally_core::cell::CellValue;
use tally_core::entities::{CanonicalRecord, InstanceFields};
use tally_core::enums::UnitOfIssue;
use tally_ingest::coerce::{
    parse_quantity, to_date, to_flag, to_optional_string, to_trimmed_string,
};

use crate::error::MigrationError;

/// Record schema version written by this build.
pub const CURRENT_RECORD_VERSION: u32 = 4;

/// Legacy status values meaning "nothing on hand".
const MISSING_STATUSES: &[&str] = &["missing", "lost", "short", "not_found"];

/// Legacy status values meaning "flagged for attention".
const FLAGGED_STATUSES: &[&str] = &["flagged", "needs_attention", "attention", "review"];

/// A record upgraded to the current shape, with any instance data that used
/// to live on the record itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MigratedRecord {
    pub record: CanonicalRecord,
    pub instances: Vec<InstanceFields>,
}

/// Upgrade a stored record of schema version `from_version` to the current
/// canonical shape.
pub fn migrate(value: &Value, from_version: u32) -> Result<MigratedRecord, MigrationError> {
    if from_version == CURRENT_RECORD_VERSION {
        let record: CanonicalRecord = serde_json::from_value(value.clone())?;
        return Ok(MigratedRecord {
            record,
            instances: Vec::new(),
        });
    }

    let obj = value.as_object().ok_or(MigrationError::NotAnObject {
        version: from_version,
    })?;
    let stored = Stored(obj);

    let migrated = match from_version {
        1 => from_flat_item(&stored),
        2 => from_status_item(&stored),
        3 => from_quantity_item(&stored),
        other => return Err(MigrationError::UnsupportedVersion(other)),
    };
    tracing::debug!(
        from_version,
        id = ?migrated.record.id,
        instances = migrated.instances.len(),
        "migrated stored record"
    );
    Ok(migrated)
}

fn from_flat_item(s: &Stored<'_>) -> MigratedRecord {
    let status = s.status();
    let (authorized, on_hand) = status_quantities(s.quantity(&["quantity", "qty"]), &status);
    let mut record = CanonicalRecord {
        id: s.id(),
        nomenclature: s.text(&["name"]),
        line_item_number: s.text(&["lin"]),
        stock_number: s.text(&["nsn"]),
        unit_of_issue: UnitOfIssue::normalize(&s.text(&["ui", "unit"])),
        quantity_authorized: authorized,
        quantity_on_hand: on_hand,
        is_flagged: FLAGGED_STATUSES.contains(&status.as_str()),
        notes: s.optional_text(&["notes"]),
        photos: s.photos(),
        ..CanonicalRecord::default()
    };
    record.recompute_short();

    let instances = s
        .optional_text(&["serial"])
        .map(|serial_number| InstanceFields {
            serial_number,
            location: s.optional_text(&["location"]),
            condition_code: None,
            last_verified_at: None,
        })
        .into_iter()
        .collect();

    MigratedRecord { record, instances }
}

fn from_status_item(s: &Stored<'_>) -> MigratedRecord {
    let status = s.status();
    let (authorized, on_hand) = status_quantities(s.quantity(&["quantity", "qty"]), &status);
    let last_verified_at = s.date(&["lastVerifiedAt", "last_verified_at"]);
    let mut record = CanonicalRecord {
        id: s.id(),
        nomenclature: s.text(&["nomenclature"]),
        line_item_number: s.text(&["lineItemNumber", "line_item_number"]),
        stock_number: s.text(&["stockNumber", "stock_number"]),
        unit_of_issue: UnitOfIssue::normalize(&s.text(&["unitOfIssue", "unit_of_issue"])),
        quantity_authorized: authorized,
        quantity_on_hand: on_hand,
        is_flagged: FLAGGED_STATUSES.contains(&status.as_str())
            || s.flag(&["isFlagged", "is_flagged"]),
        notes: s.optional_text(&["notes"]),
        photos: s.photos(),
        last_verified_at,
        ..CanonicalRecord::default()
    };
    record.recompute_short();

    let instances = s
        .optional_text(&["serialNumber", "serial_number"])
        .map(|serial_number| InstanceFields {
            serial_number,
            location: s.optional_text(&["location"]),
            condition_code: s.optional_text(&["conditionCode", "condition_code"]),
            last_verified_at,
        })
        .into_iter()
        .collect();

    MigratedRecord { record, instances }
}

fn from_quantity_item(s: &Stored<'_>) -> MigratedRecord {
    let mut record = CanonicalRecord {
        id: s.id(),
        nomenclature: s.text(&["nomenclature"]),
        line_item_number: s.text(&["lineItemNumber", "line_item_number"]),
        stock_number: s.text(&["stockNumber", "stock_number"]),
        unit_of_issue: UnitOfIssue::normalize(&s.text(&["unitOfIssue", "unit_of_issue"])),
        quantity_authorized: s
            .quantity(&["quantityAuthorized", "quantity_authorized"])
            .unwrap_or(0.0),
        quantity_on_hand: s
            .quantity(&["quantityOnHand", "quantity_on_hand"])
            .unwrap_or(0.0),
        is_flagged: s.flag(&["isFlagged", "is_flagged"]),
        notes: s.optional_text(&["notes"]),
        photos: s.photos(),
        last_verified_at: s.date(&["lastVerifiedAt", "last_verified_at"]),
        ..CanonicalRecord::default()
    };
    record.recompute_short();
    MigratedRecord {
        record,
        instances: Vec::new(),
    }
}

/// `(authorized, on_hand)` for a pre-quantity-tracking record. A flat item
/// without a quantity stands for one unit.
fn status_quantities(quantity: Option<f64>, status: &str) -> (f64, f64) {
    let quantity = quantity.unwrap_or(1.0);
    if MISSING_STATUSES.contains(&status) {
        (quantity, 0.0)
    } else {
        (quantity, quantity)
    }
}

/// Field access over a stored object. Each accessor takes candidate keys in
/// priority order.
struct Stored<'a>(&'a Map<String, Value>);

impl Stored<'_> {
    fn cell(&self, keys: &[&str]) -> Option<CellValue> {
        keys.iter()
            .find_map(|k| self.0.get(*k))
            .map(CellValue::from_json)
    }

    fn text(&self, keys: &[&str]) -> String {
        to_trimmed_string(self.cell(keys).as_ref())
    }

    fn optional_text(&self, keys: &[&str]) -> Option<String> {
        to_optional_string(self.cell(keys).as_ref())
    }

    fn quantity(&self, keys: &[&str]) -> Option<f64> {
        parse_quantity(self.cell(keys).as_ref())
    }

    fn flag(&self, keys: &[&str]) -> bool {
        to_flag(self.cell(keys).as_ref())
    }

    fn date(&self, keys: &[&str]) -> Option<chrono::DateTime<chrono::Utc>> {
        to_date(self.cell(keys).as_ref())
    }

    fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    fn status(&self) -> String {
        self.text(&["status"]).to_lowercase().replace([' ', '-'], "_")
    }

    fn photos(&self) -> Vec<String> {
        self.0
            .get("photos")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
