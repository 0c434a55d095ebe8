//! Field-level change detection between record snapshots.
//!
//! `diff_records` and `diff_instances` compare every tracked field by value
//! and emit deltas in canonical field order. Photo lists are reported as a
//! count delta, never as full contents. An empty [`ChangeSet`] means no-op:
//! callers must not log it.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{CanonicalRecord, InstanceFields};
use crate::enums::{ActivityAction, Field};

/// One field delta.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FieldChange {
    pub field: Field,
    pub before: Value,
    pub after: Value,
}

impl FieldChange {
    #[must_use]
    pub fn new(field: Field, before: impl Into<Value>, after: impl Into<Value>) -> Self {
        Self {
            field,
            before: before.into(),
            after: after.into(),
        }
    }
}

/// Ordered list of field deltas produced by one logical action.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(transparent)]
pub struct ChangeSet(Vec<FieldChange>);

impl ChangeSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, change: FieldChange) {
        self.0.push(change);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldChange> {
        self.0.iter()
    }

    /// The delta for `field`, if it changed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FieldChange> {
        self.0.iter().find(|c| c.field == field)
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Changed fields, in change-set order.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        self.0.iter().map(|c| c.field).collect()
    }

    /// True when exactly `field` changed and nothing else.
    #[must_use]
    pub fn is_only(&self, field: Field) -> bool {
        self.0.len() == 1 && self.0[0].field == field
    }

    /// Pick the most specific action describing a record-level change set.
    ///
    /// Single-purpose changes (flag toggles, photo count, notes, verification)
    /// get their own action; anything wider is `edited`. A photo change that
    /// keeps the count is a reorder and also `edited`.
    #[must_use]
    pub fn classify(&self) -> ActivityAction {
        let [change] = self.0.as_slice() else {
            return ActivityAction::Edited;
        };
        match change.field {
            Field::IsFlagged if change.after == Value::Bool(true) => ActivityAction::Flagged,
            Field::IsFlagged => ActivityAction::Unflagged,
            Field::Photos => {
                let before = change.before.as_u64().unwrap_or(0);
                let after = change.after.as_u64().unwrap_or(0);
                match after.cmp(&before) {
                    Ordering::Greater => ActivityAction::PhotoAdded,
                    Ordering::Less => ActivityAction::PhotoRemoved,
                    Ordering::Equal => ActivityAction::Edited,
                }
            }
            Field::Notes => ActivityAction::NotesChanged,
            Field::LastVerifiedAt => ActivityAction::Verified,
            _ => ActivityAction::Edited,
        }
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a FieldChange;
    type IntoIter = std::slice::Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<FieldChange> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = FieldChange>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Compare two record snapshots field by field.
///
/// `id` and `revision` are bookkeeping and never reported.
#[must_use]
pub fn diff_records(old: &CanonicalRecord, new: &CanonicalRecord) -> ChangeSet {
    Field::RECORD
        .into_iter()
        .filter_map(|field| {
            if field == Field::Photos {
                return (old.photos != new.photos)
                    .then(|| FieldChange::new(field, old.photos.len(), new.photos.len()));
            }
            let before = record_value(old, field);
            let after = record_value(new, field);
            (before != after).then(|| FieldChange::new(field, before, after))
        })
        .collect()
}

/// Compare two instance snapshots field by field.
#[must_use]
pub fn diff_instances(old: &InstanceFields, new: &InstanceFields) -> ChangeSet {
    Field::INSTANCE
        .into_iter()
        .filter_map(|field| {
            let before = instance_value(old, field);
            let after = instance_value(new, field);
            (before != after).then(|| FieldChange::new(field, before, after))
        })
        .collect()
}

/// JSON value of one record field. Fields that live on instances are `Null`.
#[must_use]
pub fn record_value(record: &CanonicalRecord, field: Field) -> Value {
    match field {
        Field::Nomenclature => Value::from(record.nomenclature.as_str()),
        Field::LineItemNumber => Value::from(record.line_item_number.as_str()),
        Field::StockNumber => Value::from(record.stock_number.as_str()),
        Field::UnitOfIssue => Value::from(record.unit_of_issue.as_str()),
        Field::QuantityAuthorized => Value::from(record.quantity_authorized),
        Field::QuantityOnHand => Value::from(record.quantity_on_hand),
        Field::QuantityShort => Value::from(record.quantity_short),
        Field::IsFlagged => Value::Bool(record.is_flagged),
        Field::Notes => record.notes.as_deref().map_or(Value::Null, Value::from),
        Field::Photos => Value::from(record.photos.clone()),
        Field::LastVerifiedAt => timestamp_value(record.last_verified_at.as_ref()),
        Field::SerialNumber | Field::Location | Field::ConditionCode => Value::Null,
    }
}

/// JSON value of one instance field. Record-only fields are `Null`.
#[must_use]
pub fn instance_value(instance: &InstanceFields, field: Field) -> Value {
    match field {
        Field::SerialNumber => Value::from(instance.serial_number.as_str()),
        Field::Location => instance.location.as_deref().map_or(Value::Null, Value::from),
        Field::ConditionCode => instance
            .condition_code
            .as_deref()
            .map_or(Value::Null, Value::from),
        Field::LastVerifiedAt => timestamp_value(instance.last_verified_at.as_ref()),
        _ => Value::Null,
    }
}

fn timestamp_value(ts: Option<&DateTime<Utc>>) -> Value {
    ts.map_or(Value::Null, |t| Value::String(t.to_rfc3339()))
}
