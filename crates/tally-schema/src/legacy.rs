//! Read-side upgrade of activity log entries.
//!
//! Entries are immutable once written, so older ones are upgraded every
//! time they are read rather than rewritten in place. Version 1 entries
//! use the field names of earlier record shapes, camelCase keys, and
//! hyphenated or differently-named actions; this module maps all of that
//! onto the current vocabulary before typed deserialization.

use serde_json::{Map, Value, json};
use tally_core::entities::{LOG_ENTRY_VERSION, LogEntry};
use tally_core::enums::{ActivityAction, Field};

use crate::error::MigrationError;

/// Field names used by earlier record shapes.
const FIELD_RENAMES: &[(&str, &str)] = &[
    ("name", "nomenclature"),
    ("lin", "line_item_number"),
    ("nsn", "stock_number"),
    ("status", "is_flagged"),
    ("qty", "quantity_on_hand"),
    ("quantity", "quantity_on_hand"),
    ("serial", "serial_number"),
    ("ui", "unit_of_issue"),
    ("description", "nomenclature"),
    ("last_verified", "last_verified_at"),
    ("verified_at", "last_verified_at"),
];

/// Action names used before the action set was closed.
const ACTION_RENAMES: &[(&str, ActivityAction)] = &[
    ("created", ActivityAction::ItemAdded),
    ("added", ActivityAction::ItemAdded),
    ("updated", ActivityAction::Edited),
    ("modified", ActivityAction::Edited),
    ("removed", ActivityAction::Deleted),
    ("photo", ActivityAction::PhotoAdded),
    ("notes", ActivityAction::NotesChanged),
];

/// Status values that read as "flagged" when a status change is upgraded
/// to a flag change.
const FLAGGED_STATUSES: &[&str] = &["flagged", "needs_attention", "attention", "review"];

/// Upgrade a serialized change set written under entry version `v`.
///
/// Current-version change sets are returned unchanged. Legacy changes to
/// fields that no longer exist are dropped.
#[must_use]
pub fn upgrade_change_set(changes: Value, v: u32) -> Value {
    if v >= LOG_ENTRY_VERSION {
        return changes;
    }
    match changes {
        Value::Array(list) => Value::Array(list.into_iter().filter_map(upgrade_change).collect()),
        other => other,
    }
}

fn upgrade_change(change: Value) -> Option<Value> {
    let Value::Object(mut obj) = change else {
        return Some(change);
    };
    let before = obj
        .remove("before")
        .or_else(|| obj.remove("from"))
        .or_else(|| obj.remove("old"))
        .unwrap_or(Value::Null);
    let after = obj
        .remove("after")
        .or_else(|| obj.remove("to"))
        .or_else(|| obj.remove("new"))
        .unwrap_or(Value::Null);
    let legacy = obj
        .get("field")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let field = rename_field(&legacy);
    if Field::from_name(&field).is_none() {
        tracing::warn!(field = %legacy, "dropping legacy change to unknown field");
        return None;
    }

    let (before, after) = if legacy == "status" {
        (status_flag(&before), status_flag(&after))
    } else {
        (before, after)
    };
    Some(json!({"field": field, "before": before, "after": after}))
}

fn rename_field(legacy: &str) -> String {
    let snake = to_snake_case(legacy);
    FIELD_RENAMES
        .iter()
        .find(|(old, _)| *old == snake)
        .map_or(snake, |(_, new)| (*new).to_string())
}

fn status_flag(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let folded = s.trim().to_lowercase().replace([' ', '-'], "_");
            Value::Bool(FLAGGED_STATUSES.contains(&folded.as_str()))
        }
        Value::Bool(_) => value.clone(),
        _ => Value::Bool(false),
    }
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '-' || ch == ' ' {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    out
}

fn upgrade_action(raw: &str) -> Result<ActivityAction, MigrationError> {
    let folded = to_snake_case(raw.trim()).to_lowercase();
    ActivityAction::parse(&folded)
        .or_else(|| {
            ACTION_RENAMES
                .iter()
                .find(|(old, _)| *old == folded)
                .map(|(_, action)| *action)
        })
        .ok_or_else(|| MigrationError::UnknownAction(raw.to_string()))
}

/// Decode a stored log entry of any version into the current shape.
///
/// The entry's `v` is kept as stored, so callers can tell which entries
/// were upgraded.
pub fn upgrade_entry(raw: Value) -> Result<LogEntry, MigrationError> {
    let Value::Object(obj) = raw else {
        return Err(MigrationError::NotAnObject { version: 1 });
    };
    let v = obj
        .get("v")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(1);
    if v >= LOG_ENTRY_VERSION {
        return Ok(serde_json::from_value(Value::Object(obj))?);
    }

    let mut obj = obj;
    let upgraded = upgrade_v1_object(&mut obj, v)?;
    Ok(serde_json::from_value(Value::Object(upgraded))?)
}

fn upgrade_v1_object(obj: &mut Map<String, Value>, v: u32) -> Result<Map<String, Value>, MigrationError> {
    let mut out = Map::new();
    out.insert("v".to_string(), json!(v));
    out.insert("id".to_string(), obj.remove("id").unwrap_or(Value::Null));
    out.insert(
        "timestamp".to_string(),
        obj.remove("timestamp")
            .or_else(|| obj.remove("ts"))
            .unwrap_or(Value::Null),
    );

    let action_raw = obj
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let action = upgrade_action(&action_raw)?;
    out.insert("action".to_string(), json!(action));

    for (current, legacy) in [("item_id", "itemId"), ("instance_id", "instanceId")] {
        let value = obj
            .remove(current)
            .or_else(|| obj.remove(legacy))
            .unwrap_or(Value::Null);
        out.insert(current.to_string(), value);
    }

    let detail = if let Some(Value::Object(mut detail)) = obj.remove("detail") {
        if detail.get("kind").and_then(Value::as_str) == Some("changes") {
            let data = detail.remove("data").unwrap_or(Value::Null);
            detail.insert("data".to_string(), upgrade_change_set(data, v));
        }
        Value::Object(detail)
    } else {
        match obj.remove("changes") {
            Some(changes @ Value::Array(_)) => {
                json!({"kind": "changes", "data": upgrade_change_set(changes, v)})
            }
            _ => json!({
                "kind": "payload",
                "data": obj.remove("details").or_else(|| obj.remove("payload")).unwrap_or(Value::Null),
            }),
        }
    };
    out.insert("detail".to_string(), detail);
    Ok(out)
}
