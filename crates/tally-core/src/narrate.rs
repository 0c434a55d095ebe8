//! Human-readable summaries of log entries.
//!
//! Narration is a pure function of `(action, detail)`. For change sets the
//! summary names the changed field ranked highest in
//! [`Field::NARRATION_PRIORITY`], regardless of the order fields appear in
//! the change set, and counts the rest. The full change set stays on the
//! entry.

use std::cmp::Ordering;

use serde_json::Value;

use crate::audit_detail::{ExportedDetail, ImportedDetail, InstanceSnapshot, ItemSnapshot};
use crate::changes::{ChangeSet, FieldChange};
use crate::entities::LogDetail;
use crate::enums::{ActivityAction, Field};

/// One-line summary of an entry.
#[must_use]
pub fn narrate(action: ActivityAction, detail: &LogDetail) -> String {
    match detail {
        LogDetail::Changes(changes) => narrate_changes(action, changes),
        LogDetail::Payload(payload) => narrate_payload(action, payload),
    }
}

/// Summary of a change set. The leading field is chosen by priority, not
/// by position.
#[must_use]
pub fn narrate_changes(action: ActivityAction, changes: &ChangeSet) -> String {
    let Some(lead) = changes.iter().min_by_key(|c| c.field.narration_rank()) else {
        return humanize(action);
    };
    let mut line = describe(lead);
    if action == ActivityAction::InstanceEdited {
        line = format!("instance: {line}");
    }
    let rest = changes.len() - 1;
    if rest > 0 {
        line.push_str(&format!(" (+{rest} more)"));
    }
    line
}

fn describe(change: &FieldChange) -> String {
    match change.field {
        Field::IsFlagged => {
            if change.after == Value::Bool(true) {
                "flagged item".to_string()
            } else {
                "unflagged item".to_string()
            }
        }
        Field::LastVerifiedAt if change.after.is_null() => "cleared verification".to_string(),
        Field::LastVerifiedAt => format!("verified at {}", render(&change.after)),
        Field::Photos => {
            let before = change.before.as_u64().unwrap_or(0);
            let after = change.after.as_u64().unwrap_or(0);
            match after.cmp(&before) {
                Ordering::Greater => count_phrase("added", after - before, "photo"),
                Ordering::Less => count_phrase("removed", before - after, "photo"),
                Ordering::Equal => "reordered photos".to_string(),
            }
        }
        Field::Notes if change.after.is_null() => "cleared notes".to_string(),
        Field::Notes if change.before.is_null() => "added notes".to_string(),
        Field::Notes => "changed notes".to_string(),
        field => format!(
            "changed {} from {} to {}",
            field.label(),
            render(&change.before),
            render(&change.after)
        ),
    }
}

fn narrate_payload(action: ActivityAction, payload: &Value) -> String {
    let parsed = match action {
        ActivityAction::Imported => decode::<ImportedDetail>(payload).map(|d| {
            let mut line = count_phrase("imported", d.accepted as u64, "item");
            if !d.rejected.is_empty() {
                line.push_str(&format!(" ({} rejected)", d.rejected.len()));
            }
            if d.aborted {
                line.push_str(", aborted");
            }
            line
        }),
        ActivityAction::Exported => decode::<ExportedDetail>(payload).map(|d| {
            format!(
                "{} as {}",
                count_phrase("exported", d.count as u64, "item"),
                d.format
            )
        }),
        ActivityAction::ItemAdded | ActivityAction::Deleted => {
            decode::<ItemSnapshot>(payload).map(|s| {
                let verb = if action == ActivityAction::Deleted {
                    "deleted"
                } else {
                    "added"
                };
                if s.line_item_number.is_empty() {
                    format!("{verb} {}", s.nomenclature)
                } else {
                    format!("{verb} {} (LIN {})", s.nomenclature, s.line_item_number)
                }
            })
        }
        ActivityAction::InstanceAdded | ActivityAction::InstanceDeleted => {
            decode::<InstanceSnapshot>(payload).map(|s| {
                let verb = if action == ActivityAction::InstanceDeleted {
                    "deleted"
                } else {
                    "added"
                };
                format!("{verb} instance {}", s.serial_number)
            })
        }
        _ => None,
    };
    parsed.unwrap_or_else(|| humanize(action))
}

fn decode<T: serde::de::DeserializeOwned>(payload: &Value) -> Option<T> {
    serde_json::from_value(payload.clone()).ok()
}

fn count_phrase(verb: &str, n: u64, noun: &str) -> String {
    if n == 1 {
        format!("{verb} 1 {noun}")
    } else {
        format!("{verb} {n} {noun}s")
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "(none)".to_string(),
        Value::String(s) if s.is_empty() => "(blank)".to_string(),
        Value::String(s) => format!("\"{s}\""),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn humanize(action: ActivityAction) -> String {
    action.as_str().replace('_', " ")
}
