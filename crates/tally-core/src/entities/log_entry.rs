use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::changes::ChangeSet;
use crate::enums::ActivityAction;
use crate::ids::{InstanceId, ItemId, LogEntryId};

/// Log entry shape version written by this build.
///
/// Version 1 entries predate the field renames of the current record and
/// are upgraded on read.
pub const LOG_ENTRY_VERSION: u32 = 2;

/// Default version for entries written before the `v` field existed.
const fn default_log_version() -> u32 {
    1
}

/// What an entry carries: a field-level change set, or a free-form payload
/// for actions without a single before/after record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum LogDetail {
    Changes(ChangeSet),
    Payload(Value),
}

impl LogDetail {
    #[must_use]
    pub const fn changes(&self) -> Option<&ChangeSet> {
        match self {
            Self::Changes(changes) => Some(changes),
            Self::Payload(_) => None,
        }
    }

    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        match self {
            Self::Payload(payload) => Some(payload),
            Self::Changes(_) => None,
        }
    }
}

/// Record and instance an entry is about. Both are optional: batch actions
/// have no subject at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Subject {
    pub item_id: Option<ItemId>,
    pub instance_id: Option<InstanceId>,
}

impl Subject {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            item_id: None,
            instance_id: None,
        }
    }

    #[must_use]
    pub const fn item(item_id: ItemId) -> Self {
        Self {
            item_id: Some(item_id),
            instance_id: None,
        }
    }

    #[must_use]
    pub const fn instance(item_id: ItemId, instance_id: InstanceId) -> Self {
        Self {
            item_id: Some(item_id),
            instance_id: Some(instance_id),
        }
    }
}

/// An immutable, append-only activity log entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LogEntry {
    /// Shape version. Defaults to 1 for entries without this field.
    #[serde(default = "default_log_version")]
    pub v: u32,
    pub id: LogEntryId,
    pub timestamp: DateTime<Utc>,
    pub action: ActivityAction,
    #[serde(default)]
    pub item_id: Option<ItemId>,
    #[serde(default)]
    pub instance_id: Option<InstanceId>,
    pub detail: LogDetail,
}

impl LogEntry {
    #[must_use]
    pub const fn subject(&self) -> Subject {
        Subject {
            item_id: self.item_id,
            instance_id: self.instance_id,
        }
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary(&self) -> String {
        crate::narrate::narrate(self.action, &self.detail)
    }
}

/// An entry stamped by the audit logger but not yet given an id.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub timestamp: DateTime<Utc>,
    pub action: ActivityAction,
    pub subject: Subject,
    pub detail: LogDetail,
}

impl PendingEntry {
    /// Finish the entry with the id the log store assigned.
    #[must_use]
    pub fn into_entry(self, id: LogEntryId) -> LogEntry {
        LogEntry {
            v: LOG_ENTRY_VERSION,
            id,
            timestamp: self.timestamp,
            action: self.action,
            item_id: self.subject.item_id,
            instance_id: self.subject.instance_id,
            detail: self.detail,
        }
    }
}
