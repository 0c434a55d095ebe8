//! Result types returned by service mutations and printed by `tally`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{CanonicalRecord, Instance};
use crate::errors::AuditError;
use crate::ids::{ItemId, LogEntryId};

/// Outcome of the audit write that accompanied a mutation.
///
/// Reported separately from the mutation itself: a `Failed` audit never
/// means the mutation was rolled back.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditStatus {
    Logged { entry_id: LogEntryId },
    /// The mutation changed nothing, so nothing was logged.
    Skipped,
    Failed { reason: String },
}

impl AuditStatus {
    #[must_use]
    pub const fn is_logged(&self) -> bool {
        matches!(self, Self::Logged { .. })
    }

    #[must_use]
    pub const fn entry_id(&self) -> Option<LogEntryId> {
        match self {
            Self::Logged { entry_id } => Some(*entry_id),
            Self::Skipped | Self::Failed { .. } => None,
        }
    }
}

impl From<Result<LogEntryId, AuditError>> for AuditStatus {
    fn from(result: Result<LogEntryId, AuditError>) -> Self {
        match result {
            Ok(entry_id) => Self::Logged { entry_id },
            Err(AuditError::EmptyChangeSet { .. }) => Self::Skipped,
            Err(e) => Self::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// A mutation result paired with the status of its audit entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MutationOutcome<T> {
    pub value: T,
    pub audit: AuditStatus,
}

impl<T> MutationOutcome<T> {
    #[must_use]
    pub const fn new(value: T, audit: AuditStatus) -> Self {
        Self { value, audit }
    }
}

/// Result of a batch import.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records actually persisted, not rows attempted.
    pub accepted: usize,
    /// Zero-based indexes of rows that could not be parsed.
    pub rejected: Vec<usize>,
    /// Ids of the persisted records, in row order.
    pub item_ids: Vec<ItemId>,
    /// Instances created from serial-number columns.
    pub instances_created: usize,
    /// True when the batch stopped before the last row.
    pub aborted: bool,
}

/// Response from `tally item get`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ItemDetailResponse {
    pub item: CanonicalRecord,
    pub instances: Vec<Instance>,
}

/// Response from `tally export`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExportResponse {
    pub count: usize,
    pub format: String,
    pub path: Option<String>,
    pub audit: AuditStatus,
}
