//! Cross-cutting error types for Tally.
//!
//! `CoreError` is the error type of the store contracts. Concrete stores map
//! their own failures (`DatabaseError` in tally-db, I/O in the JSONL log)
//! into it. A unified error for the binary lives in `tally-cli`.

use thiserror::Error;

use crate::ids::ItemId;

/// Errors that can be raised by any Tally store or core operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: i64 },

    /// An update carried an expected revision that no longer matches.
    #[error("Revision conflict on item {id}: expected {expected}, found {actual}")]
    Conflict {
        id: ItemId,
        expected: u32,
        actual: u32,
    },

    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backing store could not be reached or rejected the write.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Shorthand for a missing canonical record.
    #[must_use]
    pub fn item_not_found(id: ItemId) -> Self {
        Self::NotFound {
            entity_type: "item".to_string(),
            id,
        }
    }

    /// Shorthand for a missing instance.
    #[must_use]
    pub fn instance_not_found(id: i64) -> Self {
        Self::NotFound {
            entity_type: "instance".to_string(),
            id,
        }
    }
}

/// Reported failure of an audit write.
///
/// Returned by `AuditLogger::record*`. Callers downgrade it to a warning and
/// never roll back the mutation the entry was describing.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A change-carrying action was recorded with an empty change set.
    #[error("Refusing to log '{action}' with an empty change set")]
    EmptyChangeSet { action: String },

    /// The payload could not be serialized.
    #[error("Failed to serialize audit payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The log store rejected or could not accept the write.
    #[error("Log store failure: {0}")]
    Store(#[from] CoreError),
}
