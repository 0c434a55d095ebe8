//! Identifier types.
//!
//! Identity is assigned by the stores, never by this crate. All stores hand
//! out auto-incrementing integers, so the aliases below are plain `i64`.

/// Identifier of a persisted canonical record.
pub type ItemId = i64;

/// Identifier of a persisted instance (per-unit sub-record).
pub type InstanceId = i64;

/// Identifier of an appended activity log entry.
pub type LogEntryId = i64;
