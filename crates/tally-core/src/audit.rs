//! The audit logger.
//!
//! Turns change sets and payloads into log entries, stamps them with a
//! per-process monotonic timestamp, and appends them through a [`LogStore`].
//! Failures come back as [`AuditError`]; they are never panics and callers
//! treat them as advisory.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::changes::ChangeSet;
use crate::entities::{LogDetail, LogEntry, PendingEntry, Subject};
use crate::enums::ActivityAction;
use crate::errors::{AuditError, CoreError};
use crate::ids::LogEntryId;
use crate::store::{LogFilter, LogStore};

/// Wall clock that never goes backwards and never repeats within a process.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_micros: AtomicI64,
}

impl MonotonicClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_micros: AtomicI64::new(i64::MIN),
        }
    }

    /// Current time, bumped by one microsecond past the previous reading if
    /// the wall clock has not advanced.
    pub fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_micros();
        let mut last = self.last_micros.load(Ordering::Relaxed);
        loop {
            let next = wall.max(last.saturating_add(1));
            match self.last_micros.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return DateTime::from_timestamp_micros(next).unwrap_or_else(Utc::now),
                Err(observed) => last = observed,
            }
        }
    }
}

/// Writes and reads activity log entries.
pub struct AuditLogger<L> {
    store: L,
    clock: MonotonicClock,
}

impl<L: LogStore> AuditLogger<L> {
    #[must_use]
    pub const fn new(store: L) -> Self {
        Self {
            store,
            clock: MonotonicClock::new(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &L {
        &self.store
    }

    /// Append one entry.
    ///
    /// A change-set detail must not be empty; an empty change set means the
    /// mutation was a no-op and nothing should be logged.
    pub async fn record(
        &self,
        action: ActivityAction,
        subject: Subject,
        detail: LogDetail,
    ) -> Result<LogEntryId, AuditError> {
        if matches!(detail, LogDetail::Changes(ref changes) if changes.is_empty()) {
            return Err(AuditError::EmptyChangeSet {
                action: action.to_string(),
            });
        }

        let entry = PendingEntry {
            timestamp: self.clock.now(),
            action,
            subject,
            detail,
        };
        let id = self.store.append(&entry).await?;
        tracing::debug!(entry_id = id, %action, item_id = ?subject.item_id, "audit entry appended");
        Ok(id)
    }

    /// Append an entry carrying a change set.
    pub async fn record_changes(
        &self,
        action: ActivityAction,
        subject: Subject,
        changes: ChangeSet,
    ) -> Result<LogEntryId, AuditError> {
        self.record(action, subject, LogDetail::Changes(changes))
            .await
    }

    /// Append an entry carrying a serialized payload.
    pub async fn record_payload<T: Serialize + Sync>(
        &self,
        action: ActivityAction,
        subject: Subject,
        payload: &T,
    ) -> Result<LogEntryId, AuditError> {
        let value = serde_json::to_value(payload)?;
        self.record(action, subject, LogDetail::Payload(value))
            .await
    }

    /// The `limit` most recent entries, newest first.
    pub async fn list(&self, limit: u32) -> Result<Vec<LogEntry>, CoreError> {
        self.store.query_recent(limit).await
    }

    pub async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, CoreError> {
        self.store.query(filter).await
    }
}
