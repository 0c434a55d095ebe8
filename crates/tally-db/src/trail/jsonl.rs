//! Append-only JSONL log store.
//!
//! Uses `serde_jsonlines::append_json_lines` for per-line appends. Entry ids
//! are assigned sequentially from the number of lines already in the file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use tally_core::entities::{LogEntry, PendingEntry};
use tally_core::errors::CoreError;
use tally_core::ids::LogEntryId;
use tally_core::store::{LogFilter, LogStore};

use crate::error::DatabaseError;

const LOG_FILE: &str = "activity.jsonl";

/// Log store backed by a single JSONL file.
pub struct JsonlLogStore {
    path: PathBuf,
    /// Last assigned id, loaded from the file on first append.
    last_id: Mutex<Option<LogEntryId>>,
}

impl JsonlLogStore {
    /// Create a store writing to `{trail_dir}/activity.jsonl`.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created.
    pub fn new(trail_dir: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let trail_dir = trail_dir.into();
        std::fs::create_dir_all(&trail_dir).map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(Self {
            path: trail_dir.join(LOG_FILE),
            last_id: Mutex::new(None),
        })
    }

    /// The log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<Vec<Value>, DatabaseError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        serde_jsonlines::json_lines(&self.path)
            .map_err(|e| DatabaseError::Other(e.into()))?
            .collect::<Result<Vec<Value>, _>>()
            .map_err(|e| DatabaseError::Other(e.into()))
    }

    /// Decoded entries in file order. Lines that no longer decode are
    /// skipped with a warning.
    fn read_entries(&self) -> Result<Vec<LogEntry>, DatabaseError> {
        Ok(self
            .read_raw()?
            .into_iter()
            .enumerate()
            .filter_map(|(line, raw)| match tally_schema::upgrade_entry(raw) {
                Ok(entry) => Some(entry),
                Err(error) => {
                    tracing::warn!(line = line + 1, %error, "skipping undecodable log entry");
                    None
                }
            })
            .collect())
    }

    fn count_lines(&self) -> Result<LogEntryId, DatabaseError> {
        let count = self.read_raw()?.len();
        LogEntryId::try_from(count).map_err(|e| DatabaseError::Other(e.into()))
    }
}

#[async_trait]
impl LogStore for JsonlLogStore {
    async fn append(&self, entry: &PendingEntry) -> Result<LogEntryId, CoreError> {
        let mut last_id = self.last_id.lock().await;
        let previous = match *last_id {
            Some(id) => id,
            None => self.count_lines()?,
        };
        let id = previous + 1;
        let line = entry.clone().into_entry(id);
        serde_jsonlines::append_json_lines(&self.path, [&line])
            .map_err(|e| CoreError::Unavailable(format!("{}: {e}", self.path.display())))?;
        *last_id = Some(id);
        Ok(id)
    }

    async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, CoreError> {
        let _guard = self.last_id.lock().await;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(self
            .read_entries()?
            .into_iter()
            .rev()
            .filter(|e| filter.matches(e))
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tally_core::entities::{LogDetail, Subject};
    use tally_core::enums::ActivityAction;
    use tempfile::TempDir;

    fn exported(count: usize) -> PendingEntry {
        PendingEntry {
            timestamp: Utc::now(),
            action: ActivityAction::Exported,
            subject: Subject::none(),
            detail: LogDetail::Payload(json!({"count": count, "format": "csv"})),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let store = JsonlLogStore::new(dir.path().join("trail")).unwrap();
        assert_eq!(store.append(&exported(1)).await.unwrap(), 1);
        assert_eq!(store.append(&exported(2)).await.unwrap(), 2);

        let reopened = JsonlLogStore::new(dir.path().join("trail")).unwrap();
        assert_eq!(reopened.append(&exported(3)).await.unwrap(), 3);

        let entries = reopened.query_recent(10).await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn empty_log_queries_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonlLogStore::new(dir.path()).unwrap();
        assert!(store.query_recent(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn legacy_lines_are_upgraded() {
        let dir = TempDir::new().unwrap();
        let store = JsonlLogStore::new(dir.path()).unwrap();
        serde_jsonlines::append_json_lines(
            store.path(),
            [json!({
                "id": 1,
                "ts": "2025-01-02T03:04:05Z",
                "action": "removed",
                "itemId": 9,
                "details": {"nomenclature": "Radio", "line_item_number": "a1b2c3",
                            "stock_number": "1005-01-123-4567", "quantity_on_hand": 0.0, "id": 9}
            })],
        )
        .unwrap();
        store.append(&exported(4)).await.unwrap();

        let entries = store
            .query(&LogFilter {
                action: Some(ActivityAction::Deleted),
                ..LogFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item_id, Some(9));
        assert_eq!(entries[0].summary(), "deleted Radio (LIN a1b2c3)");
    }

    #[tokio::test]
    async fn unknown_legacy_field_does_not_hide_other_entries() {
        let dir = TempDir::new().unwrap();
        let store = JsonlLogStore::new(dir.path()).unwrap();
        serde_jsonlines::append_json_lines(
            store.path(),
            [
                json!({
                    "id": 1,
                    "ts": "2025-01-02T03:04:05Z",
                    "action": "updated",
                    "itemId": 9,
                    "changes": [
                        {"field": "description", "from": "Cable", "to": "Cable, coax"},
                        {"field": "category", "from": "comms", "to": "power"}
                    ]
                }),
                json!({"id": 2, "ts": "2025-01-02T03:05:00Z", "action": "teleported"}),
            ],
        )
        .unwrap();
        store.append(&exported(1)).await.unwrap();

        let entries = store.query_recent(10).await.unwrap();
        let actions: Vec<_> = entries.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![ActivityAction::Exported, ActivityAction::Edited]);
        assert_eq!(
            entries[1].summary(),
            "changed nomenclature from \"Cable\" to \"Cable, coax\""
        );
    }
}
