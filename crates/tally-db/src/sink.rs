//! Configured activity log backend.

use std::sync::Arc;

use async_trait::async_trait;

use tally_core::entities::{LogEntry, PendingEntry};
use tally_core::errors::CoreError;
use tally_core::ids::LogEntryId;
use tally_core::store::{LogFilter, LogStore};

use crate::TallyDb;
use crate::trail::JsonlLogStore;

/// The log store selected by `storage.log_backend`.
pub enum LogSink {
    /// The `activity_log` table of the shared database.
    Database(Arc<TallyDb>),
    /// `activity.jsonl` in the trail directory.
    Jsonl(JsonlLogStore),
}

impl LogSink {
    /// Backend name, as spelled in configuration.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Jsonl(_) => "jsonl",
        }
    }
}

#[async_trait]
impl LogStore for LogSink {
    async fn append(&self, entry: &PendingEntry) -> Result<LogEntryId, CoreError> {
        match self {
            Self::Database(db) => db.append(entry).await,
            Self::Jsonl(store) => store.append(entry).await,
        }
    }

    async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, CoreError> {
        match self {
            Self::Database(db) => db.query(filter).await,
            Self::Jsonl(store) => store.query(filter).await,
        }
    }
}
