//! Persistence contracts.
//!
//! The core owns transformation logic only; identity assignment and
//! durability belong to whatever implements these traits. `tally-db`
//! provides libSQL and JSONL implementations, [`crate::memory`] an in-process
//! one.

use std::sync::Arc;

use async_trait::async_trait;

use crate::entities::{CanonicalRecord, Instance, InstanceFields, LogEntry, PendingEntry};
use crate::enums::ActivityAction;
use crate::errors::CoreError;
use crate::ids::{InstanceId, ItemId, LogEntryId};
use crate::updates::{InstanceUpdate, ItemUpdate};

/// Canonical record persistence.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record and return its assigned id. Any `id` already on
    /// `record` is ignored.
    async fn insert(&self, record: &CanonicalRecord) -> Result<ItemId, CoreError>;

    /// Persist several records, returning ids in input order.
    async fn insert_many(&self, records: &[CanonicalRecord]) -> Result<Vec<ItemId>, CoreError> {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(self.insert(record).await?);
        }
        Ok(ids)
    }

    /// Apply a partial update and return the stored post-update record.
    ///
    /// Fails with `NotFound` for an unknown id and with `Conflict` when the
    /// update carries a stale `expected_revision`.
    async fn update(&self, id: ItemId, update: &ItemUpdate) -> Result<CanonicalRecord, CoreError>;

    /// Delete a record together with its instances.
    async fn delete(&self, id: ItemId) -> Result<(), CoreError>;

    async fn get_all(&self) -> Result<Vec<CanonicalRecord>, CoreError>;

    async fn get_by_id(&self, id: ItemId) -> Result<Option<CanonicalRecord>, CoreError>;
}

/// Instance persistence.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    async fn insert_instance(
        &self,
        item_id: ItemId,
        fields: &InstanceFields,
    ) -> Result<Instance, CoreError>;

    async fn update_instance(
        &self,
        id: InstanceId,
        update: &InstanceUpdate,
    ) -> Result<Instance, CoreError>;

    async fn delete_instance(&self, id: InstanceId) -> Result<(), CoreError>;

    async fn get_instance(&self, id: InstanceId) -> Result<Option<Instance>, CoreError>;

    async fn instances_for(&self, item_id: ItemId) -> Result<Vec<Instance>, CoreError>;
}

/// Filter for activity log queries. All set criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub item_id: Option<ItemId>,
    pub action: Option<ActivityAction>,
    pub limit: Option<u32>,
}

impl LogFilter {
    #[must_use]
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.item_id.is_none_or(|id| entry.item_id == Some(id))
            && self.action.is_none_or(|a| entry.action == a)
    }
}

/// Append-only activity log persistence.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn append(&self, entry: &PendingEntry) -> Result<LogEntryId, CoreError>;

    /// Entries matching `filter`, newest first.
    async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, CoreError>;

    /// The `limit` most recent entries, newest first.
    async fn query_recent(&self, limit: u32) -> Result<Vec<LogEntry>, CoreError> {
        self.query(&LogFilter {
            limit: Some(limit),
            ..LogFilter::default()
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Shared handles
// ---------------------------------------------------------------------------

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn insert(&self, record: &CanonicalRecord) -> Result<ItemId, CoreError> {
        (**self).insert(record).await
    }

    async fn insert_many(&self, records: &[CanonicalRecord]) -> Result<Vec<ItemId>, CoreError> {
        (**self).insert_many(records).await
    }

    async fn update(&self, id: ItemId, update: &ItemUpdate) -> Result<CanonicalRecord, CoreError> {
        (**self).update(id, update).await
    }

    async fn delete(&self, id: ItemId) -> Result<(), CoreError> {
        (**self).delete(id).await
    }

    async fn get_all(&self) -> Result<Vec<CanonicalRecord>, CoreError> {
        (**self).get_all().await
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Option<CanonicalRecord>, CoreError> {
        (**self).get_by_id(id).await
    }
}

#[async_trait]
impl<T: InstanceStore + ?Sized> InstanceStore for Arc<T> {
    async fn insert_instance(
        &self,
        item_id: ItemId,
        fields: &InstanceFields,
    ) -> Result<Instance, CoreError> {
        (**self).insert_instance(item_id, fields).await
    }

    async fn update_instance(
        &self,
        id: InstanceId,
        update: &InstanceUpdate,
    ) -> Result<Instance, CoreError> {
        (**self).update_instance(id, update).await
    }

    async fn delete_instance(&self, id: InstanceId) -> Result<(), CoreError> {
        (**self).delete_instance(id).await
    }

    async fn get_instance(&self, id: InstanceId) -> Result<Option<Instance>, CoreError> {
        (**self).get_instance(id).await
    }

    async fn instances_for(&self, item_id: ItemId) -> Result<Vec<Instance>, CoreError> {
        (**self).instances_for(item_id).await
    }
}

#[async_trait]
impl<T: LogStore + ?Sized> LogStore for Arc<T> {
    async fn append(&self, entry: &PendingEntry) -> Result<LogEntryId, CoreError> {
        (**self).append(entry).await
    }

    async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, CoreError> {
        (**self).query(filter).await
    }
}
