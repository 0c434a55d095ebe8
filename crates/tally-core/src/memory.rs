//! In-process store implementing every persistence contract.
//!
//! Used by tests and by callers that do not need durability. Ids start at 1
//! and are never reused.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::entities::{CanonicalRecord, Instance, InstanceFields, LogEntry, PendingEntry};
use crate::errors::CoreError;
use crate::ids::{InstanceId, ItemId, LogEntryId};
use crate::store::{InstanceStore, LogFilter, LogStore, RecordStore};
use crate::updates::{InstanceUpdate, ItemUpdate};

#[derive(Default)]
struct Inner {
    items: BTreeMap<ItemId, CanonicalRecord>,
    instances: BTreeMap<InstanceId, Instance>,
    log: Vec<LogEntry>,
    next_item: ItemId,
    next_instance: InstanceId,
    log_unavailable: bool,
}

/// Records, instances, and log entries held in memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent log append fail, to exercise degraded auditing.
    pub async fn set_log_unavailable(&self, unavailable: bool) {
        self.inner.lock().await.log_unavailable = unavailable;
    }

    pub async fn log_len(&self) -> usize {
        self.inner.lock().await.log.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &CanonicalRecord) -> Result<ItemId, CoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_item += 1;
        let id = inner.next_item;
        inner.items.insert(id, record.clone().with_id(id));
        Ok(id)
    }

    async fn update(&self, id: ItemId, update: &ItemUpdate) -> Result<CanonicalRecord, CoreError> {
        let mut inner = self.inner.lock().await;
        let current = inner
            .items
            .get(&id)
            .ok_or_else(|| CoreError::item_not_found(id))?;
        if let Some(expected) = update.expected_revision {
            if expected != current.revision {
                return Err(CoreError::Conflict {
                    id,
                    expected,
                    actual: current.revision,
                });
            }
        }
        let updated = update.apply(current);
        inner.items.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: ItemId) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        if inner.items.remove(&id).is_none() {
            return Err(CoreError::item_not_found(id));
        }
        inner.instances.retain(|_, instance| instance.item_id != id);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<CanonicalRecord>, CoreError> {
        Ok(self.inner.lock().await.items.values().cloned().collect())
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Option<CanonicalRecord>, CoreError> {
        Ok(self.inner.lock().await.items.get(&id).cloned())
    }
}

#[async_trait]
impl InstanceStore for MemoryStore {
    async fn insert_instance(
        &self,
        item_id: ItemId,
        fields: &InstanceFields,
    ) -> Result<Instance, CoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.items.contains_key(&item_id) {
            return Err(CoreError::item_not_found(item_id));
        }
        inner.next_instance += 1;
        let instance = Instance {
            id: inner.next_instance,
            item_id,
            fields: fields.clone(),
        };
        inner.instances.insert(instance.id, instance.clone());
        Ok(instance)
    }

    async fn update_instance(
        &self,
        id: InstanceId,
        update: &InstanceUpdate,
    ) -> Result<Instance, CoreError> {
        let mut inner = self.inner.lock().await;
        let instance = inner
            .instances
            .get_mut(&id)
            .ok_or_else(|| CoreError::instance_not_found(id))?;
        instance.fields = update.apply(&instance.fields);
        Ok(instance.clone())
    }

    async fn delete_instance(&self, id: InstanceId) -> Result<(), CoreError> {
        self.inner
            .lock()
            .await
            .instances
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::instance_not_found(id))
    }

    async fn get_instance(&self, id: InstanceId) -> Result<Option<Instance>, CoreError> {
        Ok(self.inner.lock().await.instances.get(&id).cloned())
    }

    async fn instances_for(&self, item_id: ItemId) -> Result<Vec<Instance>, CoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .instances
            .values()
            .filter(|i| i.item_id == item_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn append(&self, entry: &PendingEntry) -> Result<LogEntryId, CoreError> {
        let mut inner = self.inner.lock().await;
        if inner.log_unavailable {
            return Err(CoreError::Unavailable("log store offline".to_string()));
        }
        let id = LogEntryId::try_from(inner.log.len())
            .map_err(|e| CoreError::Other(e.into()))?
            + 1;
        inner.log.push(entry.clone().into_entry(id));
        Ok(id)
    }

    async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, CoreError> {
        let inner = self.inner.lock().await;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(inner
            .log
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updates::ItemUpdateBuilder;
    use pretty_assertions::assert_eq;

    fn record(name: &str) -> CanonicalRecord {
        CanonicalRecord {
            nomenclature: name.to_string(),
            quantity_authorized: 4.0,
            quantity_short: 4.0,
            ..CanonicalRecord::default()
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let ids = store
            .insert_many(&[record("Radio"), record("Antenna")])
            .await
            .unwrap();
        assert_eq!(ids, vec![1, 2]);
        let stored = store.get_by_id(2).await.unwrap().unwrap();
        assert_eq!(stored.id, Some(2));
        assert_eq!(stored.nomenclature, "Antenna");
    }

    #[tokio::test]
    async fn stale_revision_conflicts() {
        let store = MemoryStore::new();
        let id = store.insert(&record("Radio")).await.unwrap();

        let first = ItemUpdateBuilder::new()
            .quantity_on_hand(1.0)
            .expected_revision(0)
            .build();
        let updated = store.update(id, &first).await.unwrap();
        assert_eq!(updated.revision, 1);

        let stale = ItemUpdateBuilder::new()
            .quantity_on_hand(2.0)
            .expected_revision(0)
            .build();
        let err = store.update(id, &stale).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Conflict {
                expected: 0,
                actual: 1,
                ..
            }
        ));
        let current = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(current.quantity_on_hand, 1.0);
    }

    #[tokio::test]
    async fn flag_update_leaves_stored_shortage_alone() {
        let store = MemoryStore::new();
        let stored = CanonicalRecord {
            quantity_authorized: 6.0,
            quantity_short: 2.0,
            ..record("Radio")
        };
        let id = store.insert(&stored).await.unwrap();
        let before = store.get_by_id(id).await.unwrap().unwrap();

        let flag = ItemUpdateBuilder::new().is_flagged(true).build();
        let after = store.update(id, &flag).await.unwrap();

        let changes = crate::changes::diff_records(&before, &after);
        assert!(changes.is_only(crate::enums::Field::IsFlagged));
        assert_eq!(changes.classify(), crate::enums::ActivityAction::Flagged);
    }

    #[tokio::test]
    async fn delete_cascades_to_instances() {
        let store = MemoryStore::new();
        let id = store.insert(&record("Radio")).await.unwrap();
        store
            .insert_instance(
                id,
                &InstanceFields {
                    serial_number: "SN-1".to_string(),
                    ..InstanceFields::default()
                },
            )
            .await
            .unwrap();

        store.delete(id).await.unwrap();
        assert!(store.get_by_id(id).await.unwrap().is_none());
        assert!(store.instances_for(id).await.unwrap().is_empty());
        assert!(matches!(
            store.delete(id).await.unwrap_err(),
            CoreError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn instance_requires_existing_item() {
        let store = MemoryStore::new();
        let err = store
            .insert_instance(42, &InstanceFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
