//! Activity log reads.

use tally_core::entities::LogEntry;
use tally_core::ids::ItemId;
use tally_core::store::{InstanceStore, LogFilter, LogStore, RecordStore};

use crate::error::ServiceError;
use crate::service::TallyService;

impl<S, L> TallyService<S, L>
where
    S: RecordStore + InstanceStore,
    L: LogStore,
{
    /// The newest `limit` entries, newest first.
    pub async fn list_activity(&self, limit: u32) -> Result<Vec<LogEntry>, ServiceError> {
        Ok(self.audit().list(limit).await?)
    }

    /// Entries matching `filter`, newest first.
    pub async fn query_activity(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, ServiceError> {
        Ok(self.audit().query(filter).await?)
    }

    /// Entries about one item, including ones written after it was deleted.
    pub async fn item_activity(
        &self,
        item_id: ItemId,
        limit: Option<u32>,
    ) -> Result<Vec<LogEntry>, ServiceError> {
        self.query_activity(&LogFilter {
            item_id: Some(item_id),
            action: None,
            limit,
        })
        .await
    }
}
