//! Shared test utilities for tally-db tests.

pub(crate) mod helpers {
    use std::sync::Arc;

    use tally_core::entities::CanonicalRecord;
    use tally_core::memory::MemoryStore;
    use tally_ingest::AliasTable;

    use crate::TallyDb;
    use crate::service::{LocalService, TallyService};

    /// An empty in-memory database.
    pub async fn test_db() -> TallyDb {
        TallyDb::open_in_memory().await.unwrap()
    }

    /// An in-memory service logging to its own database.
    pub async fn test_service() -> LocalService {
        LocalService::in_memory(AliasTable::builtin()).await.unwrap()
    }

    /// An in-memory service whose log store rejects every append.
    pub async fn test_service_with_failing_log()
    -> (TallyService<Arc<TallyDb>, Arc<MemoryStore>>, Arc<MemoryStore>) {
        let db = Arc::new(test_db().await);
        let log = Arc::new(MemoryStore::new());
        log.set_log_unavailable(true).await;
        let svc = TallyService::new(db, Arc::clone(&log), AliasTable::builtin());
        (svc, log)
    }

    /// The record from the worked example: 10 authorized, 7 on hand.
    pub fn radio() -> CanonicalRecord {
        CanonicalRecord {
            nomenclature: "Radio".to_string(),
            line_item_number: "a1b2c3".to_string(),
            stock_number: "1005-01-123-4567".to_string(),
            unit_of_issue: "EA".to_string(),
            quantity_authorized: 10.0,
            quantity_on_hand: 7.0,
            quantity_short: 3.0,
            ..CanonicalRecord::default()
        }
    }
}
