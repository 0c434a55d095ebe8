//! # tally-db
//!
//! Persistence and orchestration for Tally.
//!
//! - [`TallyDb`]: a libSQL database implementing the record, instance, and
//!   activity log contracts from `tally-core`
//! - [`trail::JsonlLogStore`]: an append-only JSONL activity log
//! - [`service::TallyService`]: normalizes, persists, diffs, and logs every
//!   mutation, keeping log failures advisory
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29).

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod sink;
pub mod store;
pub mod trail;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

pub use error::ServiceError;
pub use migrations::SCHEMA_VERSION;
pub use repos::import::ImportOptions;
pub use service::{LocalService, TallyService};
pub use sink::LogSink;
pub use trail::JsonlLogStore;

/// Central database handle for Tally state.
///
/// Wraps a libSQL database and connection. Record, instance, and log
/// operations are implemented in [`store`].
pub struct TallyDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl TallyDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let tally_db = Self { db, conn };
        tally_db.run_migrations().await?;
        Ok(tally_db)
    }

    /// Open an empty in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if migrations fail.
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::open_local(":memory:").await
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> TallyDb {
        TallyDb::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        for table in ["items", "instances", "activity_log", "meta"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
        assert_eq!(db.schema_version().await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn instances_cascade_with_items() {
        let db = test_db().await;
        db.conn()
            .execute("INSERT INTO items (nomenclature) VALUES ('Radio')", ())
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO instances (item_id, serial_number) VALUES (1, 'SN-1')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute("DELETE FROM items WHERE id = 1", ())
            .await
            .unwrap();

        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM instances", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }

    #[tokio::test]
    async fn negative_shortage_is_rejected_by_schema() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute("INSERT INTO items (quantity_short) VALUES (-1)", ())
            .await;
        assert!(result.is_err());
    }
}
