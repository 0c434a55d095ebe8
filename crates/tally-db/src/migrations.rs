//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time. Each file runs once, in
//! order, tracked by `PRAGMA user_version`; statements also use
//! `IF NOT EXISTS` so a re-run is harmless. Later versions may only add
//! tables and columns.

use crate::TallyDb;
use crate::error::DatabaseError;

/// Items, instances, activity log, meta.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

const MIGRATIONS: &[(u32, &str, &str)] = &[(1, "001_initial", MIGRATION_001)];

/// Latest database schema version.
pub const SCHEMA_VERSION: u32 = 1;

impl TallyDb {
    /// Run all embedded migrations newer than the database's version.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let current = self.schema_version().await?;
        for (version, name, sql) in MIGRATIONS {
            if *version <= current {
                continue;
            }
            self.conn
                .execute_batch(sql)
                .await
                .map_err(|e| DatabaseError::Migration(format!("{name}: {e}")))?;
            self.conn
                .execute(&format!("PRAGMA user_version = {version}"), ())
                .await
                .map_err(|e| DatabaseError::Migration(format!("{name}: {e}")))?;
            tracing::debug!(migration = name, "applied migration");
        }
        self.conn
            .execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES ('record_version', ?1)",
                [tally_schema::CURRENT_RECORD_VERSION.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Migration(format!("record_version: {e}")))?;
        Ok(())
    }

    /// The database's applied schema version.
    pub(crate) async fn schema_version(&self) -> Result<u32, DatabaseError> {
        let mut rows = self.conn.query("PRAGMA user_version", ()).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let version = row.get::<i64>(0)?;
        u32::try_from(version)
            .map_err(|_| DatabaseError::InvalidState(format!("bad user_version {version}")))
    }
}
