//! Database and service error types for tally-db.

use tally_core::errors::CoreError;
use tally_core::responses::ImportSummary;
use tally_ingest::AliasError;
use tally_schema::MigrationError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DatabaseError> for CoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::LibSql(e) => Self::Unavailable(e.to_string()),
            DatabaseError::Other(e) => Self::Other(e),
            other => Self::Other(other.into()),
        }
    }
}

/// Errors returned to callers of [`crate::TallyService`].
///
/// Activity log failures never appear here; they are reported through
/// `AuditStatus` on the mutation's outcome.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Record or instance store failure, including not-found and revision
    /// conflicts.
    #[error(transparent)]
    Store(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Aliases(#[from] AliasError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// A batch import hit a store failure part-way. Rows counted in
    /// `summary` were persisted and stand.
    #[error("Import stopped after {} accepted rows: {source}", summary.accepted)]
    PartialImport {
        summary: Box<ImportSummary>,
        #[source]
        source: CoreError,
    },

    /// The request is well-formed but cannot apply to the current record.
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl ServiceError {
    /// Whether this is a not-found error from the store.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(CoreError::NotFound { .. }))
    }

    /// Whether this is a stale `expected_revision`.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(CoreError::Conflict { .. }))
    }
}
