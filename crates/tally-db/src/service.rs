//! Service layer orchestrating mutations with the activity log.
//!
//! `TallyService` wraps a record store, an [`AuditLogger`] over a log store,
//! the row normalizer, and the `SchemaRegistry`. Repo methods are
//! implemented in [`crate::repos`] as `impl TallyService` blocks.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use tally_config::{LogBackend, TallyConfig};
use tally_core::audit::AuditLogger;
use tally_core::changes::ChangeSet;
use tally_core::entities::{LogDetail, Subject};
use tally_core::enums::ActivityAction;
use tally_core::errors::AuditError;
use tally_core::responses::AuditStatus;
use tally_core::store::{InstanceStore, LogStore, RecordStore};
use tally_ingest::{AliasTable, RowNormalizer};
use tally_schema::SchemaRegistry;

use crate::TallyDb;
use crate::error::{DatabaseError, ServiceError};
use crate::sink::LogSink;
use crate::trail::JsonlLogStore;

/// Orchestrates record mutations and their activity log entries.
///
/// Every mutation method follows this protocol:
/// 1. Read the current snapshot
/// 2. Apply the mutation through the record store
/// 3. Diff old and new snapshots; an empty diff writes nothing
/// 4. Append one log entry, reporting (never raising) a log failure
pub struct TallyService<S, L> {
    store: S,
    audit: AuditLogger<L>,
    normalizer: RowNormalizer,
    schema: SchemaRegistry,
}

/// The service as the `tally` binary runs it.
pub type LocalService = TallyService<Arc<TallyDb>, LogSink>;

impl<S, L> TallyService<S, L>
where
    S: RecordStore + InstanceStore,
    L: LogStore,
{
    /// Create a service from its collaborators.
    #[must_use]
    pub fn new(store: S, log: L, aliases: AliasTable) -> Self {
        Self {
            store,
            audit: AuditLogger::new(log),
            normalizer: RowNormalizer::new(aliases),
            schema: SchemaRegistry::new(),
        }
    }

    /// Access the record store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Access the audit logger.
    #[must_use]
    pub const fn audit(&self) -> &AuditLogger<L> {
        &self.audit
    }

    #[must_use]
    pub const fn normalizer(&self) -> &RowNormalizer {
        &self.normalizer
    }

    /// The alias table in effect, built-ins plus configured extras.
    #[must_use]
    pub const fn aliases(&self) -> &AliasTable {
        self.normalizer.aliases()
    }

    /// Access the schema registry.
    #[must_use]
    pub const fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Log a change set. An empty change set is `Skipped`, not written.
    pub(crate) async fn log_changes(
        &self,
        action: ActivityAction,
        subject: Subject,
        changes: ChangeSet,
    ) -> AuditStatus {
        let status = AuditStatus::from(self.audit.record_changes(action, subject, changes).await);
        report(action, subject, &status);
        status
    }

    /// Log a payload. Payloads are validated against their schema first;
    /// a validation failure is only warned about.
    pub(crate) async fn log_payload<T: Serialize + Sync>(
        &self,
        action: ActivityAction,
        subject: Subject,
        payload: &T,
    ) -> AuditStatus {
        let value = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                let status = AuditStatus::from(Err(AuditError::Payload(e)));
                report(action, subject, &status);
                return status;
            }
        };
        if let Err(e) = self.schema.validate_payload(action, &value) {
            tracing::warn!(%action, error = %e, "activity payload failed schema validation");
        }
        let status = AuditStatus::from(
            self.audit
                .record(action, subject, LogDetail::Payload(value))
                .await,
        );
        report(action, subject, &status);
        status
    }
}

fn report(action: ActivityAction, subject: Subject, status: &AuditStatus) {
    if let AuditStatus::Failed { reason } = status {
        tracing::warn!(
            %action,
            item_id = ?subject.item_id,
            instance_id = ?subject.instance_id,
            %reason,
            "activity log write failed, mutation kept"
        );
    }
}

impl LocalService {
    /// Open the configured database and log backend under `project_root`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if configured aliases are invalid, or the
    /// database or trail directory cannot be opened.
    pub async fn open(config: &TallyConfig, project_root: &Path) -> Result<Self, ServiceError> {
        let aliases = AliasTable::builtin().with_extra(&config.aliases)?;

        let db_path = config.storage.db_path_in(project_root);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Other(e.into()))?;
        }
        let db = Arc::new(TallyDb::open_local(&db_path.to_string_lossy()).await?);

        let log = match config.storage.log_backend {
            LogBackend::Database => LogSink::Database(Arc::clone(&db)),
            LogBackend::Jsonl => {
                LogSink::Jsonl(JsonlLogStore::new(config.storage.trail_dir_in(project_root))?)
            }
        };
        tracing::debug!(db = %db_path.display(), log = log.name(), "service opened");
        Ok(Self::new(db, log, aliases))
    }

    /// An in-memory database logging to itself.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the database cannot be created.
    pub async fn in_memory(aliases: AliasTable) -> Result<Self, ServiceError> {
        let db = Arc::new(TallyDb::open_in_memory().await?);
        Ok(Self::new(Arc::clone(&db), LogSink::Database(db), aliases))
    }
}
