//! Batch import: raw rows to persisted records, one `imported` log entry
//! per batch.
//!
//! Rows are independent. A row that cannot be read is rejected by index and
//! the batch carries on, unless `stop_on_error` is set. Cancellation is
//! checked between rows; whatever was persisted before it stands, and the
//! summary counts only rows actually applied.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use tally_core::audit_detail::ImportedDetail;
use tally_core::entities::{CanonicalRecord, InstanceFields, Subject};
use tally_core::enums::ActivityAction;
use tally_core::errors::CoreError;
use tally_core::responses::{ImportSummary, MutationOutcome};
use tally_core::store::{InstanceStore, LogStore, RecordStore};

use crate::error::ServiceError;
use crate::service::TallyService;

/// Options for one import batch.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Where the rows came from, recorded in the log payload.
    pub source: Option<String>,
    /// Abort at the first rejected row.
    pub stop_on_error: bool,
    /// Set from another task to abort between rows.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ImportOptions {
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub const fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// A row converted to what gets persisted.
type Converted = (CanonicalRecord, Vec<InstanceFields>);

impl<S, L> TallyService<S, L>
where
    S: RecordStore + InstanceStore,
    L: LogStore,
{
    /// Import spreadsheet rows, each a JSON object of header to cell value.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::PartialImport` if the record store fails
    /// mid-batch. Rejected rows are not errors; they are listed in the
    /// summary.
    pub async fn import_rows<I>(
        &self,
        rows: I,
        options: &ImportOptions,
    ) -> Result<MutationOutcome<ImportSummary>, ServiceError>
    where
        I: IntoIterator<Item = Value>,
    {
        self.run_import(rows, options, |index, raw| {
            self.normalizer()
                .normalize_json(index, raw)
                .map(|row| (row.record, row.instance.into_iter().collect()))
                .map_err(|e| e.to_string())
        })
        .await
    }

    /// Import records stored under an older schema version, upgrading each
    /// through `tally_schema::migrate`.
    ///
    /// # Errors
    ///
    /// As [`Self::import_rows`]. Records that fail to migrate are rejected.
    pub async fn import_legacy<I>(
        &self,
        records: I,
        from_version: u32,
        options: &ImportOptions,
    ) -> Result<MutationOutcome<ImportSummary>, ServiceError>
    where
        I: IntoIterator<Item = Value>,
    {
        self.run_import(records, options, |_, raw| {
            tally_schema::migrate(raw, from_version)
                .map(|m| (m.record, m.instances))
                .map_err(|e| e.to_string())
        })
        .await
    }

    async fn run_import<I, F>(
        &self,
        rows: I,
        options: &ImportOptions,
        convert: F,
    ) -> Result<MutationOutcome<ImportSummary>, ServiceError>
    where
        I: IntoIterator<Item = Value>,
        F: Fn(usize, &Value) -> Result<Converted, String>,
    {
        let mut summary = ImportSummary::default();
        let mut failure = None;

        for (index, raw) in rows.into_iter().enumerate() {
            if options.is_cancelled() {
                tracing::info!(row = index, "import cancelled");
                summary.aborted = true;
                break;
            }
            let (record, instances) = match convert(index, &raw) {
                Ok(converted) => converted,
                Err(reason) => {
                    tracing::warn!(row = index, %reason, "row rejected");
                    summary.rejected.push(index);
                    if options.stop_on_error {
                        summary.aborted = true;
                        break;
                    }
                    continue;
                }
            };
            if let Err(e) = self.persist_row(record, &instances, &mut summary).await {
                tracing::warn!(row = index, error = %e, "record store failed, import stopped");
                summary.aborted = true;
                failure = Some(e);
                break;
            }
        }

        tracing::info!(
            accepted = summary.accepted,
            rejected = summary.rejected.len(),
            instances = summary.instances_created,
            aborted = summary.aborted,
            "import finished"
        );
        let detail = ImportedDetail {
            accepted: summary.accepted,
            rejected: summary.rejected.clone(),
            source: options.source.clone(),
            aborted: summary.aborted,
        };
        let audit = self
            .log_payload(ActivityAction::Imported, Subject::none(), &detail)
            .await;

        match failure {
            Some(source) => Err(ServiceError::PartialImport {
                summary: Box::new(summary),
                source,
            }),
            None => Ok(MutationOutcome::new(summary, audit)),
        }
    }

    async fn persist_row(
        &self,
        mut record: CanonicalRecord,
        instances: &[InstanceFields],
        summary: &mut ImportSummary,
    ) -> Result<(), CoreError> {
        record.id = None;
        record.revision = 0;
        let id = self.store().insert(&record).await?;
        summary.accepted += 1;
        summary.item_ids.push(id);
        for fields in instances {
            self.store().insert_instance(id, fields).await?;
            summary.instances_created += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn radio_row() -> Value {
        json!({
            "Nomenclature": "Radio",
            "LIN": "a1b2c3",
            "NSN": "1005-01-123-4567",
            "Qty Authorized": "10",
            "Qty On Hand": "7",
            "Flag": "Y"
        })
    }

    #[tokio::test]
    async fn malformed_row_is_rejected_by_index() {
        let svc = test_service().await;
        let rows = vec![radio_row(), json!("not a mapping"), radio_row()];

        let outcome = svc
            .import_rows(rows, &ImportOptions::default().with_source("depot.csv"))
            .await
            .unwrap();
        assert_eq!(outcome.value.accepted, 2);
        assert_eq!(outcome.value.rejected, vec![1]);
        assert_eq!(svc.list_items(None).await.unwrap().len(), 2);

        let entries = svc.list_activity(10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ActivityAction::Imported);
        assert_eq!(entries[0].summary(), "imported 2 items (1 rejected)");
        assert_eq!(entries[0].detail.payload().unwrap()["source"], "depot.csv");
    }

    #[tokio::test]
    async fn imported_record_is_normalized() {
        let svc = test_service().await;
        svc.import_rows([radio_row()], &ImportOptions::default())
            .await
            .unwrap();

        let items = svc.list_items(None).await.unwrap();
        let item = &items[0];
        assert_eq!(item.nomenclature, "Radio");
        assert_eq!(item.quantity_short, 3.0);
        assert!(item.is_flagged);
        assert!(item.photos.is_empty());
        assert_eq!(item.notes, None);
    }

    #[tokio::test]
    async fn serial_number_creates_instance() {
        let svc = test_service().await;
        let mut row = radio_row();
        row["Serial Number"] = json!("SN-9");
        row["Location"] = json!("Cage 1");

        let outcome = svc
            .import_rows([row], &ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.value.instances_created, 1);

        let instances = svc.list_instances(outcome.value.item_ids[0]).await.unwrap();
        assert_eq!(instances[0].fields.serial_number, "SN-9");
        assert_eq!(instances[0].fields.location.as_deref(), Some("Cage 1"));
    }

    #[tokio::test]
    async fn stop_on_error_aborts_batch() {
        let svc = test_service().await;
        let rows = vec![radio_row(), json!(42), radio_row()];

        let outcome = svc
            .import_rows(rows, &ImportOptions::default().stop_on_error(true))
            .await
            .unwrap();
        assert_eq!(outcome.value.accepted, 1);
        assert_eq!(outcome.value.rejected, vec![1]);
        assert!(outcome.value.aborted);
        assert_eq!(svc.list_items(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_import_reports_applied_count() {
        let svc = test_service().await;
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let rows = (0..5).map(move |i| {
            if i == 2 {
                flag.store(true, Ordering::Relaxed);
            }
            radio_row()
        });

        let outcome = svc
            .import_rows(rows, &ImportOptions::default().with_cancel(cancel))
            .await
            .unwrap();
        assert_eq!(outcome.value.accepted, 2);
        assert!(outcome.value.aborted);
        assert_eq!(svc.list_items(None).await.unwrap().len(), 2);
        assert_eq!(
            svc.list_activity(1).await.unwrap()[0].summary(),
            "imported 2 items, aborted"
        );
    }

    #[tokio::test]
    async fn legacy_records_are_migrated() {
        let svc = test_service().await;
        let records = vec![
            json!({"name": "Radio", "lin": "a1b2c3", "nsn": "1005-01-123-4567",
                   "status": "flagged", "serial": "SN-1", "location": "Cage 2"}),
            json!(["not", "a", "record"]),
        ];

        let outcome = svc
            .import_legacy(records, 1, &ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.value.accepted, 1);
        assert_eq!(outcome.value.rejected, vec![1]);
        assert_eq!(outcome.value.instances_created, 1);

        let detail = svc.get_item(outcome.value.item_ids[0]).await.unwrap();
        assert_eq!(detail.item.nomenclature, "Radio");
        assert!(detail.item.is_flagged);
        assert_eq!(detail.instances[0].fields.serial_number, "SN-1");
    }
}
