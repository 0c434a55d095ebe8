//! Export: the current record set as a header + rows table.
//!
//! Writing the table out (CSV, JSON) is the caller's job. The caller reports
//! back through [`TallyService::record_export`] once the output exists, so
//! the `exported` entry only describes exports that happened.

use tally_core::audit_detail::ExportedDetail;
use tally_core::entities::Subject;
use tally_core::enums::ActivityAction;
use tally_core::responses::AuditStatus;
use tally_core::store::{InstanceStore, LogStore, RecordStore};
use tally_ingest::ExportTable;

use crate::error::ServiceError;
use crate::service::TallyService;

impl<S, L> TallyService<S, L>
where
    S: RecordStore + InstanceStore,
    L: LogStore,
{
    /// All records under their display headers.
    pub async fn prepare_export(&self) -> Result<ExportTable, ServiceError> {
        let records = self.store().get_all().await?;
        Ok(tally_ingest::export_table(self.aliases(), &records))
    }

    /// Log a completed export. Logs `exported` with `{count, format}`.
    pub async fn record_export(&self, count: usize, format: &str) -> AuditStatus {
        self.log_payload(
            ActivityAction::Exported,
            Subject::none(),
            &ExportedDetail {
                count,
                format: format.to_string(),
            },
        )
        .await
    }
}
