//! Instance repository: per-unit sub-records of an item.

use tally_core::audit_detail::InstanceSnapshot;
use tally_core::changes::diff_instances;
use tally_core::entities::{Instance, InstanceFields, Subject};
use tally_core::enums::ActivityAction;
use tally_core::errors::CoreError;
use tally_core::ids::{InstanceId, ItemId};
use tally_core::responses::{AuditStatus, MutationOutcome};
use tally_core::store::{InstanceStore, LogStore, RecordStore};
use tally_core::updates::InstanceUpdate;

use crate::error::ServiceError;
use crate::service::TallyService;

impl<S, L> TallyService<S, L>
where
    S: RecordStore + InstanceStore,
    L: LogStore,
{
    /// Attach an instance to an item. Logs `instance_added`.
    pub async fn add_instance(
        &self,
        item_id: ItemId,
        mut fields: InstanceFields,
    ) -> Result<MutationOutcome<Instance>, ServiceError> {
        fields.serial_number = fields.serial_number.trim().to_string();
        if fields.serial_number.is_empty() {
            return Err(ServiceError::Invalid(
                "instance serial number is empty".to_string(),
            ));
        }
        let instance = self.store().insert_instance(item_id, &fields).await?;
        let audit = self
            .log_payload(
                ActivityAction::InstanceAdded,
                Subject::instance(item_id, instance.id),
                &InstanceSnapshot::from(&instance),
            )
            .await;
        Ok(MutationOutcome::new(instance, audit))
    }

    pub(crate) async fn require_instance(&self, id: InstanceId) -> Result<Instance, ServiceError> {
        self.store()
            .get_instance(id)
            .await?
            .ok_or_else(|| CoreError::instance_not_found(id).into())
    }

    /// Apply a partial instance update. Logs `instance_edited` with the
    /// instance-level change set; a no-op update is `Skipped`.
    pub async fn update_instance(
        &self,
        id: InstanceId,
        update: &InstanceUpdate,
    ) -> Result<MutationOutcome<Instance>, ServiceError> {
        let current = self.require_instance(id).await?;
        if update
            .serial_number
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            return Err(ServiceError::Invalid(
                "instance serial number is empty".to_string(),
            ));
        }
        if diff_instances(&current.fields, &update.apply(&current.fields)).is_empty() {
            return Ok(MutationOutcome::new(current, AuditStatus::Skipped));
        }

        let updated = self.store().update_instance(id, update).await?;
        let changes = diff_instances(&current.fields, &updated.fields);
        let audit = self
            .log_changes(
                ActivityAction::InstanceEdited,
                Subject::instance(updated.item_id, id),
                changes,
            )
            .await;
        Ok(MutationOutcome::new(updated, audit))
    }

    /// Remove an instance. Logs `instance_deleted` with its snapshot.
    pub async fn delete_instance(
        &self,
        id: InstanceId,
    ) -> Result<MutationOutcome<InstanceSnapshot>, ServiceError> {
        let current = self.require_instance(id).await?;
        self.store().delete_instance(id).await?;

        let snapshot = InstanceSnapshot::from(&current);
        let audit = self
            .log_payload(
                ActivityAction::InstanceDeleted,
                Subject::instance(current.item_id, id),
                &snapshot,
            )
            .await;
        Ok(MutationOutcome::new(snapshot, audit))
    }

    /// Instances of an existing item.
    pub async fn list_instances(&self, item_id: ItemId) -> Result<Vec<Instance>, ServiceError> {
        self.require_item(item_id).await?;
        Ok(self.store().instances_for(item_id).await?)
    }
}
