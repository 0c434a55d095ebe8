//! Item repository: add, read, update, and delete canonical records.
//!
//! Direct-entry mutations go through [`TallyService::update_item`], which
//! diffs the stored snapshot against the result and classifies the change
//! set into one activity action. Convenience methods (flag, verify, photos,
//! notes) are thin wrappers that build an `ItemUpdate`.

use chrono::{DateTime, Utc};

use tally_core::audit_detail::ItemSnapshot;
use tally_core::changes::diff_records;
use tally_core::entities::{CanonicalRecord, Subject};
use tally_core::enums::{ActivityAction, UnitOfIssue};
use tally_core::errors::CoreError;
use tally_core::ids::ItemId;
use tally_core::responses::{AuditStatus, ItemDetailResponse, MutationOutcome};
use tally_core::store::{InstanceStore, LogStore, RecordStore};
use tally_core::updates::{ItemUpdate, ItemUpdateBuilder};

use crate::error::ServiceError;
use crate::service::TallyService;

fn check_quantity(field: &str, value: f64) -> Result<(), ServiceError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ServiceError::Invalid(format!(
            "{field} must be a non-negative number, got {value}"
        )))
    }
}

fn blank_to_none(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

impl<S, L> TallyService<S, L>
where
    S: RecordStore + InstanceStore,
    L: LogStore,
{
    /// Add a record entered directly (not imported). Logs `item_added`.
    pub async fn add_item(
        &self,
        mut record: CanonicalRecord,
    ) -> Result<MutationOutcome<CanonicalRecord>, ServiceError> {
        check_quantity("quantity_authorized", record.quantity_authorized)?;
        check_quantity("quantity_on_hand", record.quantity_on_hand)?;
        record.id = None;
        record.revision = 0;
        record.unit_of_issue = UnitOfIssue::normalize(&record.unit_of_issue);
        record.notes = blank_to_none(record.notes);
        record.recompute_short();

        let id = self.store().insert(&record).await?;
        let record = record.with_id(id);
        let audit = self
            .log_payload(
                ActivityAction::ItemAdded,
                Subject::item(id),
                &ItemSnapshot::of(&record, 0),
            )
            .await;
        Ok(MutationOutcome::new(record, audit))
    }

    /// A record and its instances.
    pub async fn get_item(&self, id: ItemId) -> Result<ItemDetailResponse, ServiceError> {
        let item = self.require_item(id).await?;
        let instances = self.store().instances_for(id).await?;
        Ok(ItemDetailResponse { item, instances })
    }

    /// All records in insertion order, optionally truncated.
    pub async fn list_items(&self, limit: Option<u32>) -> Result<Vec<CanonicalRecord>, ServiceError> {
        let mut items = self.store().get_all().await?;
        if let Some(limit) = limit {
            items.truncate(limit as usize);
        }
        Ok(items)
    }

    pub(crate) async fn require_item(&self, id: ItemId) -> Result<CanonicalRecord, ServiceError> {
        self.store()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::item_not_found(id).into())
    }

    /// Apply a partial update and log what actually changed.
    ///
    /// An update that changes nothing is not written and not logged; its
    /// outcome carries `AuditStatus::Skipped`. A stale `expected_revision`
    /// is a conflict and nothing is written.
    pub async fn update_item(
        &self,
        id: ItemId,
        update: &ItemUpdate,
    ) -> Result<MutationOutcome<CanonicalRecord>, ServiceError> {
        if let Some(v) = update.quantity_authorized {
            check_quantity("quantity_authorized", v)?;
        }
        if let Some(v) = update.quantity_on_hand {
            check_quantity("quantity_on_hand", v)?;
        }

        let current = self.require_item(id).await?;
        if let Some(expected) = update.expected_revision {
            if expected != current.revision {
                return Err(CoreError::Conflict {
                    id,
                    expected,
                    actual: current.revision,
                }
                .into());
            }
        }

        let mut update = update.clone();
        if let Some(ref unit) = update.unit_of_issue {
            update.unit_of_issue = Some(UnitOfIssue::normalize(unit));
        }
        if let Some(notes) = update.notes.take() {
            update.notes = Some(blank_to_none(notes));
        }

        if diff_records(&current, &update.apply(&current)).is_empty() {
            tracing::debug!(item_id = id, "update changes nothing, not written");
            return Ok(MutationOutcome::new(current, AuditStatus::Skipped));
        }

        let updated = self.store().update(id, &update).await?;
        let changes = diff_records(&current, &updated);
        let action = changes.classify();
        let audit = self.log_changes(action, Subject::item(id), changes).await;
        Ok(MutationOutcome::new(updated, audit))
    }

    /// Set or clear the attention flag. Logs `flagged` / `unflagged`.
    pub async fn flag_item(
        &self,
        id: ItemId,
        flagged: bool,
    ) -> Result<MutationOutcome<CanonicalRecord>, ServiceError> {
        self.update_item(id, &ItemUpdateBuilder::new().is_flagged(flagged).build())
            .await
    }

    /// Mark the item verified at `at` (now when `None`). Logs `verified`.
    pub async fn verify_item(
        &self,
        id: ItemId,
        at: Option<DateTime<Utc>>,
    ) -> Result<MutationOutcome<CanonicalRecord>, ServiceError> {
        let at = at.unwrap_or_else(Utc::now);
        self.update_item(
            id,
            &ItemUpdateBuilder::new().last_verified_at(Some(at)).build(),
        )
        .await
    }

    /// Replace notes; blank notes clear them. Logs `notes_changed`.
    pub async fn set_notes(
        &self,
        id: ItemId,
        notes: Option<String>,
    ) -> Result<MutationOutcome<CanonicalRecord>, ServiceError> {
        self.update_item(id, &ItemUpdateBuilder::new().notes(notes).build())
            .await
    }

    /// Append a photo reference. Logs `photo_added`.
    pub async fn add_photo(
        &self,
        id: ItemId,
        reference: &str,
    ) -> Result<MutationOutcome<CanonicalRecord>, ServiceError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ServiceError::Invalid("photo reference is empty".to_string()));
        }
        let current = self.require_item(id).await?;
        let mut photos = current.photos;
        photos.push(reference.to_string());
        self.update_item(
            id,
            &ItemUpdateBuilder::new()
                .photos(photos)
                .expected_revision(current.revision)
                .build(),
        )
        .await
    }

    /// Remove the first occurrence of a photo reference. Logs
    /// `photo_removed`.
    pub async fn remove_photo(
        &self,
        id: ItemId,
        reference: &str,
    ) -> Result<MutationOutcome<CanonicalRecord>, ServiceError> {
        let current = self.require_item(id).await?;
        let mut photos = current.photos;
        let position = photos
            .iter()
            .position(|p| p == reference.trim())
            .ok_or_else(|| ServiceError::Invalid(format!("item {id} has no photo '{reference}'")))?;
        photos.remove(position);
        self.update_item(
            id,
            &ItemUpdateBuilder::new()
                .photos(photos)
                .expected_revision(current.revision)
                .build(),
        )
        .await
    }

    /// Delete a record and its instances. Logs `deleted` with a snapshot of
    /// the record's identifying fields, since the record itself is gone
    /// afterwards.
    pub async fn delete_item(&self, id: ItemId) -> Result<MutationOutcome<ItemSnapshot>, ServiceError> {
        let current = self.require_item(id).await?;
        let instance_count = self.store().instances_for(id).await?.len();
        self.store().delete(id).await?;

        let snapshot = ItemSnapshot::of(&current, instance_count);
        let audit = self
            .log_payload(ActivityAction::Deleted, Subject::item(id), &snapshot)
            .await;
        Ok(MutationOutcome::new(snapshot, audit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{radio, test_service, test_service_with_failing_log};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tally_core::enums::Field;

    #[tokio::test]
    async fn add_item_logs_item_added() {
        let svc = test_service().await;
        let mut record = radio();
        record.unit_of_issue = "each".to_string();
        let outcome = svc.add_item(record).await.unwrap();

        assert_eq!(outcome.value.unit_of_issue, "EA");
        assert_eq!(outcome.value.quantity_short, 3.0);
        let entry_id = outcome.audit.entry_id().unwrap();
        let entries = svc.list_activity(10).await.unwrap();
        assert_eq!(entries[0].id, entry_id);
        assert_eq!(entries[0].action, ActivityAction::ItemAdded);
        assert_eq!(entries[0].summary(), "added Radio (LIN a1b2c3)");
    }

    #[tokio::test]
    async fn negative_quantity_is_refused() {
        let svc = test_service().await;
        let mut record = radio();
        record.quantity_on_hand = -1.0;
        assert!(matches!(
            svc.add_item(record).await.unwrap_err(),
            ServiceError::Invalid(_)
        ));
    }

    #[tokio::test]
    async fn flag_logs_exactly_one_flagged_entry() {
        let svc = test_service().await;
        let id = svc.add_item(radio()).await.unwrap().value.id.unwrap();

        let outcome = svc.flag_item(id, true).await.unwrap();
        assert!(outcome.value.is_flagged);

        let entries = svc.item_activity(id, None).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, ActivityAction::Flagged);
        let changes = entries[0].detail.changes().unwrap();
        assert_eq!(changes.len(), 1);
        let change = changes.get(Field::IsFlagged).unwrap();
        assert_eq!((change.before.clone(), change.after.clone()), (json!(false), json!(true)));
    }

    #[tokio::test]
    async fn flag_after_explicit_shortage_import_is_one_delta() {
        let svc = test_service().await;
        let imported = svc
            .import_rows(
                [json!({"Qty Authorized": 6, "Shortage": "2"})],
                &crate::ImportOptions::default(),
            )
            .await
            .unwrap();
        let id = imported.value.item_ids[0];
        let before = svc.get_item(id).await.unwrap().item;
        assert_eq!(before.quantity_short, 2.0);

        let outcome = svc.flag_item(id, true).await.unwrap();
        assert_eq!(outcome.value.quantity_short, 2.0);

        let entries = svc.item_activity(id, Some(1)).await.unwrap();
        assert_eq!(entries[0].action, ActivityAction::Flagged);
        let changes = entries[0].detail.changes().unwrap();
        assert!(changes.is_only(Field::IsFlagged));
        assert_eq!(entries[0].summary(), "flagged item");
    }

    #[tokio::test]
    async fn no_op_update_is_not_logged() {
        let svc = test_service().await;
        let id = svc.add_item(radio()).await.unwrap().value.id.unwrap();

        let outcome = svc
            .update_item(id, &ItemUpdateBuilder::new().nomenclature("Radio").build())
            .await
            .unwrap();
        assert_eq!(outcome.audit, AuditStatus::Skipped);
        assert_eq!(outcome.value.revision, 0);
        assert_eq!(svc.list_activity(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn multi_field_edit_is_one_entry() {
        let svc = test_service().await;
        let id = svc.add_item(radio()).await.unwrap().value.id.unwrap();

        let outcome = svc
            .update_item(
                id,
                &ItemUpdateBuilder::new()
                    .quantity_on_hand(10.0)
                    .nomenclature("Radio Set")
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.value.quantity_short, 0.0);

        let entries = svc.list_activity(1).await.unwrap();
        assert_eq!(entries[0].action, ActivityAction::Edited);
        assert_eq!(
            entries[0].summary(),
            "changed on-hand quantity from 7 to 10 (+2 more)"
        );
    }

    #[tokio::test]
    async fn photos_are_logged_as_counts() {
        let svc = test_service().await;
        let id = svc.add_item(radio()).await.unwrap().value.id.unwrap();

        svc.add_photo(id, "front.jpg").await.unwrap();
        let outcome = svc.add_photo(id, "back.jpg").await.unwrap();
        assert_eq!(outcome.value.photos, vec!["front.jpg", "back.jpg"]);

        svc.remove_photo(id, "front.jpg").await.unwrap();
        let entries = svc.list_activity(3).await.unwrap();
        let actions: Vec<_> = entries.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                ActivityAction::PhotoRemoved,
                ActivityAction::PhotoAdded,
                ActivityAction::PhotoAdded
            ]
        );
        let change = entries[0].detail.changes().unwrap().get(Field::Photos).unwrap();
        assert_eq!((change.before.clone(), change.after.clone()), (json!(2), json!(1)));

        assert!(matches!(
            svc.remove_photo(id, "missing.jpg").await.unwrap_err(),
            ServiceError::Invalid(_)
        ));
    }

    #[tokio::test]
    async fn blank_notes_clear() {
        let svc = test_service().await;
        let id = svc.add_item(radio()).await.unwrap().value.id.unwrap();

        svc.set_notes(id, Some("check battery".to_string()))
            .await
            .unwrap();
        let cleared = svc.set_notes(id, Some("   ".to_string())).await.unwrap();
        assert_eq!(cleared.value.notes, None);
        assert_eq!(
            svc.list_activity(1).await.unwrap()[0].action,
            ActivityAction::NotesChanged
        );
    }

    #[tokio::test]
    async fn stale_revision_conflicts_without_logging() {
        let svc = test_service().await;
        let id = svc.add_item(radio()).await.unwrap().value.id.unwrap();
        svc.flag_item(id, true).await.unwrap();

        let err = svc
            .update_item(
                id,
                &ItemUpdateBuilder::new()
                    .nomenclature("Stale")
                    .expected_revision(0)
                    .build(),
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(svc.list_activity(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_logs_snapshot_that_outlives_record() {
        let svc = test_service().await;
        let id = svc.add_item(radio()).await.unwrap().value.id.unwrap();

        let outcome = svc.delete_item(id).await.unwrap();
        assert!(outcome.audit.is_logged());
        assert!(svc.get_item(id).await.unwrap_err().is_not_found());

        let entries = svc
            .query_activity(&tally_core::store::LogFilter {
                action: Some(ActivityAction::Deleted),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        let payload = entries[0].detail.payload().unwrap();
        assert_eq!(payload["nomenclature"], "Radio");
        assert_eq!(payload["line_item_number"], "a1b2c3");
        assert_eq!(payload["stock_number"], "1005-01-123-4567");
    }

    #[tokio::test]
    async fn deleted_item_accepts_no_further_mutations() {
        let svc = test_service().await;
        let id = svc.add_item(radio()).await.unwrap().value.id.unwrap();
        svc.delete_item(id).await.unwrap();

        assert!(svc.flag_item(id, true).await.unwrap_err().is_not_found());
        assert!(svc.delete_item(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn log_failure_keeps_mutation() {
        let (svc, log) = test_service_with_failing_log().await;
        let outcome = svc.add_item(radio()).await.unwrap();
        let id = outcome.value.id.unwrap();
        assert!(matches!(outcome.audit, AuditStatus::Failed { .. }));

        let flagged = svc.flag_item(id, true).await.unwrap();
        assert!(matches!(flagged.audit, AuditStatus::Failed { .. }));
        assert!(svc.get_item(id).await.unwrap().item.is_flagged);
        assert_eq!(log.log_len().await, 0);
    }
}
