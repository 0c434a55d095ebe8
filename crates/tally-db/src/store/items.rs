//! `items` table: the record store.

use async_trait::async_trait;
use chrono::Utc;

use tally_core::entities::CanonicalRecord;
use tally_core::errors::CoreError;
use tally_core::ids::ItemId;
use tally_core::store::RecordStore;
use tally_core::updates::ItemUpdate;

use crate::TallyDb;
use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_bool, get_opt_string, parse_optional_datetime, parse_photos,
};

const ITEM_COLUMNS: &str = "id, nomenclature, line_item_number, stock_number, unit_of_issue,
    quantity_authorized, quantity_on_hand, quantity_short, is_flagged, notes, photos,
    last_verified_at, revision";

/// Read-modify-write attempts before an unguarded update gives up.
const UPDATE_ATTEMPTS: u32 = 3;

fn row_to_record(row: &libsql::Row) -> Result<CanonicalRecord, DatabaseError> {
    Ok(CanonicalRecord {
        id: Some(row.get::<i64>(0)?),
        nomenclature: row.get::<String>(1)?,
        line_item_number: row.get::<String>(2)?,
        stock_number: row.get::<String>(3)?,
        unit_of_issue: row.get::<String>(4)?,
        quantity_authorized: row.get::<f64>(5)?,
        quantity_on_hand: row.get::<f64>(6)?,
        quantity_short: row.get::<f64>(7)?,
        is_flagged: get_bool(row, 8)?,
        notes: get_opt_string(row, 9)?,
        photos: parse_photos(&row.get::<String>(10)?)?,
        last_verified_at: parse_optional_datetime(get_opt_string(row, 11)?.as_deref())?,
        revision: u32::try_from(row.get::<i64>(12)?)
            .map_err(|e| DatabaseError::InvalidState(format!("revision: {e}")))?,
    })
}

fn photos_json(photos: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(photos).map_err(|e| DatabaseError::Other(e.into()))
}

impl TallyDb {
    async fn fetch_item(&self, id: ItemId) -> Result<Option<CanonicalRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert_item(&self, record: &CanonicalRecord) -> Result<ItemId, DatabaseError> {
        let now = format_datetime(&Utc::now());
        self.conn()
            .execute(
                "INSERT INTO items (nomenclature, line_item_number, stock_number, unit_of_issue,
                    quantity_authorized, quantity_on_hand, quantity_short, is_flagged, notes,
                    photos, last_verified_at, revision, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
                libsql::params![
                    record.nomenclature.as_str(),
                    record.line_item_number.as_str(),
                    record.stock_number.as_str(),
                    record.unit_of_issue.as_str(),
                    record.quantity_authorized,
                    record.quantity_on_hand,
                    record.quantity_short.max(0.0),
                    i64::from(record.is_flagged),
                    record.notes.as_deref(),
                    photos_json(&record.photos)?,
                    record.last_verified_at.as_ref().map(format_datetime),
                    i64::from(record.revision),
                    now
                ],
            )
            .await?;
        Ok(self.conn().last_insert_rowid())
    }

    /// Write `update` on top of `current`, guarded by `current.revision`.
    /// Returns `None` when another writer moved the revision first.
    async fn write_item(
        &self,
        current: &CanonicalRecord,
        update: &ItemUpdate,
    ) -> Result<Option<CanonicalRecord>, DatabaseError> {
        let next = update.apply(current);
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref v) = update.nomenclature {
            params.push(v.as_str().into());
            sets.push(format!("nomenclature = ?{}", params.len()));
        }
        if let Some(ref v) = update.line_item_number {
            params.push(v.as_str().into());
            sets.push(format!("line_item_number = ?{}", params.len()));
        }
        if let Some(ref v) = update.stock_number {
            params.push(v.as_str().into());
            sets.push(format!("stock_number = ?{}", params.len()));
        }
        if let Some(ref v) = update.unit_of_issue {
            params.push(v.as_str().into());
            sets.push(format!("unit_of_issue = ?{}", params.len()));
        }
        if let Some(v) = update.quantity_authorized {
            params.push(v.into());
            sets.push(format!("quantity_authorized = ?{}", params.len()));
        }
        if let Some(v) = update.quantity_on_hand {
            params.push(v.into());
            sets.push(format!("quantity_on_hand = ?{}", params.len()));
        }
        if let Some(v) = update.is_flagged {
            params.push(i64::from(v).into());
            sets.push(format!("is_flagged = ?{}", params.len()));
        }
        if let Some(ref v) = update.notes {
            params.push(v.as_deref().into());
            sets.push(format!("notes = ?{}", params.len()));
        }
        if let Some(ref v) = update.photos {
            params.push(photos_json(v)?.into());
            sets.push(format!("photos = ?{}", params.len()));
        }
        if let Some(ref v) = update.last_verified_at {
            params.push(v.as_ref().map(format_datetime).into());
            sets.push(format!("last_verified_at = ?{}", params.len()));
        }

        if update.touches_quantities() {
            params.push(next.quantity_short.into());
            sets.push(format!("quantity_short = ?{}", params.len()));
        }
        params.push(i64::from(next.revision).into());
        sets.push(format!("revision = ?{}", params.len()));
        params.push(format_datetime(&Utc::now()).into());
        sets.push(format!("updated_at = ?{}", params.len()));

        params.push(current.id.unwrap_or_default().into());
        let id_idx = params.len();
        params.push(i64::from(current.revision).into());
        let rev_idx = params.len();

        let sql = format!(
            "UPDATE items SET {} WHERE id = ?{id_idx} AND revision = ?{rev_idx}",
            sets.join(", ")
        );
        let affected = self
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        Ok((affected > 0).then_some(next))
    }
}

#[async_trait]
impl RecordStore for TallyDb {
    async fn insert(&self, record: &CanonicalRecord) -> Result<ItemId, CoreError> {
        Ok(self.insert_item(record).await?)
    }

    async fn update(&self, id: ItemId, update: &ItemUpdate) -> Result<CanonicalRecord, CoreError> {
        for _ in 0..UPDATE_ATTEMPTS {
            let current = self
                .fetch_item(id)
                .await?
                .ok_or_else(|| CoreError::item_not_found(id))?;
            if let Some(expected) = update.expected_revision {
                if expected != current.revision {
                    return Err(CoreError::Conflict {
                        id,
                        expected,
                        actual: current.revision,
                    });
                }
            }
            if let Some(updated) = self.write_item(&current, update).await? {
                return Ok(updated);
            }
            tracing::debug!(item_id = id, "item revision moved during update, retrying");
        }
        let actual = self
            .fetch_item(id)
            .await?
            .ok_or_else(|| CoreError::item_not_found(id))?
            .revision;
        Err(CoreError::Conflict {
            id,
            expected: update.expected_revision.unwrap_or(actual),
            actual,
        })
    }

    async fn delete(&self, id: ItemId) -> Result<(), CoreError> {
        let affected = self
            .conn()
            .execute("DELETE FROM items WHERE id = ?1", [id])
            .await
            .map_err(DatabaseError::from)?;
        if affected == 0 {
            return Err(CoreError::item_not_found(id));
        }
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<CanonicalRecord>, CoreError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id"), ())
            .await
            .map_err(DatabaseError::from)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::from)? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Option<CanonicalRecord>, CoreError> {
        Ok(self.fetch_item(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{radio, test_db};
    use pretty_assertions::assert_eq;
    use tally_core::updates::ItemUpdateBuilder;

    #[tokio::test]
    async fn insert_assigns_ids_and_reads_back() {
        let db = test_db().await;
        let first = db.insert(&radio()).await.unwrap();
        let second = db.insert(&radio()).await.unwrap();
        assert!(second > first);

        let stored = db.get_by_id(first).await.unwrap().unwrap();
        assert_eq!(stored, radio().with_id(first));
    }

    #[tokio::test]
    async fn insert_many_keeps_order() {
        let db = test_db().await;
        let mut other = radio();
        other.nomenclature = "Antenna".to_string();
        let ids = db.insert_many(&[radio(), other]).await.unwrap();
        assert_eq!(ids.len(), 2);

        let all = db.get_all().await.unwrap();
        let names: Vec<_> = all.iter().map(|r| r.nomenclature.as_str()).collect();
        assert_eq!(names, vec!["Radio", "Antenna"]);
    }

    #[tokio::test]
    async fn update_recomputes_short_and_bumps_revision() {
        let db = test_db().await;
        let id = db.insert(&radio()).await.unwrap();

        let updated = db
            .update(
                id,
                &ItemUpdateBuilder::new()
                    .quantity_on_hand(12.0)
                    .notes(Some("overstock".to_string()))
                    .photos(vec!["front.jpg".to_string()])
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity_short, 0.0);
        assert_eq!(updated.revision, 1);

        let stored = db.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.photos, vec!["front.jpg".to_string()]);
    }

    #[tokio::test]
    async fn stale_revision_is_a_conflict() {
        let db = test_db().await;
        let id = db.insert(&radio()).await.unwrap();
        db.update(id, &ItemUpdateBuilder::new().is_flagged(true).build())
            .await
            .unwrap();

        let err = db
            .update(
                id,
                &ItemUpdateBuilder::new()
                    .is_flagged(false)
                    .expected_revision(0)
                    .build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Conflict {
                expected: 0,
                actual: 1,
                ..
            }
        ));
        assert!(db.get_by_id(id).await.unwrap().unwrap().is_flagged);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let db = test_db().await;
        let err = db
            .update(99, &ItemUpdateBuilder::new().is_flagged(true).build())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { id: 99, .. }));
        assert!(matches!(
            db.delete(99).await.unwrap_err(),
            CoreError::NotFound { .. }
        ));
        assert!(db.get_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn notes_can_be_cleared() {
        let db = test_db().await;
        let mut record = radio();
        record.notes = Some("check battery".to_string());
        let id = db.insert(&record).await.unwrap();

        let updated = db
            .update(id, &ItemUpdateBuilder::new().notes(None).build())
            .await
            .unwrap();
        assert_eq!(updated.notes, None);
        assert_eq!(db.get_by_id(id).await.unwrap().unwrap().notes, None);
    }
}
