//! `instances` table.

use async_trait::async_trait;

use tally_core::entities::{Instance, InstanceFields};
use tally_core::errors::CoreError;
use tally_core::ids::{InstanceId, ItemId};
use tally_core::store::InstanceStore;
use tally_core::updates::InstanceUpdate;

use crate::TallyDb;
use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, parse_optional_datetime};

const INSTANCE_COLUMNS: &str =
    "id, item_id, serial_number, location, condition_code, last_verified_at";

fn row_to_instance(row: &libsql::Row) -> Result<Instance, DatabaseError> {
    Ok(Instance {
        id: row.get::<i64>(0)?,
        item_id: row.get::<i64>(1)?,
        fields: InstanceFields {
            serial_number: row.get::<String>(2)?,
            location: get_opt_string(row, 3)?,
            condition_code: get_opt_string(row, 4)?,
            last_verified_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        },
    })
}

impl TallyDb {
    async fn fetch_instance(&self, id: InstanceId) -> Result<Option<Instance>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {INSTANCE_COLUMNS} FROM instances WHERE id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_instance(&row)?)),
            None => Ok(None),
        }
    }

    async fn item_exists(&self, item_id: ItemId) -> Result<bool, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT 1 FROM items WHERE id = ?1", [item_id])
            .await?;
        Ok(rows.next().await?.is_some())
    }
}

#[async_trait]
impl InstanceStore for TallyDb {
    async fn insert_instance(
        &self,
        item_id: ItemId,
        fields: &InstanceFields,
    ) -> Result<Instance, CoreError> {
        if !self.item_exists(item_id).await? {
            return Err(CoreError::item_not_found(item_id));
        }
        self.conn()
            .execute(
                "INSERT INTO instances (item_id, serial_number, location, condition_code, last_verified_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    item_id,
                    fields.serial_number.as_str(),
                    fields.location.as_deref(),
                    fields.condition_code.as_deref(),
                    fields.last_verified_at.as_ref().map(format_datetime)
                ],
            )
            .await
            .map_err(DatabaseError::from)?;
        Ok(Instance {
            id: self.conn().last_insert_rowid(),
            item_id,
            fields: fields.clone(),
        })
    }

    async fn update_instance(
        &self,
        id: InstanceId,
        update: &InstanceUpdate,
    ) -> Result<Instance, CoreError> {
        let mut current = self
            .fetch_instance(id)
            .await?
            .ok_or_else(|| CoreError::instance_not_found(id))?;
        if update.is_empty() {
            return Ok(current);
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref v) = update.serial_number {
            params.push(v.as_str().into());
            sets.push(format!("serial_number = ?{}", params.len()));
        }
        if let Some(ref v) = update.location {
            params.push(v.as_deref().into());
            sets.push(format!("location = ?{}", params.len()));
        }
        if let Some(ref v) = update.condition_code {
            params.push(v.as_deref().into());
            sets.push(format!("condition_code = ?{}", params.len()));
        }
        if let Some(ref v) = update.last_verified_at {
            params.push(v.as_ref().map(format_datetime).into());
            sets.push(format!("last_verified_at = ?{}", params.len()));
        }

        params.push(id.into());
        let sql = format!(
            "UPDATE instances SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        self.conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(DatabaseError::from)?;

        current.fields = update.apply(&current.fields);
        Ok(current)
    }

    async fn delete_instance(&self, id: InstanceId) -> Result<(), CoreError> {
        let affected = self
            .conn()
            .execute("DELETE FROM instances WHERE id = ?1", [id])
            .await
            .map_err(DatabaseError::from)?;
        if affected == 0 {
            return Err(CoreError::instance_not_found(id));
        }
        Ok(())
    }

    async fn get_instance(&self, id: InstanceId) -> Result<Option<Instance>, CoreError> {
        Ok(self.fetch_instance(id).await?)
    }

    async fn instances_for(&self, item_id: ItemId) -> Result<Vec<Instance>, CoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {INSTANCE_COLUMNS} FROM instances WHERE item_id = ?1 ORDER BY id"),
                [item_id],
            )
            .await
            .map_err(DatabaseError::from)?;
        let mut instances = Vec::new();
        while let Some(row) = rows.next().await.map_err(DatabaseError::from)? {
            instances.push(row_to_instance(&row)?);
        }
        Ok(instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{radio, test_db};
    use pretty_assertions::assert_eq;
    use tally_core::store::RecordStore;
    use tally_core::updates::InstanceUpdateBuilder;

    fn fields(serial: &str) -> InstanceFields {
        InstanceFields {
            serial_number: serial.to_string(),
            location: Some("Cage 4".to_string()),
            ..InstanceFields::default()
        }
    }

    #[tokio::test]
    async fn insert_and_list_for_item() {
        let db = test_db().await;
        let item = db.insert(&radio()).await.unwrap();
        let a = db.insert_instance(item, &fields("SN-1")).await.unwrap();
        let b = db.insert_instance(item, &fields("SN-2")).await.unwrap();

        let listed = db.instances_for(item).await.unwrap();
        assert_eq!(listed, vec![a, b]);
    }

    #[tokio::test]
    async fn instance_requires_existing_item() {
        let db = test_db().await;
        let err = db.insert_instance(42, &fields("SN-1")).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn update_clears_location() {
        let db = test_db().await;
        let item = db.insert(&radio()).await.unwrap();
        let instance = db.insert_instance(item, &fields("SN-1")).await.unwrap();

        let updated = db
            .update_instance(
                instance.id,
                &InstanceUpdateBuilder::new()
                    .location(None)
                    .condition_code(Some("A".to_string()))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.fields.location, None);
        assert_eq!(
            db.get_instance(instance.id).await.unwrap().unwrap(),
            updated
        );
    }

    #[tokio::test]
    async fn deleting_item_cascades() {
        let db = test_db().await;
        let item = db.insert(&radio()).await.unwrap();
        let instance = db.insert_instance(item, &fields("SN-1")).await.unwrap();

        db.delete(item).await.unwrap();
        assert!(db.get_instance(instance.id).await.unwrap().is_none());
        assert!(matches!(
            db.delete_instance(instance.id).await.unwrap_err(),
            CoreError::NotFound { .. }
        ));
    }
}
