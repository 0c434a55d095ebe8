//! `activity_log` table: the database-backed log store.
//!
//! Rows are read back through `tally_schema::upgrade_entry`, so entries
//! written under older versions come out in the current shape.

use async_trait::async_trait;
use serde_json::json;

use tally_core::entities::{LOG_ENTRY_VERSION, LogEntry, PendingEntry};
use tally_core::errors::CoreError;
use tally_core::ids::LogEntryId;
use tally_core::store::{LogFilter, LogStore};

use crate::TallyDb;
use crate::error::DatabaseError;
use crate::helpers::{format_datetime, parse_json};

fn row_to_entry(row: &libsql::Row) -> Result<LogEntry, DatabaseError> {
    let mut raw = json!({
        "v": row.get::<i64>(1)?,
        "id": row.get::<i64>(0)?,
        "timestamp": row.get::<String>(2)?,
        "action": row.get::<String>(3)?,
        "item_id": row.get::<Option<i64>>(4)?,
        "instance_id": row.get::<Option<i64>>(5)?,
    });
    // Version 1 rows stored a bare change list in the detail column.
    let detail = parse_json(&row.get::<String>(6)?)?;
    let key = if detail.is_array() { "changes" } else { "detail" };
    raw[key] = detail;
    tally_schema::upgrade_entry(raw).map_err(|e| DatabaseError::Query(format!("log entry: {e}")))
}

impl TallyDb {
    async fn append_entry(&self, entry: &PendingEntry) -> Result<LogEntryId, DatabaseError> {
        let detail =
            serde_json::to_string(&entry.detail).map_err(|e| DatabaseError::Other(e.into()))?;
        self.conn()
            .execute(
                "INSERT INTO activity_log (v, timestamp, action, item_id, instance_id, detail)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    i64::from(LOG_ENTRY_VERSION),
                    format_datetime(&entry.timestamp),
                    entry.action.as_str(),
                    entry.subject.item_id,
                    entry.subject.instance_id,
                    detail
                ],
            )
            .await?;
        Ok(self.conn().last_insert_rowid())
    }

    async fn query_entries(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(item_id) = filter.item_id {
            params.push(libsql::Value::Integer(item_id));
            conditions.push(format!("item_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit_clause = filter
            .limit
            .map_or_else(String::new, |limit| format!("LIMIT {limit}"));
        let sql = format!(
            "SELECT id, v, timestamp, action, item_id, instance_id, detail
             FROM activity_log {where_clause}
             ORDER BY id DESC {limit_clause}"
        );

        let mut rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            match row_to_entry(&row) {
                Ok(entry) => entries.push(entry),
                Err(DatabaseError::Query(reason)) => {
                    let id = row.get::<i64>(0).unwrap_or_default();
                    tracing::warn!(entry_id = id, %reason, "skipping undecodable log entry");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(entries)
    }
}

#[async_trait]
impl LogStore for TallyDb {
    async fn append(&self, entry: &PendingEntry) -> Result<LogEntryId, CoreError> {
        Ok(self.append_entry(entry).await?)
    }

    async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, CoreError> {
        Ok(self.query_entries(filter).await?)
    }
}
