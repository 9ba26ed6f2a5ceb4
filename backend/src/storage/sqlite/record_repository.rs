//! SQLite implementation of [`RecordStorage`], generic over the budget entity.
//!
//! Column lists are derived from the entity's field enumeration, so income
//! and expense share one implementation.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use shared::{BudgetEntity, RecordField, StoredRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::marker::PhantomData;
use tracing::{debug, info};

use super::connection::DbConnection;
use crate::storage::traits::{RecordStorage, StorageError};

#[derive(Clone)]
pub struct SqliteRecordRepository<E> {
    db: DbConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E: BudgetEntity> SqliteRecordRepository<E> {
    pub fn new(db: DbConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    fn table() -> &'static str {
        E::KIND.table_name()
    }

    fn field_columns() -> Vec<&'static str> {
        E::fields().iter().map(|f| f.column()).collect()
    }

    fn row_to_record(row: &SqliteRow) -> Result<StoredRecord<E>, StorageError> {
        let mut values = Vec::with_capacity(E::fields().len());
        for field in E::fields() {
            let value: f64 = row.try_get(field.column())?;
            values.push((*field, value));
        }

        Ok(StoredRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            // The stored total column is not read back; the record recomputes it
            record: E::from_values(values),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl<E: BudgetEntity> RecordStorage<E> for SqliteRecordRepository<E> {
    async fn fetch_latest(&self, user_id: &str) -> Result<Option<StoredRecord<E>>, StorageError> {
        let sql = format!(
            "SELECT id, user_id, {columns}, total, created_at, updated_at \
             FROM {table} WHERE user_id = ? \
             ORDER BY updated_at DESC LIMIT 1",
            columns = Self::field_columns().join(", "),
            table = Self::table(),
        );

        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => {
                let stored = Self::row_to_record(&row)?;
                debug!("Loaded {} record {} for user {}", E::KIND, stored.id, user_id);
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, user_id: &str, record: &E) -> Result<StoredRecord<E>, StorageError> {
        let columns = Self::field_columns();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let updates: Vec<String> = columns
            .iter()
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();

        let sql = format!(
            "INSERT INTO {table} (id, user_id, {columns}, total, created_at, updated_at) \
             VALUES (?, ?, {placeholders}, ?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET {updates}, \
             total = excluded.total, updated_at = excluded.updated_at",
            table = Self::table(),
            columns = columns.join(", "),
            placeholders = placeholders,
            updates = updates.join(", "),
        );

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let new_id = uuid::Uuid::new_v4().to_string();

        let mut query = sqlx::query(&sql).bind(new_id).bind(user_id);
        for (_, value) in record.values() {
            query = query.bind(value);
        }
        query
            .bind(record.total())
            .bind(&now)
            .bind(&now)
            .execute(self.db.pool())
            .await?;

        info!("Upserted {} record for user {} (total {:.2})", E::KIND, user_id, record.total());

        self.fetch_latest(user_id)
            .await?
            .ok_or_else(|| StorageError::MissingAfterWrite {
                user_id: user_id.to_string(),
            })
    }
}
