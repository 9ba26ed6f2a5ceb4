use shared::{BudgetEntity, EntityKind, ExpenseRecord, IncomeRecord, RecordField};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::storage::traits::StorageError;

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and set up the schema
    pub async fn new(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// A fresh private in-memory database.
    ///
    /// The pool holds exactly one connection for its whole lifetime, so the
    /// database lives as long as the returned handle.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<(), StorageError> {
        create_record_table::<IncomeRecord>(pool).await?;
        create_record_table::<ExpenseRecord>(pool).await?;
        Ok(())
    }
}

/// Create the table for one entity: a REAL column per field plus the total.
/// `user_id` is unique, so each user has exactly one current row.
async fn create_record_table<E: BudgetEntity>(pool: &SqlitePool) -> Result<(), StorageError> {
    let kind: EntityKind = E::KIND;
    let field_columns: Vec<String> = E::fields()
        .iter()
        .map(|f| format!("{} REAL NOT NULL DEFAULT 0", f.column()))
        .collect();

    let create_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            {fields},
            total REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        table = kind.table_name(),
        fields = field_columns.join(",\n            "),
    );
    sqlx::query(&create_table).execute(pool).await?;

    let create_index = format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_updated_at ON {table}(user_id, updated_at DESC);",
        table = kind.table_name(),
    );
    sqlx::query(&create_index).execute(pool).await?;

    info!("Schema ready for {}", kind.table_name());
    Ok(())
}
