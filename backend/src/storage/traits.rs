//! # Storage Traits
//!
//! Storage abstraction for budget records, so the domain layer can run
//! against SQLite in production and anything else in tests.

use async_trait::async_trait;
use shared::{BudgetEntity, StoredRecord};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("record for user {user_id} was not readable after write")]
    MissingAfterWrite { user_id: String },
}

/// Record persistence for one entity type, keyed by user identity
#[async_trait]
pub trait RecordStorage<E: BudgetEntity>: Send + Sync {
    /// Most recently updated record for the user, if any
    async fn fetch_latest(&self, user_id: &str) -> Result<Option<StoredRecord<E>>, StorageError>;

    /// Insert or overwrite the user's record and return the stored row
    async fn upsert(&self, user_id: &str, record: &E) -> Result<StoredRecord<E>, StorageError>;
}
