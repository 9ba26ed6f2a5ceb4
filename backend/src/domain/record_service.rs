//! Record service: loading and saving a user's current income or expense record.
//!
//! ## Business Rules
//!
//! - A user has at most one current record per entity; saving overwrites it
//! - "No record yet" is a normal answer for first-time users, not an error
//! - User ids must be non-empty and at most 128 characters
//! - The stored total always equals the sum of the stored fields

use shared::{BudgetEntity, LatestRecordResponse, UpsertRecordResponse};
use std::sync::Arc;
use tracing::info;

use crate::storage::{RecordStorage, StorageError};

const MAX_USER_ID_LEN: usize = 128;

#[derive(Debug, thiserror::Error)]
pub enum RecordServiceError {
    #[error("invalid user id: {0}")]
    InvalidUser(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct RecordService<E: BudgetEntity> {
    storage: Arc<dyn RecordStorage<E>>,
}

impl<E: BudgetEntity> Clone for RecordService<E> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<E: BudgetEntity> RecordService<E> {
    pub fn new(storage: Arc<dyn RecordStorage<E>>) -> Self {
        Self { storage }
    }

    /// Latest record for the user; `record: None` for a user who never saved
    pub async fn get_latest(&self, user_id: &str) -> Result<LatestRecordResponse<E>, RecordServiceError> {
        let user_id = validate_user_id(user_id)?;
        let record = self.storage.fetch_latest(user_id).await?;

        if record.is_none() {
            info!("No {} record stored yet for user {}", E::KIND, user_id);
        }

        Ok(LatestRecordResponse {
            kind: E::KIND,
            record,
        })
    }

    /// Overwrite the user's current record
    pub async fn save(&self, user_id: &str, record: E) -> Result<UpsertRecordResponse<E>, RecordServiceError> {
        let user_id = validate_user_id(user_id)?;
        let stored = self.storage.upsert(user_id, &record).await?;
        info!("Saved {} record {} for user {}", E::KIND, stored.id, user_id);

        Ok(UpsertRecordResponse {
            record: stored,
            success_message: format!("{} data saved", capitalize(E::KIND.as_str())),
        })
    }
}

fn validate_user_id(user_id: &str) -> Result<&str, RecordServiceError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(RecordServiceError::InvalidUser("user id cannot be empty".to_string()));
    }
    if trimmed.len() > MAX_USER_ID_LEN {
        return Err(RecordServiceError::InvalidUser(format!(
            "user id cannot exceed {} characters",
            MAX_USER_ID_LEN
        )));
    }
    Ok(trimmed)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
