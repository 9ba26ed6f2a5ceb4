//! Record gateway: how the hooks reach the record store.
//!
//! [`EmbeddedGateway`] calls the backend's record service in-process, the
//! same way a desktop shell embeds the backend. The HTTP counterpart lives
//! in [`crate::services::http_gateway`].

use async_trait::async_trait;
use backend::domain::{RecordService, RecordServiceError};
use backend::AppState;
use shared::{BudgetEntity, ExpenseRecord, IncomeRecord, StoredRecord};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The store has no row for this user; expected for first-time users
    #[error("no record found")]
    NotFound,
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("record store error: {0}")]
    Backend(String),
}

impl From<RecordServiceError> for GatewayError {
    fn from(err: RecordServiceError) -> Self {
        match err {
            RecordServiceError::InvalidUser(reason) => GatewayError::Unauthorized(reason),
            RecordServiceError::Storage(e) => GatewayError::Backend(e.to_string()),
        }
    }
}

/// Fetch-latest and upsert for one entity type, keyed by user id
#[async_trait]
pub trait RecordGateway<E: BudgetEntity>: Send + Sync {
    /// Most recently updated record of the user; `Ok(None)` when there is none
    async fn fetch_latest(&self, user_id: &str) -> Result<Option<StoredRecord<E>>, GatewayError>;

    /// Overwrite the user's current record
    async fn upsert(&self, user_id: &str, record: &E) -> Result<StoredRecord<E>, GatewayError>;
}

pub struct EmbeddedGateway<E: BudgetEntity> {
    service: RecordService<E>,
}

impl<E: BudgetEntity> EmbeddedGateway<E> {
    pub fn new(service: RecordService<E>) -> Self {
        Self { service }
    }
}

impl EmbeddedGateway<IncomeRecord> {
    pub fn income(state: &AppState) -> Self {
        Self::new(state.income_service.clone())
    }
}

impl EmbeddedGateway<ExpenseRecord> {
    pub fn expense(state: &AppState) -> Self {
        Self::new(state.expense_service.clone())
    }
}

#[async_trait]
impl<E: BudgetEntity> RecordGateway<E> for EmbeddedGateway<E> {
    async fn fetch_latest(&self, user_id: &str) -> Result<Option<StoredRecord<E>>, GatewayError> {
        let response = self.service.get_latest(user_id).await?;
        Ok(response.record)
    }

    async fn upsert(&self, user_id: &str, record: &E) -> Result<StoredRecord<E>, GatewayError> {
        let response = self.service.save(user_id, record.clone()).await?;
        Ok(response.record)
    }
}
