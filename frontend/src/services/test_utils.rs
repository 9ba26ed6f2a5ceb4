//! Test doubles for the record gateway.

use async_trait::async_trait;
use shared::{BudgetEntity, StoredRecord};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::gateway::{GatewayError, RecordGateway};

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall<E> {
    FetchLatest { user_id: String },
    Upsert { user_id: String, record: E },
}

/// In-memory gateway that records every call.
///
/// Fetches return the scripted results in order, then fall back to the last
/// upserted record. Upserts fail while `fail_upserts` is set.
pub struct RecordingGateway<E: BudgetEntity> {
    calls: Mutex<Vec<GatewayCall<E>>>,
    scripted_fetches: Mutex<VecDeque<Result<Option<E>, GatewayError>>>,
    stored: Mutex<Option<StoredRecord<E>>>,
    fail_upserts: Mutex<Option<GatewayError>>,
    fetch_delay: Mutex<Option<Duration>>,
    upsert_delay: Mutex<Option<Duration>>,
}

impl<E: BudgetEntity> RecordingGateway<E> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            scripted_fetches: Mutex::new(VecDeque::new()),
            stored: Mutex::new(None),
            fail_upserts: Mutex::new(None),
            fetch_delay: Mutex::new(None),
            upsert_delay: Mutex::new(None),
        })
    }

    pub fn script_fetch(&self, result: Result<Option<E>, GatewayError>) {
        self.scripted_fetches.lock().unwrap().push_back(result);
    }

    pub fn fail_upserts_with(&self, err: Option<GatewayError>) {
        *self.fail_upserts.lock().unwrap() = err;
    }

    pub fn delay_fetches(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    /// Make every upsert take this long before completing
    pub fn delay_upserts(&self, delay: Duration) {
        *self.upsert_delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<GatewayCall<E>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn upserts(&self) -> Vec<(String, E)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Upsert { user_id, record } => Some((user_id, record)),
                GatewayCall::FetchLatest { .. } => None,
            })
            .collect()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, GatewayCall::FetchLatest { .. }))
            .count()
    }
}

fn stored_row<E: BudgetEntity>(user_id: &str, record: E) -> StoredRecord<E> {
    StoredRecord {
        id: format!("{}-row", user_id),
        user_id: user_id.to_string(),
        record,
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
        updated_at: "2024-01-01T00:00:00.000Z".to_string(),
    }
}

#[async_trait]
impl<E: BudgetEntity> RecordGateway<E> for RecordingGateway<E> {
    async fn fetch_latest(&self, user_id: &str) -> Result<Option<StoredRecord<E>>, GatewayError> {
        self.calls.lock().unwrap().push(GatewayCall::FetchLatest {
            user_id: user_id.to_string(),
        });

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.scripted_fetches.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result.map(|record| record.map(|r| stored_row(user_id, r))),
            None => Ok(self
                .stored
                .lock()
                .unwrap()
                .clone()
                .filter(|row| row.user_id == user_id)),
        }
    }

    async fn upsert(&self, user_id: &str, record: &E) -> Result<StoredRecord<E>, GatewayError> {
        self.calls.lock().unwrap().push(GatewayCall::Upsert {
            user_id: user_id.to_string(),
            record: record.clone(),
        });

        let delay = *self.upsert_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.fail_upserts.lock().unwrap().clone() {
            return Err(err);
        }

        let row = stored_row(user_id, record.clone());
        *self.stored.lock().unwrap() = Some(row.clone());
        Ok(row)
    }
}
