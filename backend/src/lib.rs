//! # Budget Tracker Backend
//!
//! The record store behind the budget tracker: one current income record and
//! one current expense record per user, persisted in SQLite and exposed over
//! a small REST API. The same services are embedded directly by the
//! frontend crate when no HTTP hop is wanted.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers)
//!     ↓
//! Domain Layer (RecordService)
//!     ↓
//! Storage Layer (RecordStorage → SQLite)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use shared::{ExpenseRecord, IncomeRecord};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::BackendConfig;
use crate::domain::RecordService;
use crate::storage::{DbConnection, SqliteRecordRepository};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub income_service: RecordService<IncomeRecord>,
    pub expense_service: RecordService<ExpenseRecord>,
}

impl AppState {
    /// Wire both record services to one database
    pub fn from_connection(db: DbConnection) -> Self {
        Self {
            income_service: RecordService::new(Arc::new(SqliteRecordRepository::new(db.clone()))),
            expense_service: RecordService::new(Arc::new(SqliteRecordRepository::new(db))),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &BackendConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db_conn = DbConnection::new(&config.database_url).await?;

    info!("Setting up application state");
    Ok(AppState::from_connection(db_conn))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &BackendConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers(Any);

    // CORS setup to allow the frontend origin to make requests
    let cors = match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            warn!("Ignoring invalid CORS origin {:?}: {}", config.cors_origin, e);
            cors
        }
    };

    Router::new()
        .nest("/api", io::api_router())
        .layer(cors)
        .with_state(app_state)
}
