//! # REST API Interface Layer
//!
//! HTTP endpoints for the record store. Handlers are thin: they log the
//! request, call the domain service and translate errors to status codes.

pub mod record_apis;

use axum::{response::Json, routing::get, Router};
use shared::HealthResponse;

use crate::AppState;

/// All `/api` routes
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/users", record_apis::router())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
