//! # REST API for Income and Expense Records
//!
//! Each user has one current income record and one current expense record.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use shared::{BudgetEntity, ErrorResponse, ExpenseRecord, IncomeRecord, UpsertRecordRequest};
use tracing::{error, info, warn};

use crate::domain::{RecordService, RecordServiceError};
use crate::AppState;

/// Create a router for record related APIs, nested under `/api/users`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:user_id/income/latest", get(get_latest_income))
        .route("/:user_id/income", put(save_income))
        .route("/:user_id/expense/latest", get(get_latest_expense))
        .route("/:user_id/expense", put(save_expense))
}

pub async fn get_latest_income(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    info!("GET /api/users/{}/income/latest", user_id);
    latest_response(&state.income_service, &user_id).await
}

pub async fn save_income(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpsertRecordRequest<IncomeRecord>>,
) -> Response {
    info!("PUT /api/users/{}/income - total: {:.2}", user_id, request.record.total());
    save_response(&state.income_service, &user_id, request.record).await
}

pub async fn get_latest_expense(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    info!("GET /api/users/{}/expense/latest", user_id);
    latest_response(&state.expense_service, &user_id).await
}

pub async fn save_expense(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpsertRecordRequest<ExpenseRecord>>,
) -> Response {
    info!("PUT /api/users/{}/expense - total: {:.2}", user_id, request.record.total());
    save_response(&state.expense_service, &user_id, request.record).await
}

async fn latest_response<E: BudgetEntity>(service: &RecordService<E>, user_id: &str) -> Response {
    match service.get_latest(user_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(E::KIND.as_str(), "load", e),
    }
}

async fn save_response<E: BudgetEntity>(service: &RecordService<E>, user_id: &str, record: E) -> Response {
    match service.save(user_id, record).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(E::KIND.as_str(), "save", e),
    }
}

fn error_response(kind: &str, action: &str, err: RecordServiceError) -> Response {
    let status = match &err {
        RecordServiceError::InvalidUser(_) => {
            warn!("Rejected {} {} request: {}", kind, action, err);
            StatusCode::BAD_REQUEST
        }
        RecordServiceError::Storage(_) => {
            error!("Failed to {} {} record: {}", action, kind, err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse { error: err.to_string() })).into_response()
}
