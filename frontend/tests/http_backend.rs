//! Hooks and sessions talking to a real backend over HTTP.

use axum::{
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use backend::config::BackendConfig;
use backend::storage::DbConnection;
use backend::{create_router, AppState};
use frontend::hooks::{EntityDataHook, SaveOutcome, SyncStatus};
use frontend::services::{
    AuthSession, GatewayError, HttpGateway, Language, Localizer, NotificationCenter, RecordGateway, Severity,
};
use frontend::{BudgetSession, SessionConfig};
use shared::{BudgetEntity, ErrorResponse, ExpenseField, IncomeField, IncomeRecord, UserIdentity};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port and return its base URL
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    format!("http://{}", addr)
}

async fn backend() -> (AppState, String) {
    let db = DbConnection::in_memory().await.expect("Failed to create test database");
    let state = AppState::from_connection(db);
    let base_url = serve(create_router(state.clone(), &BackendConfig::default())).await;
    (state, base_url)
}

async fn eventually<F>(mut check: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached within 2s");
}

fn income_hook(
    base_url: &str,
    auth: Arc<AuthSession>,
    notifications: Arc<NotificationCenter>,
) -> EntityDataHook<IncomeRecord> {
    EntityDataHook::new(
        Arc::new(HttpGateway::<IncomeRecord>::new(base_url)),
        auth,
        Arc::new(Localizer::new(Language::English)),
        notifications,
        Duration::from_millis(50),
    )
}

#[tokio::test]
async fn test_hook_saves_and_reloads_over_http() {
    let (state, base_url) = backend().await;
    let auth = Arc::new(AuthSession::new());
    auth.sign_in(UserIdentity::new("user-1"));
    let notifications = Arc::new(NotificationCenter::new(10));
    let hook = income_hook(&base_url, auth.clone(), notifications.clone());

    hook.load().await;
    assert_eq!(hook.status(), SyncStatus::Clean);
    assert_eq!(hook.total(), 0.0);
    assert!(notifications.is_empty());

    hook.update_input(IncomeField::BasicSalary, "4200");
    hook.update_input(IncomeField::Investments, "300");
    assert_eq!(hook.save_manually().await, SaveOutcome::Saved);
    assert_eq!(notifications.count(Severity::Success), 1);

    let stored = state.income_service.get_latest("user-1").await.unwrap().record.unwrap();
    assert_eq!(stored.record.total(), 4500.0);

    let reopened = income_hook(&base_url, auth, Arc::new(NotificationCenter::new(10)));
    reopened.load().await;
    assert_eq!(reopened.total(), 4500.0);
    assert_eq!(reopened.record().basic_salary(), 4200.0);
    assert!(!reopened.has_changes());
}

#[tokio::test]
async fn test_remote_session_autosaves_over_http() {
    let (state, base_url) = backend().await;
    let config = SessionConfig {
        autosave_ms: 50,
        language: Language::English,
        api_base_url: base_url,
        ..SessionConfig::default()
    };
    let auth = Arc::new(AuthSession::new());
    let session = BudgetSession::remote(&config, auth.clone());

    auth.sign_in(UserIdentity::new("user-1"));
    eventually(|| session.expenses().status() == SyncStatus::Clean).await;

    session.expenses().update([(ExpenseField::Housing, 2500.0), (ExpenseField::Food, 700.0)]);
    eventually(|| !session.expenses().has_changes()).await;

    let stored = state.expense_service.get_latest("user-1").await.unwrap().record.unwrap();
    assert_eq!(stored.record.total(), 3200.0);
    assert!(session.notifications().is_empty());
}

#[tokio::test]
async fn test_rejected_user_id_maps_to_unauthorized() {
    let (_state, base_url) = backend().await;
    let gateway = HttpGateway::<IncomeRecord>::new(base_url);

    let err = gateway.fetch_latest("  ").await.unwrap_err();
    assert!(matches!(err, GatewayError::Unauthorized(_)));

    let record = IncomeRecord::from_values([(IncomeField::Rent, 100.0)]);
    let err = gateway.upsert("  ", &record).await.unwrap_err();
    assert!(matches!(err, GatewayError::Unauthorized(_)));
}

async fn storage_failure() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "disk full".to_string(),
        }),
    )
}

#[tokio::test]
async fn test_server_errors_map_to_backend_errors() {
    let app = Router::new()
        .route("/api/users/:user_id/income/latest", get(storage_failure))
        .route("/api/users/:user_id/income", put(storage_failure));
    let gateway = HttpGateway::<IncomeRecord>::new(serve(app).await);

    let err = gateway.fetch_latest("user-1").await.unwrap_err();
    assert_eq!(err, GatewayError::Backend("disk full".to_string()));

    let err = gateway.upsert("user-1", &IncomeRecord::default()).await.unwrap_err();
    assert_eq!(err, GatewayError::Backend("disk full".to_string()));
}

#[tokio::test]
async fn test_missing_route_maps_to_not_found() {
    let gateway = HttpGateway::<IncomeRecord>::new(serve(Router::new()).await);

    let err = gateway.fetch_latest("user-1").await.unwrap_err();
    assert_eq!(err, GatewayError::NotFound);
}

#[tokio::test]
async fn test_unreachable_backend_notifies_on_load() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = HttpGateway::<IncomeRecord>::new(base_url.clone())
        .fetch_latest("user-1")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Backend(_)));

    let auth = Arc::new(AuthSession::new());
    auth.sign_in(UserIdentity::new("user-1"));
    let notifications = Arc::new(NotificationCenter::new(10));
    let hook = income_hook(&base_url, auth, notifications.clone());

    hook.load().await;
    assert_eq!(hook.status(), SyncStatus::Uninitialized);
    assert_eq!(notifications.count(Severity::Error), 1);
}
