use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    clients::health::HealthChecker,
    dispatcher::Dispatcher,
    error::NotificationError,
    models::{
        health::HealthStatus,
        request::NotificationRequest,
        response::ApiResponse,
        result::{BulkSummary, NotificationResult},
    },
};

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub health_checker: HealthChecker,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/notifications", post(send_notification))
        .route("/api/v1/notifications/bulk", post(send_bulk_notifications))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(port: u16, state: Arc<AppState>) -> Result<(), Error> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification API server started");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all();

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn send_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NotificationRequest>,
) -> (StatusCode, Json<ApiResponse<NotificationResult>>) {
    match state.dispatcher.dispatch(&request).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                result,
                "Notification sent".to_string(),
            )),
        ),
        Err(e) => (
            status_for(&e),
            Json(ApiResponse::error(
                e.to_string(),
                "Failed to send notification".to_string(),
            )),
        ),
    }
}

async fn send_bulk_notifications(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<NotificationRequest>>,
) -> (StatusCode, Json<ApiResponse<BulkSummary>>) {
    let report = state.dispatcher.dispatch_all_detailed(&requests).await;
    let message = format!(
        "{} of {} notifications sent",
        report.succeeded(),
        requests.len()
    );

    (
        StatusCode::OK,
        Json(ApiResponse::success(BulkSummary::from(report), message)),
    )
}

fn status_for(error: &NotificationError) -> StatusCode {
    match error {
        NotificationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        NotificationError::Transport { .. } => StatusCode::BAD_GATEWAY,
        NotificationError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
    }
}
