use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiResponse, AppState, MessageResponse};

#[derive(Debug, Serialize)]
pub struct HealthLiveResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthReadinessChecks {
    pub database: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthReadyResponse {
    pub ready: bool,
    pub uptime_seconds: u64,
    pub checks: HealthReadinessChecks,
}

/// `GET /`
pub async fn root() -> impl IntoResponse {
    Json(ApiResponse::success(MessageResponse {
        message: "Welcome to the Document Retrieval API!".to_string(),
    }))
}

/// `GET /health`
///
/// Liveness only. Touches nothing.
pub async fn health_live() -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse {
        status: "API is active",
    }))
}

/// `GET /health/ready`
///
/// Readiness probe that checks database connectivity.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let db_ready = state.store().ping().await.is_ok();

    let status = if db_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthReadyResponse {
            ready: db_ready,
            uptime_seconds: state.start_time.elapsed().as_secs(),
            checks: HealthReadinessChecks { database: db_ready },
        })),
    )
        .into_response()
}
