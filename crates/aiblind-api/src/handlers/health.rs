//! Health check handler

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
}

/// `GET /api/health`: 200 when both directories accept new files, 503 otherwise.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.check_health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthCheckResponse {
                status: "healthy".to_string(),
                storage: "healthy".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthCheckResponse {
                    status: "unhealthy".to_string(),
                    storage: e.to_string(),
                }),
            )
        }
    }
}
