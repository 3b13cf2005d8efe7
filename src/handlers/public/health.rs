// handlers/public/health.rs - GET /health

use axum::extract::State;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Liveness plus a storage ping
pub async fn health(State(state): State<AppState>) -> ApiResult {
    match state.applications.health_check().await {
        Ok(()) => Ok(ApiResponse::ok("ok").with("timestamp", chrono::Utc::now())),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("database unavailable"))
        }
    }
}
