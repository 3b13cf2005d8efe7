// handlers/public/types.rs - /api/types/* handlers
//
// Enumeration lookups are open: no token, no ownership, read-only.

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/types/worktypes
pub async fn work_types(State(state): State<AppState>) -> ApiResult {
    let work_types = state.types.work_types().await?;
    Ok(ApiResponse::ok("Fetched all work types").with("workTypes", work_types))
}

/// GET /api/types/statuses
pub async fn statuses(State(state): State<AppState>) -> ApiResult {
    let statuses = state.types.statuses().await?;
    Ok(ApiResponse::ok("Fetched all statuses").with("statuses", statuses))
}
