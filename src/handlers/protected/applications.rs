// handlers/protected/applications.rs - /api/applications handlers
//
// Each request moves through: authenticated (middleware) -> authorized for
// the resource (ownership check below) -> handled. Any failing step returns
// the error envelope immediately.

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    Extension,
};

use crate::database::models::Application;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/applications - All applications owned by the caller
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult {
    let applications = state.applications.list_by_owner(user.user_id).await?;

    Ok(ApiResponse::ok("Fetched all applications").with("applications", applications))
}

/// GET /api/applications/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let id = parse_id(id)?;
    let application = owned_application(
        &state,
        id,
        &user,
        "You are not allowed to get information about this application",
    )
    .await?;

    Ok(ApiResponse::ok("Fetched application").with("application", application))
}

/// POST /api/applications
///
/// The owner is always the caller; any `userId` in the body is overwritten.
/// A body that fails to decode is answered with 500.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> ApiResult {
    let mut application: Application = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Could not decode application body: {}", e);
        ApiError::internal_server_error("Could not create application")
    })?;

    application.user_id = user.user_id;

    let id = state.applications.insert(&application).await.map_err(|e| {
        tracing::error!("Could not insert application for user {}: {}", user.user_id, e);
        ApiError::internal_server_error("Could not create application")
    })?;

    // Not atomic with the insert; a failure here still leaves the row behind
    let created = state.applications.get(id).await?;
    tracing::info!("User {} created application {}", user.user_id, id);

    Ok(ApiResponse::ok("Application created").with("application", created))
}

/// PUT /api/applications/:id - Full replace of every mutable field
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> ApiResult {
    let id = parse_id(id)?;
    let incoming: Application = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Could not decode application body: {}", e);
        ApiError::internal_server_error("Could not update application")
    })?;

    let mut application =
        owned_application(&state, id, &user, "You are not allowed to update this application").await?;
    application.replace_fields(incoming);

    state.applications.update(&application).await.map_err(|e| match e {
        e if e.is_not_found() => ApiError::bad_request("This application does not exist"),
        e => {
            tracing::error!("Could not update application {}: {}", id, e);
            ApiError::internal_server_error("Could not update application")
        }
    })?;

    let updated = state.applications.get(id).await?;
    Ok(ApiResponse::ok("Application updated").with("application", updated))
}

/// DELETE /api/applications/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let id = parse_id(id)?;
    owned_application(&state, id, &user, "You are not allowed to delete this application").await?;

    state.applications.delete(id).await.map_err(|e| match e {
        e if e.is_not_found() => ApiError::bad_request("This application does not exist"),
        e => ApiError::from(e),
    })?;
    tracing::info!("User {} deleted application {}", user.user_id, id);

    Ok(ApiResponse::ok("Application deleted"))
}

/// Any unusable id segment, including one that is not valid UTF-8 once
/// percent-decoded, gets the 400 envelope.
fn parse_id(id: Result<Path<String>, PathRejection>) -> Result<i32, ApiError> {
    let invalid = || ApiError::bad_request("Error while parsing the application id");

    let Path(raw) = id.map_err(|e| {
        tracing::debug!("Rejected application id: {}", e);
        invalid()
    })?;
    raw.parse().map_err(|_| invalid())
}

/// Load an application and check that the caller owns it. A missing record
/// is a 400, a foreign one a 401.
async fn owned_application(
    state: &AppState,
    id: i32,
    user: &AuthUser,
    denied_message: &str,
) -> Result<Application, ApiError> {
    let application = state.applications.get(id).await.map_err(|e| {
        if e.is_not_found() {
            ApiError::bad_request("This application does not exist")
        } else {
            ApiError::from(e)
        }
    })?;

    if application.user_id != user.user_id {
        tracing::warn!(
            "User {} ({}) denied access to application {}",
            user.user_id,
            user.username,
            id
        );
        return Err(ApiError::unauthorized(denied_message));
    }

    Ok(application)
}
