use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, attached to the request by `jwt_auth_middleware`
/// and read by handlers through `Extension<AuthUser>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

const UNAUTHORIZED_MESSAGE: &str = "You are not allowed";

/// JWT authentication middleware that validates tokens and extracts user context.
/// Every failure gets the same 401 envelope; the reason is only logged.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_headers(&headers).map_err(|reason| {
        tracing::debug!("Rejected request to {}: {}", request.uri().path(), reason);
        ApiError::unauthorized(UNAUTHORIZED_MESSAGE)
    })?;

    let claims = state.keys.verify(token).map_err(|e| {
        tracing::debug!("Rejected request to {}: {}", request.uri().path(), e.kind());
        ApiError::unauthorized(UNAUTHORIZED_MESSAGE)
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Extract the token from the Authorization header. Both the bare token and
/// the `Bearer <token>` form are accepted.
fn extract_token_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "invalid Authorization header encoding")?;

    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();
    if token.is_empty() {
        return Err("empty token");
    }
    Ok(token)
}
