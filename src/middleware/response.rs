use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success envelope: `{status, message, ...extra}`. Extra fields are the
/// route payload, e.g. `application` or `workTypes`.
#[derive(Debug)]
pub struct ApiResponse {
    pub status_code: StatusCode,
    pub message: String,
    extra: Map<String, Value>,
    failed: Option<String>,
}

impl ApiResponse {
    /// Create a 200 OK response with no payload
    pub fn ok(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message)
    }

    pub fn with_status(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            extra: Map::new(),
            failed: None,
        }
    }

    /// Attach a payload field. A value that fails to serialize turns the
    /// whole response into a 500.
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.extra.insert(key.to_string(), value);
            }
            Err(e) => self.failed = Some(e.to_string()),
        }
        self
    }

    pub fn to_json(&self) -> Value {
        let mut body = self.extra.clone();
        body.insert("status".to_string(), json!(self.status_code.as_u16()));
        body.insert("message".to_string(), json!(self.message));
        Value::Object(body)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        if let Some(e) = &self.failed {
            tracing::error!("Failed to serialize response data: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": 500,
                    "message": "Failed to serialize response data"
                })),
            )
                .into_response();
        }

        (self.status_code, Json(self.to_json())).into_response()
    }
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
