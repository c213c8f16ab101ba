//! API error responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use ecoscan_core::EcoScanError;
use ecoscan_logging::{ApiEvent, EventLogger, redact_sensitive_data};

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body returned to clients: `{"error": ...}`, plus `"message"` on
/// routes whose contract carries one.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: None,
        }
    }

    /// 400 Bad Request
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Map an unreadable request body. Oversized bodies keep their 413;
    /// everything else is a 400.
    pub fn from_json_rejection(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
        Self::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }

    /// Map a domain error and record it for `route`.
    pub fn from_domain(route: &str, err: EcoScanError) -> Self {
        let status = match &err {
            EcoScanError::Validation(_) => StatusCode::BAD_REQUEST,
            EcoScanError::Config(_)
            | EcoScanError::Upstream { .. }
            | EcoScanError::Persistence(_)
            | EcoScanError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match &err {
            EcoScanError::Validation(message) => message.clone(),
            other => other.to_string(),
        };
        error!(
            route,
            kind = err.kind(),
            status = status.as_u16(),
            error = %redact_sensitive_data(&message),
            "Request failed"
        );
        EventLogger::log_event(
            route,
            ApiEvent::Failure {
                status: status.as_u16(),
                error_msg: message.clone(),
            },
        );
        Self::new(status, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status, self.error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.message {
            Some(message) => json!({ "message": message, "error": self.error }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}
