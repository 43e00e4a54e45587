//! JSON error responses shared by handlers and middleware

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::speech::SpeechError;

/// Error rendered as `{ "error": message }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Create an error with the given status
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Too many requests for the configured limit
    #[must_use]
    pub fn rate_limited() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<SpeechError> for ApiError {
    fn from(err: SpeechError) -> Self {
        let status = match &err {
            SpeechError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SpeechError::Misconfigured(_) | SpeechError::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SpeechError::Upstream { status_code, .. } => StatusCode::from_u16(*status_code)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        };

        Self::new(status, err.to_string())
    }
}

impl IntoResponse for SpeechError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
