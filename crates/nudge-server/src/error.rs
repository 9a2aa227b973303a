//! Error handling for the classification server.
//!
//! Error bodies keep the endpoint's historical shape, `{error}` or
//! `{error, details}`, with a structured `code` added alongside.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use nudge_core::error::NudgeError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "NOT_CONFIGURED", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code,
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<NudgeError> for ApiError {
    fn from(err: NudgeError) -> Self {
        match err {
            NudgeError::Validation { message, code, .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, code.as_str(), message)
            }
            NudgeError::ConditionLimit { message, code, .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, code.as_str(), message)
            }
            NudgeError::NotFound { message, code } => {
                ApiError::new(StatusCode::NOT_FOUND, code.as_str(), message)
            }
            NudgeError::Authentication { message, .. } => ApiError::not_configured(message),
            NudgeError::Llm { message, .. } => {
                ApiError::upstream("Failed to call LLM API").with_details(message)
            }
            other => ApiError::internal("Internal server error").with_details(other.to_string()),
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ApiError = NudgeError::missing_field("message").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "VAL_002");
    }

    #[test]
    fn test_llm_failure_carries_details() {
        let err: ApiError = NudgeError::llm("quota exceeded").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to call LLM API");
        assert_eq!(err.details.as_deref(), Some("quota exceeded"));
    }
}
