//! Error Types for CyberDash API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cyberdash_core::CoreError;
use cyberdash_llm::LlmError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request contains invalid input data
    InvalidInput,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested agent does not exist
    AgentNotFound,

    // ========================================================================
    // Upstream Errors (502, 504)
    // ========================================================================
    /// The chat backend rejected or failed the request
    UpstreamFailed,

    /// The chat backend did not answer in time
    Timeout,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// A required integration has no credentials configured
    NotConfigured,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,

            ErrorCode::AgentNotFound => StatusCode::NOT_FOUND,

            ErrorCode::UpstreamFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,

            ErrorCode::InternalError | ErrorCode::NotConfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn agent_not_found(agent_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::AgentNotFound,
            format!("Agent {} not found", agent_id),
        )
    }

    pub fn upstream_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamFailed, message)
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotConfigured, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::InvalidArgument { field, .. } => {
                let field = field.clone();
                ApiError::invalid_input(err.to_string())
                    .with_details(serde_json::json!({ "field": field }))
            }
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        tracing::warn!(error = %err, "Chat provider error");
        match &err {
            LlmError::ProviderNotConfigured => ApiError::not_configured(err.message()),
            LlmError::RequestFailed { status, .. } => {
                let api = ApiError::upstream_failed(err.message());
                if *status == 0 {
                    api
                } else {
                    api.with_details(serde_json::json!({ "upstreamStatus": status }))
                }
            }
            LlmError::InvalidResponse { .. } => ApiError::upstream_failed(err.message()),
            LlmError::Timeout { .. } => ApiError::timeout(err.message()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::AgentNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::UpstreamFailed.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorCode::NotConfigured.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_api_error_constructors() {
        let err = ApiError::agent_not_found(42);
        assert_eq!(err.code, ErrorCode::AgentNotFound);
        assert_eq!(err.message, "Agent 42 not found");

        let err = ApiError::internal_error("boom");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_core_error() {
        let err: ApiError = CoreError::invalid_argument("page", "page must be at least 1").into();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.details, Some(serde_json::json!({ "field": "page" })));
    }

    #[test]
    fn test_from_llm_error() {
        let err: ApiError = LlmError::ProviderNotConfigured.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ApiError = LlmError::RequestFailed {
            provider: "gemini".to_string(),
            status: 429,
            message: "quota".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::UpstreamFailed);
        assert_eq!(err.message, "quota");
        assert_eq!(err.details, Some(serde_json::json!({ "upstreamStatus": 429 })));

        let err: ApiError = LlmError::Timeout {
            provider: "gemini".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Timeout);
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.message, "Request timed out");
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::invalid_input("Specify { add: n } or { scale: n }");
        let json = serde_json::to_string(&err)?;
        assert!(json.contains("INVALID_INPUT"));
        let back: ApiError = serde_json::from_str(&json)?;
        assert_eq!(back, err);
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::upstream_failed("bad gateway");
        let display = format!("{}", err);
        assert!(display.contains("UpstreamFailed"));
        assert!(display.contains("bad gateway"));
    }
}
