//! Chat provider implementations
//!
//! Concrete implementations of [`ChatProvider`](crate::ChatProvider) for
//! hosted generative-text services.

pub mod gemini;

pub use gemini::{GeminiChatProvider, GeminiClient};

use crate::LlmError;

pub(crate) fn request_failed(provider: &str, status: u16, message: impl Into<String>) -> LlmError {
    LlmError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    }
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> LlmError {
    LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    }
}

/// Map a transport failure, keeping timeouts distinct.
pub(crate) fn transport_failed(provider: &str, err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout {
            provider: provider.to_string(),
        }
    } else {
        request_failed(provider, 0, format!("HTTP request failed: {}", err))
    }
}
