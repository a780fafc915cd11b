//! Error types for CyberDash core operations

use thiserror::Error;

/// Errors raised by the pure data-shaping functions (generator, filter,
/// paginator, drift).
///
/// These fail fast and synchronously; callers are expected to validate
/// their inputs before invoking the pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

impl CoreError {
    /// Build an `InvalidArgument` error for a named field.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidArgument { field, .. } => field,
        }
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = CoreError::invalid_argument("count", "must be > 0");
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid argument"));
        assert!(msg.contains("count"));
        assert!(msg.contains("must be > 0"));
    }

    #[test]
    fn test_invalid_argument_field() {
        let err = CoreError::invalid_argument("page", "must be >= 1");
        assert_eq!(err.field(), "page");
    }
}
