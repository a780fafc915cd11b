//! CyberDash LLM - Chat Provider Layer
//!
//! Provider-agnostic trait for multi-turn chat completion, a registry that
//! holds the configured provider, and a deterministic mock for tests.
//! Concrete hosted providers live under [`providers`].

pub mod providers;

pub use providers::{GeminiChatProvider, GeminiClient};

use async_trait::async_trait;
use cyberdash_core::{ChatTurn, WireRole};
use std::sync::{Arc, Mutex};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Errors from chat providers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("Chat provider not configured")]
    ProviderNotConfigured,

    #[error("{provider} request failed ({status}): {message}")]
    RequestFailed {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("{provider} request timed out")]
    Timeout { provider: String },
}

impl LlmError {
    /// Human-facing description without the provider prefix.
    pub fn message(&self) -> String {
        match self {
            LlmError::ProviderNotConfigured => "Chat provider not configured".to_string(),
            LlmError::RequestFailed { message, .. } => message.clone(),
            LlmError::InvalidResponse { reason, .. } => reason.clone(),
            LlmError::Timeout { .. } => "Request timed out".to_string(),
        }
    }

    /// Upstream HTTP status, when the provider answered with one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            LlmError::RequestFailed { status, .. } if *status != 0 => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for provider operations.
pub type LlmResult<T> = Result<T, LlmError>;

// ============================================================================
// CHAT PROVIDER TRAIT
// ============================================================================

/// Multi-turn chat completion.
///
/// `turns` is the whole conversation so far, oldest first, ending with the
/// user turn to answer. Implementations make a single attempt.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Produce the model's reply text.
    async fn complete(&self, turns: &[ChatTurn]) -> LlmResult<String>;

    /// Model identifier for logging.
    fn model_id(&self) -> &str;
}

// ============================================================================
// PROVIDER REGISTRY
// ============================================================================

/// Holds the configured chat provider.
/// Providers must be explicitly registered - no auto-discovery.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    chat: Option<Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self { chat: None }
    }

    /// Register a chat provider, replacing any previous one.
    pub fn register_chat(&mut self, provider: Arc<dyn ChatProvider>) {
        self.chat = Some(provider);
    }

    /// Get the registered chat provider.
    ///
    /// # Returns
    /// * `Err(LlmError::ProviderNotConfigured)` - If no provider registered
    pub fn chat(&self) -> LlmResult<Arc<dyn ChatProvider>> {
        self.chat.clone().ok_or(LlmError::ProviderNotConfigured)
    }

    pub fn has_chat(&self) -> bool {
        self.chat.is_some()
    }

    pub fn clear_chat(&mut self) {
        self.chat = None;
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("chat", &self.chat.as_ref().map(|p| p.model_id().to_string()))
            .finish()
    }
}

// ============================================================================
// MOCK PROVIDER FOR TESTING
// ============================================================================

#[derive(Debug, Clone)]
enum MockBehavior {
    Echo { prefix: String },
    Fixed(String),
    Fail(LlmError),
}

/// Mock chat provider for testing.
/// Replies deterministically and records every conversation it receives.
#[derive(Debug, Clone)]
pub struct MockChatProvider {
    behavior: MockBehavior,
    calls: Arc<Mutex<Vec<Vec<ChatTurn>>>>,
}

impl MockChatProvider {
    /// Echo the last user turn back with an `Echo: ` prefix.
    pub fn echo() -> Self {
        Self::with_behavior(MockBehavior::Echo {
            prefix: "Echo: ".to_string(),
        })
    }

    /// Always reply with the same text.
    pub fn fixed(reply: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Fixed(reply.into()))
    }

    /// Always fail with the given error.
    pub fn failing(error: LlmError) -> Self {
        Self::with_behavior(MockBehavior::Fail(error))
    }

    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Conversations received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<ChatTurn>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for MockChatProvider {
    fn default() -> Self {
        Self::echo()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(&self, turns: &[ChatTurn]) -> LlmResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(turns.to_vec());
        }
        match &self.behavior {
            MockBehavior::Echo { prefix } => {
                let last = turns
                    .iter()
                    .rev()
                    .find(|t| t.role == WireRole::User)
                    .map(|t| t.content.as_str())
                    .unwrap_or_default();
                Ok(format!("{}{}", prefix, last))
            }
            MockBehavior::Fixed(reply) => Ok(reply.clone()),
            MockBehavior::Fail(error) => Err(error.clone()),
        }
    }

    fn model_id(&self) -> &str {
        "mock-chat"
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// An empty registry SHALL always report ProviderNotConfigured
        #[test]
        fn prop_registry_returns_error_when_not_configured(_seed in 0u64..1000u64) {
            let registry = ProviderRegistry::new();
            prop_assert!(matches!(registry.chat(), Err(LlmError::ProviderNotConfigured)));
        }

        /// The fixed mock SHALL return its reply regardless of conversation
        #[test]
        fn prop_fixed_mock_ignores_input(
            reply in "[a-zA-Z ]{0,40}",
            turns in prop::collection::vec("[a-z]{1,10}", 1..6),
        ) {
            let provider = MockChatProvider::fixed(reply.clone());
            let turns: Vec<ChatTurn> = turns.into_iter().map(ChatTurn::user).collect();
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let got = rt.block_on(provider.complete(&turns)).unwrap();
            prop_assert_eq!(got, reply);
        }
    }
}
