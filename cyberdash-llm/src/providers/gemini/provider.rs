//! Gemini chat provider

use super::client::{GeminiClient, PROVIDER};
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, Part};
use crate::providers::invalid_response;
use crate::{ChatProvider, LlmResult};
use async_trait::async_trait;
use cyberdash_core::{ChatTurn, WireRole};
use std::time::Duration;

/// Default model for dashboard chat.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Chat provider backed by Gemini `generateContent`.
#[derive(Debug)]
pub struct GeminiChatProvider {
    client: GeminiClient,
    model: String,
    system_prompt: Option<String>,
}

impl GeminiChatProvider {
    /// Create a new Gemini chat provider.
    ///
    /// # Arguments
    /// * `api_key` - Generative Language API key
    /// * `model` - Model name (e.g., "gemini-2.5-flash")
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> LlmResult<Self> {
        Ok(Self {
            client: GeminiClient::new(api_key, timeout)?,
            model: model.into(),
            system_prompt: None,
        })
    }

    /// Create provider with the default model.
    pub fn with_default_model(api_key: impl Into<String>, timeout: Duration) -> LlmResult<Self> {
        Self::new(api_key, DEFAULT_MODEL, timeout)
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_client(mut self, client: GeminiClient) -> Self {
        self.client = client;
        self
    }

    /// Build the request body for a conversation.
    pub fn build_request(&self, turns: &[ChatTurn]) -> GenerateContentRequest {
        let contents = turns
            .iter()
            .map(|turn| Content {
                role: Some(
                    match turn.role {
                        WireRole::User => "user",
                        WireRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: Some(turn.content.clone()),
                }],
            })
            .collect();

        let system_instruction = self.system_prompt.as_ref().map(|prompt| Content {
            role: None,
            parts: vec![Part {
                text: Some(prompt.clone()),
            }],
        });

        GenerateContentRequest {
            contents,
            system_instruction,
        }
    }
}

#[async_trait]
impl ChatProvider for GeminiChatProvider {
    async fn complete(&self, turns: &[ChatTurn]) -> LlmResult<String> {
        if turns.is_empty() {
            return Err(invalid_response(PROVIDER, "conversation has no turns"));
        }

        let request = self.build_request(turns);
        tracing::debug!(model = %self.model, turns = turns.len(), "Sending Gemini request");
        let response: GenerateContentResponse = self.client.generate(&self.model, &request).await?;

        match response.text() {
            Some(text) => Ok(text),
            None => {
                let reason = response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .map(|r| format!("response blocked: {}", r))
                    .unwrap_or_else(|| "response contained no text".to_string());
                Err(invalid_response(PROVIDER, reason))
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiChatProvider {
        GeminiChatProvider::with_default_model("k", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_default_model() {
        assert_eq!(provider().model_id(), "gemini-2.5-flash");
    }

    #[test]
    fn test_build_request_keeps_turn_order_and_roles() {
        let turns = vec![
            ChatTurn::user("q1"),
            ChatTurn::model("a1"),
            ChatTurn::user("q2"),
        ];
        let request = provider().build_request(&turns);
        let roles: Vec<_> = request
            .contents
            .iter()
            .map(|c| c.role.clone().unwrap_or_default())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(request.contents[2].parts[0].text.as_deref(), Some("q2"));
        assert!(request.system_instruction.is_none());
    }

    #[test]
    fn test_system_prompt_attached() {
        let p = provider().with_system_prompt(Some("You are a SOC assistant.".to_string()));
        let request = p.build_request(&[ChatTurn::user("hi")]);
        let instruction = request.system_instruction.unwrap();
        assert_eq!(
            instruction.parts[0].text.as_deref(),
            Some("You are a SOC assistant.")
        );
    }

    #[test]
    fn test_blank_system_prompt_ignored() {
        let p = provider().with_system_prompt(Some("   ".to_string()));
        assert!(p.build_request(&[ChatTurn::user("hi")]).system_instruction.is_none());
    }

    #[tokio::test]
    async fn test_empty_conversation_rejected() {
        let err = provider().complete(&[]).await.unwrap_err();
        assert!(matches!(err, crate::LlmError::InvalidResponse { .. }));
    }
}
