//! Gemini HTTP client

use super::types::ApiError;
use crate::providers::{invalid_response, request_failed, transport_failed};
use crate::LlmResult;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

pub(crate) const PROVIDER: &str = "gemini";

/// Default Generative Language API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client. One request per call; no retry or rate limiting.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Arguments
    /// * `api_key` - Generative Language API key
    /// * `timeout` - Whole-request timeout
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| request_failed(PROVIDER, 0, format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the `generateContent` method for a model.
    pub fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// POST a JSON body to the model's `generateContent` method.
    pub async fn generate<Req: Serialize, Res: DeserializeOwned>(
        &self,
        model: &str,
        body: &Req,
    ) -> LlmResult<Res> {
        let url = self.generate_url(model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| transport_failed(PROVIDER, e))?;

        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| invalid_response(PROVIDER, format!("Failed to parse response: {}", e)))
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(request_failed(
                PROVIDER,
                status.as_u16(),
                error_message(&error_text),
            ))
        }
    }
}

/// Message from a JSON error envelope, or the raw body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => api_error.error.message,
        Err(_) => body.to_string(),
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key() {
        let client = GeminiClient::new("secret-key", Duration::from_secs(5)).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_generate_url() {
        let client = GeminiClient::new("k", Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://localhost:9999/v1beta/");
        assert_eq!(
            client.generate_url("gemini-2.5-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        assert_eq!(
            error_message(r#"{"error":{"message":"quota exceeded"}}"#),
            "quota exceeded"
        );
        assert_eq!(error_message("bad gateway"), "bad gateway");
    }

    #[tokio::test]
    async fn test_stalled_upstream_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let client = GeminiClient::new("k", Duration::from_millis(100))
            .unwrap()
            .with_base_url(format!("http://{}", addr));
        let err = client
            .generate::<_, serde_json::Value>("gemini-2.5-flash", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::LlmError::Timeout { .. }), "{:?}", err);
        server.abort();
    }
}
