//! REST client for the CyberDash API.

use async_trait::async_trait;
use cyberdash_api::error::ApiError as ApiServerError;
use cyberdash_api::routes::agents::RosterChange;
use cyberdash_api::AgentListing;
use cyberdash_core::{Agent, AgentId, ChatReply, ChatRequest, ChatTurn, LiveCounters};
use cyberdash_llm::{ChatProvider, LlmError, LlmResult};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::config::ClientConfig;

const PROVIDER: &str = "cyberdash-api";

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
}

impl ApiClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiClientError::Status { status, .. } => Some(*status),
            ApiClientError::Http(err) => err.status().map(|s| s.as_u16()),
            ApiClientError::Serde(_) => None,
        }
    }
}

impl From<ApiClientError> for LlmError {
    fn from(err: ApiClientError) -> Self {
        match err {
            ApiClientError::Serde(e) => LlmError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            },
            ApiClientError::Http(e) if e.is_timeout() => LlmError::Timeout {
                provider: PROVIDER.to_string(),
            },
            other => LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                status: other.status().unwrap_or(0),
                message: other.to_string(),
            },
        }
    }
}

/// Query string for `GET /api/agents`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl AgentFilter {
    pub fn text(q: impl Into<String>) -> Self {
        let q = q.into();
        Self {
            q: (!q.is_empty()).then_some(q),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }
}

#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Agents
    // ------------------------------------------------------------------------

    pub async fn list_agents(&self, filter: &AgentFilter) -> Result<AgentListing, ApiClientError> {
        let response = self
            .client
            .get(self.url("/api/agents"))
            .query(filter)
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn get_agent(&self, id: AgentId) -> Result<Agent, ApiClientError> {
        let response = self
            .client
            .get(self.url(&format!("/api/agents/{}", id)))
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn add_agents(&self, n: usize) -> Result<RosterChange, ApiClientError> {
        self.post_json("/api/agents", &json!({ "add": n })).await
    }

    pub async fn scale_agents(&self, n: usize) -> Result<RosterChange, ApiClientError> {
        self.post_json("/api/agents", &json!({ "scale": n })).await
    }

    pub async fn reset_agents(&self) -> Result<RosterChange, ApiClientError> {
        let response = self.client.delete(self.url("/api/agents")).send().await?;
        parse_response(response).await
    }

    pub async fn reseed_agents(
        &self,
        count: Option<usize>,
        seed: Option<i64>,
    ) -> Result<RosterChange, ApiClientError> {
        self.post_json("/api/agents/reseed", &json!({ "count": count, "seed": seed }))
            .await
    }

    pub async fn live_counters(&self) -> Result<LiveCounters, ApiClientError> {
        let response = self.client.get(self.url("/api/agents/live")).send().await?;
        parse_response(response).await
    }

    // ------------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------------

    pub async fn chat(&self, turns: &[ChatTurn]) -> Result<ChatReply, ApiClientError> {
        let request = ChatRequest {
            messages: turns.to_vec(),
        };
        self.post_json("/api/chat", &request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiClientError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        parse_response(response).await
    }
}

#[async_trait]
impl ChatProvider for RestClient {
    async fn complete(&self, turns: &[ChatTurn]) -> LlmResult<String> {
        Ok(self.chat(turns).await?.content)
    }

    fn model_id(&self) -> &str {
        PROVIDER
    }
}

async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiClientError> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        return Ok(serde_json::from_str(&text)?);
    }
    Err(ApiClientError::Status {
        status: status.as_u16(),
        message: error_message(status.as_u16(), &text),
    })
}

/// Server error message, or the raw body when it is not an API error.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(api_error) = serde_json::from_str::<ApiServerError>(body) {
        return api_error.message;
    }
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_api_error() {
        let body = r#"{"code":"NOT_CONFIGURED","message":"Missing GEMINI_API_KEY"}"#;
        assert_eq!(error_message(500, body), "Missing GEMINI_API_KEY");
    }

    #[test]
    fn test_error_message_falls_back_to_text() {
        assert_eq!(error_message(502, "bad gateway\n"), "bad gateway");
        assert_eq!(error_message(503, ""), "HTTP 503");
    }

    #[test]
    fn test_status_error_maps_to_llm_error() {
        let err = ApiClientError::Status {
            status: 500,
            message: "Missing GEMINI_API_KEY".to_string(),
        };
        let llm: LlmError = err.into();
        assert_eq!(llm.message(), "Missing GEMINI_API_KEY");
        assert_eq!(llm.upstream_status(), Some(500));
    }

    #[test]
    fn test_filter_skips_empty_fields() {
        let filter = AgentFilter::text("G1").with_page(2, 10);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, json!({ "q": "G1", "page": 2, "page_size": 10 }));
        assert_eq!(AgentFilter::text(""), AgentFilter::default());
    }
}
