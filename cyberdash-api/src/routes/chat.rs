//! Chat completion route
//!
//! Relays a conversation to the configured chat provider and returns the
//! model's reply. Single attempt, no streaming.

use axum::{extract::State, routing::post, Json, Router};
use cyberdash_core::{ChatReply, ChatRequest};
use cyberdash_llm::ProviderRegistry;
use std::sync::Arc;

use crate::{
    config::GEMINI_API_KEY_VAR,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// POST /api/chat - Complete a conversation
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/chat",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Model reply", body = ChatReply),
        (status = 400, description = "Empty conversation", body = ApiError),
        (status = 500, description = "Chat provider not configured", body = ApiError),
        (status = 502, description = "Upstream provider failed", body = ApiError),
        (status = 504, description = "Upstream provider timed out", body = ApiError),
    ),
))]
pub async fn complete_chat(
    State(providers): State<Arc<ProviderRegistry>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatReply>> {
    let provider = providers
        .chat()
        .map_err(|_| ApiError::not_configured(format!("Missing {}", GEMINI_API_KEY_VAR)))?;

    if req.messages.is_empty() {
        return Err(ApiError::invalid_input("messages must not be empty"));
    }

    tracing::debug!(
        turns = req.messages.len(),
        model = provider.model_id(),
        "Relaying chat request"
    );
    let content = provider.complete(&req.messages).await?;
    Ok(Json(ChatReply::model(content)))
}

/// Create the chat router.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/", post(complete_chat))
}
