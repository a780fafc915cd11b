//! Chat transcript types
//!
//! The in-memory log lives here; mirroring it to a store and calling a chat
//! backend is the caller's concern.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "ai", alias = "model")]
    Assistant,
    System,
}

impl ChatRole {
    /// Role name on the chat wire, or `None` for messages never sent upstream.
    pub fn wire_role(&self) -> Option<WireRole> {
        match self {
            ChatRole::User => Some(WireRole::User),
            ChatRole::Assistant => Some(WireRole::Model),
            ChatRole::System => None,
        }
    }
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    /// Epoch milliseconds
    pub created_at: i64,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            role,
            text: text.into(),
            created_at: created_at.timestamp_millis(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text, Utc::now())
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, text, Utc::now())
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(ChatRole::System, text, Utc::now())
    }

    /// System message reporting a failed send.
    pub fn error(description: impl std::fmt::Display) -> Self {
        Self::system(format!("Error: {}", description))
    }
}

// ============================================================================
// WIRE TYPES
// ============================================================================

/// Role as understood by the chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Model,
}

/// One turn of conversation sent to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChatTurn {
    pub role: WireRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::Model,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
}

/// Reply from `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChatReply {
    pub role: WireRole,
    pub content: String,
}

impl ChatReply {
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::Model,
            content: content.into(),
        }
    }
}

// ============================================================================
// TRANSCRIPT LOG
// ============================================================================

/// Append-only ordered log of chat messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Parse a persisted log. Anything unreadable yields an empty log.
    pub fn from_json_lossy(raw: &str) -> Self {
        serde_json::from_str::<Vec<ChatMessage>>(raw)
            .map(Self::from_messages)
            .unwrap_or_default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Text of the most recent non-system message.
    pub fn last_copyable(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role != ChatRole::System)
            .map(|m| m.text.as_str())
    }

    /// Prior history as wire turns, system messages dropped.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.messages
            .iter()
            .filter_map(|m| {
                m.role.wire_role().map(|role| ChatTurn {
                    role,
                    content: m.text.clone(),
                })
            })
            .collect()
    }

    /// Full request for a send: prior history followed by the new user turn.
    ///
    /// `prior` excludes the trailing message when the new user message has
    /// already been appended.
    pub fn request_with(&self, prior: usize, user_text: &str) -> ChatRequest {
        let mut messages: Vec<ChatTurn> = ChatLog::from_messages(
            self.messages[..prior.min(self.messages.len())].to_vec(),
        )
        .history();
        messages.push(ChatTurn::user(user_text));
        ChatRequest { messages }
    }

    /// Pretty JSON array of the log, in order.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.messages)
    }
}

/// Download name for an exported transcript.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    let iso = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    format!("chat-{}.json", iso.replace([':', '.'], "-"))
}
