//! Chat transcript manager.
//!
//! Owns the ordered message log, mirrors every change to the key-value store
//! under `csd:chat:v1`, and relays new user turns to a [`ChatProvider`].
//! Store failures never reach the caller; a failed send becomes a system
//! message in the log.

use chrono::{DateTime, Utc};
use cyberdash_core::{export_file_name, ChatLog, ChatMessage};
use cyberdash_llm::ChatProvider;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::settings::analytics_enabled;
use crate::store::{KeyValueStore, StoreError, CHAT_KEY};

pub struct Transcript {
    log: ChatLog,
    store: Arc<dyn KeyValueStore>,
    chat: Arc<dyn ChatProvider>,
    analytics: bool,
}

impl Transcript {
    /// Open over a store, restoring whatever log it holds.
    pub fn open(store: Arc<dyn KeyValueStore>, chat: Arc<dyn ChatProvider>) -> Self {
        let log = match store.get(CHAT_KEY) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_default(),
            Ok(None) => ChatLog::new(),
            Err(err) => {
                warn!(error = %err, "Failed to load chat transcript");
                ChatLog::new()
            }
        };
        let analytics = analytics_enabled(store.as_ref());
        debug!(messages = log.len(), analytics, "Transcript opened");
        Self {
            log,
            store,
            chat,
            analytics,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.log.messages()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn analytics_enabled(&self) -> bool {
        self.analytics
    }

    pub fn set_analytics(&mut self, enabled: bool) {
        self.analytics = enabled;
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.log.push(message);
        self.mirror();
    }

    pub fn clear(&mut self) {
        self.log.clear();
        self.mirror();
    }

    /// Pretty JSON array of the log.
    pub fn export_snapshot(&self) -> Result<Vec<u8>, serde_json::Error> {
        let bytes = self.log.to_pretty_json()?;
        self.track("chat_export");
        Ok(bytes)
    }

    /// Write the snapshot as `chat-<timestamp>.json` under `dir`.
    pub fn export_to(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, StoreError> {
        let bytes = self.export_snapshot()?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(export_file_name(now));
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), messages = self.log.len(), "Transcript exported");
        Ok(path)
    }

    /// Text of the latest user or assistant message.
    pub fn copy_last(&self) -> Option<String> {
        let text = self.log.last_copyable().map(str::to_string);
        if text.is_some() {
            self.track("chat_copy_last");
        }
        text
    }

    /// Send one user turn and append the outcome.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the user message
    /// is appended first, then either the assistant reply or an
    /// `Error: ...` system message, which is also returned.
    pub async fn send(&mut self, user_text: &str) -> Option<ChatMessage> {
        let text = user_text.trim();
        if text.is_empty() {
            return None;
        }

        let prior = self.log.len();
        self.append(ChatMessage::user(text));
        self.track("chat_send");

        let turns = self.log.request_with(prior, text).messages;
        let outcome = match self.chat.complete(&turns).await {
            Ok(reply) => ChatMessage::assistant(reply),
            Err(err) => {
                warn!(error = %err, model = self.chat.model_id(), "Chat send failed");
                ChatMessage::error(err.message())
            }
        };
        self.append(outcome.clone());
        Some(outcome)
    }

    fn mirror(&self) {
        let result = serde_json::to_value(&self.log)
            .map_err(StoreError::from)
            .and_then(|value| self.store.set(CHAT_KEY, value));
        if let Err(err) = result {
            warn!(error = %err, "Failed to persist chat transcript");
        }
    }

    fn track(&self, event: &'static str) {
        if self.analytics {
            info!(target: "cyberdash::analytics", event, messages = self.log.len(), "Analytics event");
        }
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript")
            .field("messages", &self.log.len())
            .field("chat", &self.chat.model_id())
            .field("analytics", &self.analytics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use cyberdash_core::{ChatRole, ChatTurn};
    use cyberdash_llm::{LlmError, MockChatProvider};
    use cyberdash_test_utils::fixtures;
    use serde_json::json;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("quota")))
        }

        fn set(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("quota")))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("quota")))
        }
    }

    fn transcript_with(chat: MockChatProvider) -> (Transcript, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let transcript = Transcript::open(store.clone(), Arc::new(chat));
        (transcript, store)
    }

    #[test]
    fn test_append_then_export() {
        let (mut transcript, _) = transcript_with(MockChatProvider::echo());
        transcript.append(ChatMessage::user("hello"));
        transcript.append(ChatMessage::assistant("hi"));

        let bytes = transcript.export_snapshot().unwrap();
        let exported: Vec<ChatMessage> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(exported, transcript.messages());
    }

    #[test]
    fn test_clear_exports_empty_array() {
        let (mut transcript, store) = transcript_with(MockChatProvider::echo());
        transcript.append(ChatMessage::user("hello"));
        transcript.clear();

        let bytes = transcript.export_snapshot().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!([]));
        assert_eq!(store.get(CHAT_KEY).unwrap(), Some(json!([])));
    }

    #[test]
    fn test_copy_last_skips_system() {
        let (mut transcript, _) = transcript_with(MockChatProvider::echo());
        assert_eq!(transcript.copy_last(), None);

        transcript.append(ChatMessage::system("welcome"));
        assert_eq!(transcript.copy_last(), None);

        transcript.append(ChatMessage::user("status?"));
        transcript.append(ChatMessage::error("timeout"));
        assert_eq!(transcript.copy_last().as_deref(), Some("status?"));
    }

    #[test]
    fn test_reopen_restores_log() {
        let store = Arc::new(MemoryStore::new());
        let chat = Arc::new(MockChatProvider::echo());
        let mut first = Transcript::open(store.clone(), chat.clone());
        first.append(ChatMessage::user("persist me"));

        let reopened = Transcript::open(store, chat);
        assert_eq!(reopened.messages(), first.messages());
    }

    #[test]
    fn test_malformed_store_data_opens_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(CHAT_KEY, json!([{ "id": 1 }])).unwrap();
        let transcript = Transcript::open(store.clone(), Arc::new(MockChatProvider::echo()));
        assert!(transcript.is_empty());

        store.set(CHAT_KEY, json!("not a list")).unwrap();
        let transcript = Transcript::open(store, Arc::new(MockChatProvider::echo()));
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_store_failures_are_swallowed() {
        let mut transcript =
            Transcript::open(Arc::new(FailingStore), Arc::new(MockChatProvider::echo()));
        transcript.append(ChatMessage::user("still here"));
        transcript.clear();
        assert!(transcript.is_empty());
    }

    #[tokio::test]
    async fn test_send_appends_user_then_reply() {
        let mock = MockChatProvider::fixed("All clear.");
        let (mut transcript, _) = transcript_with(mock.clone());

        let reply = transcript.send("  status?  ").await.unwrap();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.text, "All clear.");

        let roles: Vec<_> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
        assert_eq!(transcript.messages()[0].text, "status?");
        assert_eq!(mock.calls(), vec![vec![ChatTurn::user("status?")]]);
    }

    #[tokio::test]
    async fn test_send_forwards_history_without_system_messages() {
        let mock = MockChatProvider::fixed("ok");
        let (mut transcript, _) = transcript_with(mock.clone());
        transcript.append(ChatMessage::system("welcome"));
        transcript.append(ChatMessage::user("first"));
        transcript.append(ChatMessage::assistant("reply"));

        transcript.send("second").await;

        assert_eq!(
            mock.calls()[0],
            vec![
                ChatTurn::user("first"),
                ChatTurn::model("reply"),
                ChatTurn::user("second"),
            ]
        );
    }

    #[tokio::test]
    async fn test_send_failure_becomes_system_message() {
        let mock = MockChatProvider::failing(LlmError::RequestFailed {
            provider: "cyberdash-api".to_string(),
            status: 500,
            message: "Missing GEMINI_API_KEY".to_string(),
        });
        let (mut transcript, _) = transcript_with(mock);

        let outcome = transcript.send("hello").await.unwrap();
        assert_eq!(outcome.role, ChatRole::System);
        assert_eq!(outcome.text, "Error: Missing GEMINI_API_KEY");
        assert_eq!(transcript.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_send_is_ignored() {
        let mock = MockChatProvider::echo();
        let (mut transcript, _) = transcript_with(mock.clone());
        assert!(transcript.send("   ").await.is_none());
        assert!(transcript.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_export_to_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut transcript, _) = transcript_with(MockChatProvider::echo());
        transcript.append(ChatMessage::user("export me"));

        let now = DateTime::parse_from_rfc3339("2025-01-01T12:30:45.123Z")
            .unwrap()
            .with_timezone(&Utc);
        let path = transcript.export_to(dir.path(), now).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "chat-2025-01-01T12-30-45-123Z.json"
        );
        let written: Vec<ChatMessage> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
    }

    #[tokio::test]
    async fn test_send_after_restored_conversation() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(CHAT_KEY, serde_json::to_value(fixtures::conversation()).unwrap())
            .unwrap();
        let mock = MockChatProvider::fixed("Two of them are high risk.");
        let mut transcript = Transcript::open(store, Arc::new(mock.clone()));
        assert_eq!(transcript.len(), 2);

        transcript.send("Any high risk?").await;
        assert_eq!(
            mock.calls()[0],
            vec![
                ChatTurn::user("Who is on Red Team?"),
                ChatTurn::model("Six agents."),
                ChatTurn::user("Any high risk?"),
            ]
        );
    }

    #[test]
    fn test_copy_last_after_system_notice() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                CHAT_KEY,
                serde_json::to_value(fixtures::system_then_user("ping")).unwrap(),
            )
            .unwrap();
        let mut transcript = Transcript::open(store, Arc::new(MockChatProvider::echo()));
        assert_eq!(transcript.copy_last().as_deref(), Some("ping"));

        transcript.append(ChatMessage::system("Error: offline"));
        assert_eq!(transcript.copy_last().as_deref(), Some("ping"));
    }
}
