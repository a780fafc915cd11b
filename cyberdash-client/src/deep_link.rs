//! Shell bridge: deep links, app metadata and diagnostics.
//!
//! Deep links (`cyberdash://...`) can arrive before the command loop is ready
//! to run them. They wait in a [`DeepLinkQueue`] and are handed over exactly
//! once when the consumer signals readiness.

use reqwest::Url;
use std::collections::VecDeque;
use std::fmt::Write as _;

use crate::commands::Command;
use crate::config::ClientConfig;

pub const SCHEME: &str = "cyberdash";

// ============================================================================
// DEEP LINK QUEUE
// ============================================================================

#[derive(Debug, Default)]
pub struct DeepLinkQueue {
    pending: VecDeque<String>,
    ready: bool,
}

impl DeepLinkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a link, or hand it straight back once the consumer is ready.
    pub fn push(&mut self, url: impl Into<String>) -> Option<String> {
        let url = url.into();
        if self.ready {
            return Some(url);
        }
        tracing::debug!(url = %url, "Deep link queued");
        self.pending.push_back(url);
        None
    }

    /// Mark the consumer ready and drain everything queued so far.
    /// Later calls return nothing.
    pub fn mark_ready(&mut self) -> Vec<String> {
        self.ready = true;
        self.pending.drain(..).collect()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Translate a deep link into a command.
///
/// Links map straight to a [`Command`] and never pass through the line
/// parser, so a chat link can only ever send chat.
///
/// - `cyberdash://agents?q=G1` → `Agents(Some("G1"))`
/// - `cyberdash://chat?text=hi` → `Chat("hi")`
pub fn to_command(link: &str) -> Option<Command> {
    let url = Url::parse(link).ok()?;
    if url.scheme() != SCHEME {
        return None;
    }
    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    match url.host_str()? {
        "agents" => Some(Command::Agents(param("q"))),
        "chat" => param("text").map(Command::Chat),
        _ => None,
    }
}

// ============================================================================
// APP METADATA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMetadata {
    pub name: &'static str,
    pub version: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
}

impl AppMetadata {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

/// Plain-text report for bug reports.
pub fn diagnostics(meta: &AppMetadata, config: &ClientConfig, transcript_len: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", meta.name, meta.version);
    let _ = writeln!(out, "platform: {}/{}", meta.os, meta.arch);
    let _ = writeln!(out, "api: {}", config.base_url());
    let _ = writeln!(out, "timeout_ms: {}", config.request_timeout_ms);
    let _ = writeln!(out, "store: {}", config.store_path.display());
    let _ = writeln!(out, "messages: {}", transcript_len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_wait_until_ready() {
        let mut queue = DeepLinkQueue::new();
        assert_eq!(queue.push("cyberdash://agents?q=G1"), None);
        assert_eq!(queue.push("cyberdash://chat?text=hi"), None);
        assert_eq!(queue.pending(), 2);

        let drained = queue.mark_ready();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], "cyberdash://agents?q=G1");
        assert!(queue.mark_ready().is_empty());

        assert_eq!(
            queue.push("cyberdash://agents").as_deref(),
            Some("cyberdash://agents")
        );
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_to_command() {
        assert_eq!(
            to_command("cyberdash://agents?q=G1"),
            Some(Command::Agents(Some("G1".to_string())))
        );
        assert_eq!(
            to_command("cyberdash://agents?q=Red%20Team"),
            Some(Command::Agents(Some("Red Team".to_string())))
        );
        assert_eq!(to_command("cyberdash://agents"), Some(Command::Agents(None)));
        assert_eq!(
            to_command("cyberdash://chat?text=hello"),
            Some(Command::Chat("hello".to_string()))
        );
        assert_eq!(to_command("cyberdash://chat"), None);
        assert_eq!(to_command("cyberdash://chat?text=%20%20"), None);
        assert_eq!(to_command("https://agents?q=G1"), None);
        assert_eq!(to_command("not a url"), None);
        assert_eq!(to_command("cyberdash://unknown"), None);
    }

    #[test]
    fn test_chat_link_never_runs_commands() {
        for text in ["/reset", "/export%20/tmp/out", "/quit", "%2Fscale%200"] {
            let link = format!("cyberdash://chat?text={}", text);
            match to_command(&link) {
                Some(Command::Chat(body)) => assert!(body.starts_with('/')),
                other => panic!("{} became {:?}", link, other),
            }
        }
    }

    #[test]
    fn test_agents_link_query_is_not_parsed() {
        assert_eq!(
            to_command("cyberdash://agents?q=/reset"),
            Some(Command::Agents(Some("/reset".to_string())))
        );
    }

    #[test]
    fn test_diagnostics_mentions_version_and_api() {
        let config = ClientConfig::from_toml(
            r#"
api_base_url = "http://localhost:3000"
request_timeout_ms = 1000
store_path = "store.json"
export_dir = "exports"
page_size = 10
"#,
        )
        .unwrap();
        let text = diagnostics(&AppMetadata::current(), &config, 3);
        assert!(text.starts_with("cyberdash-client "));
        assert!(text.contains("api: http://localhost:3000"));
        assert!(text.contains("messages: 3"));
    }
}
