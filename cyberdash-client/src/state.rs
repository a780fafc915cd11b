//! Application state and command execution.

use chrono::Utc;
use cyberdash_api::AgentListing;
use cyberdash_core::{Agent, RiskBand};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::warn;

use crate::api_client::{AgentFilter, RestClient};
use crate::commands::{Command, HELP};
use crate::config::ClientConfig;
use crate::deep_link::{diagnostics, AppMetadata};
use crate::settings::{self, Settings, LAST_QUERY, PAGE_SIZE};
use crate::store::KeyValueStore;
use crate::transcript::Transcript;

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Print(String),
    Quit,
}

pub struct App {
    pub config: ClientConfig,
    pub transcript: Transcript,
    pub settings: Settings,
    api: RestClient,
    store: Arc<dyn KeyValueStore>,
    filter: AgentFilter,
    page_size: usize,
}

impl App {
    pub fn new(config: ClientConfig, api: RestClient, store: Arc<dyn KeyValueStore>) -> Self {
        let transcript = Transcript::open(store.clone(), Arc::new(api.clone()));
        let settings = Settings::load(store.as_ref());
        let page_size = settings
            .get::<usize>(PAGE_SIZE)
            .filter(|n| *n > 0)
            .unwrap_or(config.page_size);
        let filter = AgentFilter::text(settings.get::<String>(LAST_QUERY).unwrap_or_default());
        Self {
            config,
            transcript,
            settings,
            api,
            store,
            filter,
            page_size,
        }
    }

    pub fn api(&self) -> &RestClient {
        &self.api
    }

    /// Run one command. Failures are reported as output, never returned.
    pub async fn execute(&mut self, command: Command) -> Outcome {
        let output = match command {
            Command::Agents(query) => {
                self.filter = AgentFilter::text(query.unwrap_or_default());
                self.remember_query();
                self.show_page(1).await
            }
            Command::Page(page) => self.show_page(page).await,
            Command::Add(n) => match self.api.add_agents(n).await {
                Ok(change) => format!(
                    "Added {} agents ({} total)",
                    change.added.unwrap_or(0),
                    change.total
                ),
                Err(err) => format!("Error: {}", err),
            },
            Command::Scale(n) => match self.api.scale_agents(n).await {
                Ok(change) => format!("Roster scaled to {} agents", change.total),
                Err(err) => format!("Error: {}", err),
            },
            Command::Reset => match self.api.reset_agents().await {
                Ok(_) => "Roster emptied".to_string(),
                Err(err) => format!("Error: {}", err),
            },
            Command::Copy => self
                .transcript
                .copy_last()
                .unwrap_or_else(|| "Nothing to copy".to_string()),
            Command::Export(dir) => {
                let dir = dir.unwrap_or_else(|| self.config.export_dir.clone());
                match self.transcript.export_to(&dir, Utc::now()) {
                    Ok(path) => format!("Exported to {}", path.display()),
                    Err(err) => format!("Error: {}", err),
                }
            }
            Command::Clear => {
                self.transcript.clear();
                "Transcript cleared".to_string()
            }
            Command::Analytics(enabled) => {
                self.transcript.set_analytics(enabled);
                if let Err(err) = settings::set_analytics_enabled(self.store.as_ref(), enabled) {
                    warn!(error = %err, "Failed to persist analytics flag");
                }
                format!("Analytics {}", if enabled { "on" } else { "off" })
            }
            Command::Diagnostics => {
                diagnostics(&AppMetadata::current(), &self.config, self.transcript.len())
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Outcome::Quit,
            Command::Chat(text) => match self.transcript.send(&text).await {
                Some(message) => message.text,
                None => String::new(),
            },
        };
        Outcome::Print(output)
    }

    async fn show_page(&mut self, page: usize) -> String {
        let filter = self.filter.clone().with_page(page, self.page_size);
        match self.api.list_agents(&filter).await {
            Ok(listing) => format_listing(&listing),
            Err(err) => format!("Error: {}", err),
        }
    }

    fn remember_query(&mut self) {
        let query = self.filter.q.clone().unwrap_or_default();
        let result = self
            .settings
            .set(LAST_QUERY, &query)
            .and_then(|()| self.settings.set(PAGE_SIZE, &self.page_size))
            .and_then(|()| self.settings.save(self.store.as_ref()));
        if let Err(err) = result {
            warn!(error = %err, "Failed to persist settings");
        }
    }
}

pub fn format_agent(agent: &Agent) -> String {
    format!(
        "{:>4}  {}  {:<12} {:<9} {}  {}  risk {:>3} ({})  alerts {}",
        agent.id,
        agent.name,
        agent.team.as_str(),
        agent.role.as_str(),
        agent.group.as_str(),
        agent.location,
        agent.risk,
        RiskBand::from_risk(agent.risk).as_str(),
        agent.alerts24h.len()
    )
}

pub fn format_listing(listing: &AgentListing) -> String {
    let mut out = String::new();
    for agent in &listing.items {
        let _ = writeln!(out, "{}", format_agent(agent));
    }
    let _ = write!(
        out,
        "page {}/{}  {} matching of {}",
        listing.page, listing.total_pages, listing.filtered, listing.total
    );
    out
}
