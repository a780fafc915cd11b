//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cyberdash_core::DriftConfig;
use cyberdash_llm::{GeminiChatProvider, ProviderRegistry};

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::events::AlertHub;
use crate::store::AgentStore;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// The in-memory agent roster.
    pub store: Arc<AgentStore>,
    /// Live alert fan-out.
    pub hub: AlertHub,
    /// Chat backend, if one is configured.
    pub providers: Arc<ProviderRegistry>,
    pub start_time: Instant,
}

crate::impl_from_ref!(Arc<AgentStore>, store);
crate::impl_from_ref!(AlertHub, hub);
crate::impl_from_ref!(Arc<ProviderRegistry>, providers);
crate::impl_from_ref!(Instant, start_time);

impl AppState {
    pub fn new(store: Arc<AgentStore>, hub: AlertHub, providers: ProviderRegistry) -> Self {
        Self {
            store,
            hub,
            providers: Arc::new(providers),
            start_time: Instant::now(),
        }
    }

    /// Build the roster, alert hub and chat provider from configuration.
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        let store = AgentStore::seeded(
            config.generator_config(),
            DriftConfig {
                risk_scale: config.risk_scale,
            },
        )?;
        let hub = AlertHub::new(config.events_capacity);

        let mut providers = ProviderRegistry::new();
        match &config.gemini_api_key {
            Some(key) => {
                let provider = GeminiChatProvider::new(
                    key.clone(),
                    config.gemini_model.clone(),
                    config.chat_timeout,
                )?
                .with_system_prompt(config.chat_system_prompt.clone());
                providers.register_chat(Arc::new(provider));
                tracing::info!(model = %config.gemini_model, "Chat provider registered");
            }
            None => tracing::warn!("GEMINI_API_KEY not set; chat endpoint disabled"),
        }

        Ok(Self::new(Arc::new(store), hub, providers))
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
