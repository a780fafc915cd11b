//! API Configuration Module
//!
//! Server settings loaded from environment variables with defaults suited to
//! local development: bind address, CORS, roster seeding, the drift emitter,
//! and the chat backend.

use std::net::SocketAddr;
use std::time::Duration;

use cyberdash_core::{AlertRange, GeneratorConfig, Timestamp};

use crate::error::{ApiError, ApiResult};

/// Env var holding the chat backend key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Listener
    // ========================================================================
    pub bind_host: String,
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Roster
    // ========================================================================
    /// Agents generated at startup and on reset-to-default.
    pub seed_count: usize,
    pub seed: i64,
    pub alert_range: AlertRange,
    /// Reference instant for generated timestamps; `None` keeps the
    /// generator's fixed anchor so rosters are reproducible.
    pub anchor: Option<Timestamp>,

    // ========================================================================
    // Live alerts
    // ========================================================================
    pub drift_interval: Duration,
    /// Risk points moved per alert delta.
    pub risk_scale: u8,
    /// Broadcast buffer per subscriber before lagging.
    pub events_capacity: usize,

    // ========================================================================
    // Chat
    // ========================================================================
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub chat_system_prompt: Option<String>,
    pub chat_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
            seed_count: 24,
            seed: GeneratorConfig::DEFAULT_SEED,
            alert_range: AlertRange::default(),
            anchor: None,
            drift_interval: Duration::from_millis(2500),
            risk_scale: 5,
            events_capacity: 256,
            gemini_api_key: None,
            gemini_model: cyberdash_llm::providers::gemini::provider::DEFAULT_MODEL.to_string(),
            chat_system_prompt: None,
            chat_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` / `CYBERDASH_API_PORT`: Listen port (default: 3000)
    /// - `CYBERDASH_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `CYBERDASH_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `CYBERDASH_SEED_COUNT`: Agents generated at startup (default: 24)
    /// - `CYBERDASH_SEED`: Generator seed (default: 1337)
    /// - `CYBERDASH_ALERTS_MIN` / `CYBERDASH_ALERTS_MAX`: Alerts per agent (default: 0 / 5)
    /// - `CYBERDASH_DRIFT_INTERVAL_MS`: Live alert tick (default: 2500)
    /// - `CYBERDASH_RISK_SCALE`: Risk points per delta (default: 5)
    /// - `CYBERDASH_EVENTS_CAPACITY`: Broadcast buffer (default: 256)
    /// - `GEMINI_API_KEY`: Chat backend key (unset = chat disabled)
    /// - `CYBERDASH_GEMINI_MODEL`: Chat model (default: gemini-2.5-flash)
    /// - `CYBERDASH_CHAT_SYSTEM_PROMPT`: Optional system instruction
    /// - `CYBERDASH_CHAT_TIMEOUT_SECS`: Chat request timeout (default: 30)
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT").or_else(|| get("CYBERDASH_API_PORT")) {
            Some(raw) => parse_value("PORT", &raw)?,
            None => defaults.port,
        };

        let cors_origins = get("CYBERDASH_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let alert_range = AlertRange {
            min: parse_or(&get, "CYBERDASH_ALERTS_MIN", defaults.alert_range.min)?,
            max: parse_or(&get, "CYBERDASH_ALERTS_MAX", defaults.alert_range.max)?,
        };
        alert_range.validate()?;

        let drift_ms: u64 = parse_or(
            &get,
            "CYBERDASH_DRIFT_INTERVAL_MS",
            defaults.drift_interval.as_millis() as u64,
        )?;
        if drift_ms == 0 {
            return Err(ApiError::invalid_input(
                "CYBERDASH_DRIFT_INTERVAL_MS must be greater than 0",
            ));
        }

        let events_capacity: usize =
            parse_or(&get, "CYBERDASH_EVENTS_CAPACITY", defaults.events_capacity)?;
        if events_capacity == 0 {
            return Err(ApiError::invalid_input(
                "CYBERDASH_EVENTS_CAPACITY must be greater than 0",
            ));
        }

        let chat_timeout_secs: u64 = parse_or(
            &get,
            "CYBERDASH_CHAT_TIMEOUT_SECS",
            defaults.chat_timeout.as_secs(),
        )?;

        Ok(Self {
            bind_host: get("CYBERDASH_API_BIND").unwrap_or(defaults.bind_host),
            port,
            cors_origins,
            cors_max_age_secs: parse_or(
                &get,
                "CYBERDASH_CORS_MAX_AGE_SECS",
                defaults.cors_max_age_secs,
            )?,
            seed_count: parse_or(&get, "CYBERDASH_SEED_COUNT", defaults.seed_count)?,
            seed: parse_or(&get, "CYBERDASH_SEED", defaults.seed)?,
            alert_range,
            anchor: None,
            drift_interval: Duration::from_millis(drift_ms),
            risk_scale: parse_or(&get, "CYBERDASH_RISK_SCALE", defaults.risk_scale)?,
            events_capacity,
            gemini_api_key: get(GEMINI_API_KEY_VAR),
            gemini_model: get("CYBERDASH_GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            chat_system_prompt: get("CYBERDASH_CHAT_SYSTEM_PROMPT"),
            chat_timeout: Duration::from_secs(chat_timeout_secs.max(1)),
        })
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
        })
    }

    /// Check if running with strict CORS.
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Generator settings for the startup roster.
    pub fn generator_config(&self) -> GeneratorConfig {
        let config = GeneratorConfig::new(self.seed_count, self.seed, self.alert_range);
        match self.anchor {
            Some(anchor) => config.with_anchor(anchor),
            None => config,
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_host", &self.bind_host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("seed_count", &self.seed_count)
            .field("seed", &self.seed)
            .field("alert_range", &self.alert_range)
            .field("anchor", &self.anchor)
            .field("drift_interval", &self.drift_interval)
            .field("risk_scale", &self.risk_scale)
            .field("events_capacity", &self.events_capacity)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("chat_timeout", &self.chat_timeout)
            .finish()
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> ApiResult<T> {
    raw.parse::<T>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid value for {}: {}", key, raw)))
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> ApiResult<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.port, 3000);
        assert_eq!(config.seed_count, 24);
        assert_eq!(config.seed, 1337);
        assert_eq!(config.alert_range, AlertRange { min: 0, max: 5 });
        assert_eq!(config.drift_interval, Duration::from_millis(2500));
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_empty_lookup_matches_default() {
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_port_precedence() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("CYBERDASH_API_PORT", "9090"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);

        let config = ApiConfig::from_lookup(lookup(&[("CYBERDASH_API_PORT", "9090")])).unwrap();
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[("PORT", "not-a-port")])).unwrap_err();
        assert!(err.message.contains("PORT"));
    }

    #[test]
    fn test_inverted_alert_range_rejected() {
        let result = ApiConfig::from_lookup(lookup(&[
            ("CYBERDASH_ALERTS_MIN", "4"),
            ("CYBERDASH_ALERTS_MAX", "1"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(ApiConfig::from_lookup(lookup(&[("CYBERDASH_DRIFT_INTERVAL_MS", "0")])).is_err());
    }

    #[test]
    fn test_cors_and_chat_settings() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("CYBERDASH_CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("GEMINI_API_KEY", "k-123"),
            ("CYBERDASH_GEMINI_MODEL", "gemini-2.0-pro"),
            ("CYBERDASH_CHAT_SYSTEM_PROMPT", "  "),
        ]))
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(config.is_production());
        assert_eq!(config.gemini_api_key.as_deref(), Some("k-123"));
        assert_eq!(config.gemini_model, "gemini-2.0-pro");
        assert!(config.chat_system_prompt.is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ApiConfig {
            gemini_api_key: Some("super-secret".to_string()),
            ..ApiConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }
}
