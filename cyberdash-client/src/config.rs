//! Configuration loading for the CyberDash client.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the CyberDash API, e.g. `http://localhost:3000`
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    /// JSON file backing the local key-value store
    pub store_path: PathBuf,
    /// Where `/export` writes transcripts when no directory is given
    pub export_dir: PathBuf,
    pub page_size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or CYBERDASH_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let path = config_path_from_args(&args).or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.export_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "export_dir",
                reason: "must not be empty".to_string(),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("CYBERDASH_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args(args: &[String]) -> Option<PathBuf> {
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
api_base_url = "http://localhost:3000/"
request_timeout_ms = 5000
store_path = "tmp/cyberdash-store.json"
export_dir = "tmp/exports"
page_size = 24
"#;

    #[test]
    fn test_parses_valid_config() {
        let config = ClientConfig::from_toml(VALID).unwrap();
        assert_eq!(config.base_url(), "http://localhost:3000");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.page_size, 24);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let raw = format!("{}\ntheme = \"dark\"\n", VALID);
        assert!(matches!(
            ClientConfig::from_toml(&raw),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let raw = "api_base_url = \"http://localhost:3000\"\n";
        assert!(matches!(ClientConfig::from_toml(raw), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_errors_name_the_field() {
        let base = ClientConfig::from_toml(VALID).unwrap();

        let mut config = base.clone();
        config.request_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "request_timeout_ms", .. })
        ));

        let mut config = base.clone();
        config.api_base_url = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "api_base_url", .. })
        ));

        let mut config = base.clone();
        config.api_base_url = "localhost:3000".to_string();
        assert!(config.validate().is_err());

        let mut config = base;
        config.store_path = PathBuf::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "store_path", .. })
        ));
    }

    #[test]
    fn test_config_path_from_args() {
        let args = vec!["--config".to_string(), "client.toml".to_string()];
        assert_eq!(config_path_from_args(&args), Some(PathBuf::from("client.toml")));
        assert_eq!(config_path_from_args(&["--config".to_string()]), None);
        assert_eq!(config_path_from_args(&[]), None);
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, VALID).unwrap();
        assert!(ClientConfig::from_path(&path).is_ok());
        assert!(matches!(
            ClientConfig::from_path(&dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
