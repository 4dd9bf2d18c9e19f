//! Configuration management for autodiagd.
//!
//! Loads settings from /etc/autodiag/config.toml or uses defaults.
//! Secrets are never read from the file, only from the environment.

use anyhow::Result;
use autodiag_shared::{DEFAULT_DAEMON_ADDR, MAX_MESSAGE_CHARS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/autodiag/config.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/autodiag/config.toml";

/// Environment variable overriding the config path
pub const CONFIG_ENV: &str = "AUTODIAG_CONFIG";

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ASSISTANT_ID_ENV: &str = "OPENAI_ASSISTANT_ID";

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind_addr() -> String {
    DEFAULT_DAEMON_ADDR.to_string()
}

/// Worst-case bytes per message char in JSON: a `\uXXXX\uXXXX` surrogate pair
const MAX_ESCAPED_CHAR_BYTES: usize = 12;

/// Room for the rest of the request object (`threadId`, keys, whitespace)
const BODY_ENVELOPE_BYTES: usize = 4096;

/// Fits a maximum-length message even when every char is escaped
fn default_max_body_bytes() -> usize {
    MAX_MESSAGE_CHARS * MAX_ESCAPED_CHAR_BYTES + BODY_ENVELOPE_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Remote assistant service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call timeout for every upstream HTTP request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Status checks before giving up with DIAGNOSIS_TIMEOUT
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    1_000
}

fn default_max_poll_attempts() -> u32 {
    60 // ~60s ceiling at the default interval
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            poll_interval_ms: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl AssistantConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_poll_attempts,
        }
    }
}

/// How a run is polled until it reaches a terminal status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSettings {
    /// Total wait before the poll budget runs out
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        AssistantConfig::default().poll_settings()
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl Config {
    /// Load config from file, or return defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            match Self::load_from_path(&path) {
                Ok(config) => return config,
                Err(e) => warn!("{} points to {} but it could not be loaded: {}", CONFIG_ENV, path, e),
            }
        }

        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })
    }

    /// Load config from specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Credentials for the assistant service, read from the environment
#[derive(Clone, Default)]
pub struct Secrets {
    pub api_key: Option<String>,
    pub assistant_id: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_env(API_KEY_ENV),
            assistant_id: non_empty_env(ASSISTANT_ID_ENV),
        }
    }

    /// Name of the first missing variable, if any
    pub fn missing(&self) -> Option<&'static str> {
        if self.api_key.is_none() {
            Some(API_KEY_ENV)
        } else if self.assistant_id.is_none() {
            Some(ASSISTANT_ID_ENV)
        } else {
            None
        }
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("assistant_id", &self.assistant_id)
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:7866");
        assert_eq!(config.server.max_body_bytes, 124_096);
        assert_eq!(config.assistant.base_url, "https://api.openai.com/v1");
        assert_eq!(config.assistant.request_timeout_secs, 30);
        assert_eq!(config.assistant.max_poll_attempts, 60);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
bind_addr = "0.0.0.0:9000"

[assistant]
poll_interval_ms = 250
max_poll_attempts = 10
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.assistant.poll_interval_ms, 250);
        // Defaults for missing fields
        assert_eq!(config.server.max_body_bytes, 124_096);
        assert_eq!(config.assistant.request_timeout_secs, 30);
    }

    #[test]
    fn test_poll_budget() {
        let poll = AssistantConfig::default().poll_settings();
        assert_eq!(poll.interval, Duration::from_secs(1));
        assert_eq!(poll.budget(), Duration::from_secs(60));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[assistant]\nbase_url = \"http://127.0.0.1:1/v1\"").unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.assistant.base_url, "http://127.0.0.1:1/v1");
        assert_eq!(config.server.bind_addr, DEFAULT_DAEMON_ADDR);
    }

    #[test]
    fn test_load_from_path_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbind_addr = 3").unwrap();
        assert!(Config::load_from_path(file.path()).is_err());
    }

    #[test]
    fn test_missing_secret_order() {
        let none = Secrets::default();
        assert_eq!(none.missing(), Some(API_KEY_ENV));

        let key_only = Secrets {
            api_key: Some("sk-test".to_string()),
            assistant_id: None,
        };
        assert_eq!(key_only.missing(), Some(ASSISTANT_ID_ENV));

        let both = Secrets {
            api_key: Some("sk-test".to_string()),
            assistant_id: Some("asst_1".to_string()),
        };
        assert_eq!(both.missing(), None);
        assert!(!format!("{:?}", both).contains("sk-test"));
    }
}
