//! Top-level application configuration.
//!
//! Configuration is stored in `.ticketdesk/config.yaml` and includes:
//! - Backend base URL and bearer token
//! - The current agent's id (for the "assigned to me" view)
//! - Polling, timeout and pagination settings
//!
//! `TICKETDESK_API_URL` and `TICKETDESK_TOKEN` override the file.

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};
use crate::types::desk_root;

pub const DEFAULT_POLL_INTERVAL: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;
pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 2_000;
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Keys accepted by `config get` / `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "api_url",
    "auth.token",
    "agent_id",
    "poll_interval",
    "request_timeout",
    "dedup_window_ms",
    "page_size",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL, e.g. `https://support.example.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Authentication
    #[serde(default)]
    pub auth: AuthConfig,

    /// Id of the agent using this client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<u64>,

    /// Seconds between ticket list refreshes (default: 30)
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Seconds before a backend request is abandoned (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Refreshes requested within this many milliseconds of the previous
    /// one collapse into it (default: 2000)
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,

    /// Rows per page in list output (default: 25)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_dedup_window_ms() -> u64 {
    DEFAULT_DEDUP_WINDOW_MS
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            auth: AuthConfig::default(),
            agent_id: None,
            poll_interval: default_poll_interval(),
            request_timeout: default_request_timeout(),
            dedup_window_ms: default_dedup_window_ms(),
            page_size: default_page_size(),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        DeskError::Config(format!("invalid value '{value}' for {key}. Expected a number"))
    })
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        desk_root().join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            DeskError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DeskError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            DeskError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Owner read/write only; the file may hold a token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval == 0 {
            return Err(DeskError::Config("poll_interval must be at least 1".into()));
        }
        if self.request_timeout == 0 {
            return Err(DeskError::Config("request_timeout must be at least 1".into()));
        }
        if self.page_size == 0 {
            return Err(DeskError::Config("page_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Backend URL from environment or config file
    pub fn api_url(&self) -> Option<String> {
        if let Ok(url) = env::var("TICKETDESK_API_URL")
            && !url.is_empty()
        {
            return Some(url);
        }

        self.api_url.clone()
    }

    /// Bearer token from environment or config file
    pub fn auth_token(&self) -> Option<SecretString> {
        if let Ok(token) = env::var("TICKETDESK_TOKEN")
            && !token.is_empty()
        {
            return Some(SecretString::from(token));
        }

        self.auth.token.clone().map(SecretString::from)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }

    /// Read a value by key. The token is never returned in clear.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        Ok(match key {
            "api_url" => self.api_url.clone(),
            "auth.token" => self.auth.token.as_ref().map(|_| "[configured]".to_string()),
            "agent_id" => self.agent_id.map(|v| v.to_string()),
            "poll_interval" => Some(self.poll_interval.to_string()),
            "request_timeout" => Some(self.request_timeout.to_string()),
            "dedup_window_ms" => Some(self.dedup_window_ms.to_string()),
            "page_size" => Some(self.page_size.to_string()),
            _ => return Err(unknown_key(key)),
        })
    }

    /// Set a value by key, validating it.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => {
                url::Url::parse(value.trim()).map_err(|e| {
                    DeskError::Config(format!("invalid value '{value}' for api_url: {e}"))
                })?;
                self.api_url = Some(value.trim().to_string());
            }
            "auth.token" => self.auth.token = Some(value.to_string()),
            "agent_id" => self.agent_id = Some(parse_number(key, value)?),
            "poll_interval" => self.poll_interval = parse_number(key, value)?,
            "request_timeout" => self.request_timeout = parse_number(key, value)?,
            "dedup_window_ms" => self.dedup_window_ms = parse_number(key, value)?,
            "page_size" => self.page_size = parse_number(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        self.validate()
    }
}

fn unknown_key(key: &str) -> DeskError {
    DeskError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}
