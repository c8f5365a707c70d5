//! Runtime configuration.
//!
//! Values come from a TOML file, then the `ULTIMATE_AUTHORITY_URL`
//! environment variable, then command-line flags, each overriding the last.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable overriding the authority URL.
pub const AUTHORITY_URL_ENV: &str = "ULTIMATE_AUTHORITY_URL";

/// Configuration for the `serve` and `play` commands.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct UltimateConfig {
    /// Base URL of the move authority used by `play`.
    #[serde(default = "default_authority_url")]
    authority_url: String,

    /// Per-request timeout against the authority, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Address `serve` binds to.
    #[serde(default = "default_host")]
    host: String,

    /// Port `serve` binds to.
    #[serde(default = "default_port")]
    port: u16,

    /// Log file written by `play`.
    #[serde(default = "default_log_file")]
    log_file: String,
}

#[instrument]
fn default_authority_url() -> String {
    "http://localhost:8000".to_string()
}

#[instrument]
fn default_request_timeout_secs() -> u64 {
    10
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    8000
}

#[instrument]
fn default_log_file() -> String {
    "strictly_ultimate.log".to_string()
}

impl Default for UltimateConfig {
    fn default() -> Self {
        Self {
            authority_url: default_authority_url(),
            request_timeout_secs: default_request_timeout_secs(),
            host: default_host(),
            port: default_port(),
            log_file: default_log_file(),
        }
    }
}

impl UltimateConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if config.request_timeout_secs == 0 {
            return Err(ConfigError::new(
                "request_timeout_secs must be positive".to_string(),
            ));
        }

        info!(authority_url = %config.authority_url, "Config loaded");
        Ok(config)
    }

    /// Loads the file if given and present, otherwise defaults, then applies
    /// the environment override.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                info!("Config file not found at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        Ok(config.with_env_override(std::env::var(AUTHORITY_URL_ENV).ok()))
    }

    /// Replaces the authority URL with a non-empty environment value.
    pub fn with_env_override(self, value: Option<String>) -> Self {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(url) => {
                debug!(env = AUTHORITY_URL_ENV, url = %url, "Authority URL from environment");
                self.with_authority_url(url)
            }
            None => self,
        }
    }

    /// Replaces the authority URL.
    pub fn with_authority_url(mut self, url: impl Into<String>) -> Self {
        self.authority_url = url.into();
        self
    }

    /// Replaces the bind address.
    pub fn with_bind(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
