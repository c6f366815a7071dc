//! Configuration file management.
//!
//! Handles reading and validating `~/.roster/config.toml`. Every field is
//! optional; environment variables override the file.

use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{constants, paths};
use crate::error::{ConfigError, Result};

/// User configuration stored in `~/.roster/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API settings
    pub api: ApiConfig,
    /// Browser handshake settings
    pub handshake: HandshakeConfig,
}

/// Remote API section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base url of the API, e.g. `https://api.example.com`
    pub url: Option<String>,
    /// Read-only path used to confirm a token is live
    pub probe_path: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            probe_path: constants::DEFAULT_PROBE_PATH.to_string(),
            timeout_secs: constants::DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

/// Handshake section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeConfig {
    /// Seconds to wait for a submission before giving up
    pub timeout_secs: u64,
    /// Consecutive rejected submissions before the session fails
    pub max_failures: u32,
    /// Requests per client and endpoint within one window
    pub rate_limit_requests: u32,
    /// Rate limit window length in seconds
    pub rate_limit_window_secs: u64,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: constants::DEFAULT_HANDSHAKE_TIMEOUT_SECS,
            max_failures: constants::DEFAULT_MAX_FAILURES,
            rate_limit_requests: constants::DEFAULT_RATE_LIMIT_REQUESTS,
            rate_limit_window_secs: constants::DEFAULT_RATE_LIMIT_WINDOW_SECS,
        }
    }
}

impl HandshakeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

impl Config {
    /// Load configuration from the default location, then apply env overrides.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed, or
    /// `ConfigError::Invalid` if a value fails validation.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&paths::config_path()?)?;

        if let Ok(url) = std::env::var(constants::API_URL_ENV) {
            if !url.is_empty() {
                debug!(url = %url, "api url from environment");
                config.api.url = Some(url);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file without env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` on the first bad value.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &'static str, reason: &str| -> Result<()> {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            }
            .into())
        };

        if let Some(url) = &self.api.url {
            parse_base_url(url)?;
        }
        if !self.api.probe_path.starts_with('/') {
            return invalid("api.probe_path", "must start with '/'");
        }
        if self.api.timeout_secs == 0 {
            return invalid("api.timeout_secs", "must be greater than zero");
        }
        if self.handshake.timeout_secs == 0 {
            return invalid("handshake.timeout_secs", "must be greater than zero");
        }
        if self.handshake.max_failures == 0 {
            return invalid("handshake.max_failures", "must be at least 1");
        }
        if self.handshake.rate_limit_requests == 0 {
            return invalid("handshake.rate_limit_requests", "must be at least 1");
        }
        if self.handshake.rate_limit_window_secs == 0 {
            return invalid("handshake.rate_limit_window_secs", "must be greater than zero");
        }

        Ok(())
    }

    /// The configured API base url.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiUrl` if none is set.
    pub fn api_url(&self) -> Result<Url> {
        let url = self.api.url.as_deref().ok_or(ConfigError::MissingApiUrl)?;
        parse_base_url(url)
    }
}

fn parse_base_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::Invalid {
        field: "api.url",
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ConfigError::Invalid {
            field: "api.url",
            reason: format!("unsupported scheme '{}'", other),
        }
        .into()),
    }
}
