//! Remote API access used by the credential flows.
//!
//! Only the liveness probe lives here: one authenticated read-only request
//! confirming the API accepts a token before it is persisted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use crate::core::config::Config;
use crate::core::domain::Token;
use crate::error::{ApiError, Result};

/// Confirms a token is accepted by the remote service.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the API refuses the token, and
    /// other `ApiError` variants when the API cannot answer.
    async fn check(&self, token: &Token) -> Result<()>;
}

/// Probe issuing `GET <base><probe_path>` with a bearer token.
pub struct HttpProbe {
    client: reqwest::Client,
    url: Url,
}

impl HttpProbe {
    /// Probe against `base` + `path`.
    pub fn new(base: &Url, path: &str, timeout: Duration) -> Result<Self> {
        // Appended, not joined, so a base path like `/api` is kept.
        let url = Url::parse(&format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
        .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        let client = reqwest::Client::builder()
            .user_agent(format!("roster-cli/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self { client, url })
    }

    /// Probe built from the user's configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiUrl` when no API url is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_url()?,
            &config.api.probe_path,
            Duration::from_secs(config.api.timeout_secs),
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn check(&self, token: &Token) -> Result<()> {
        debug!(url = %self.url, fingerprint = %token.fingerprint(), "probing token");

        let response = self
            .client
            .get(self.url.clone())
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "liveness probe failed");
                ApiError::Request(e.without_url().to_string())
            })?;

        classify(response.status())
    }
}

fn classify(status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Rejected(status.as_u16()).into());
    }
    Err(ApiError::Status(status.as_u16()).into())
}
