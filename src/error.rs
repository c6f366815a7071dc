//! Error types for roster.
//!
//! Each concern owns a small enum; all of them fold into [`Error`] so callers
//! can use a single `Result` alias and `?` everywhere.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this is the "user walked away" outcome of a browser session.
    ///
    /// Callers treat it as a clean exit rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Error::Handshake(HandshakeError::Cancelled) | Error::Handshake(HandshakeError::TimedOut)
        )
    }
}

/// Rejected user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid account name '{name}': {reason}")]
    InvalidAccountName { name: String, reason: String },

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Credential store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("account not found: {0}")]
    NotFound(String),

    #[error("failed to read credentials: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write credentials: {0}")]
    Write(#[source] std::io::Error),

    #[error("credentials file is corrupt: {0}")]
    Corrupt(String),

    #[error("unable to determine home directory")]
    NoHome,
}

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no API url configured")]
    MissingApiUrl,

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Remote API failures, including the liveness probe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("token rejected by the API (HTTP {0})")]
    Rejected(u16),

    #[error("unexpected API response (HTTP {0})")]
    Status(u16),

    #[error("API request failed: {0}")]
    Request(String),

    #[error("invalid API url: {0}")]
    InvalidUrl(String),
}

/// Browser handshake failures.
#[derive(Error, Debug)]
pub enum HandshakeError {
    #[error("failed to bind loopback listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("too many requests, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("setup cancelled")]
    Cancelled,

    #[error("setup timed out")]
    TimedOut,

    #[error("setup aborted after {0} failed attempts")]
    TooManyAttempts(u32),

    #[error("failed to save credentials: {0}")]
    StoreWriteFailed(String),

    #[error("could not open a browser: {0}")]
    Browser(String),

    #[error("handshake server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, Error>;
