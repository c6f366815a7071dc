//! Constants used throughout roster.
//!
//! Centralizes magic strings and limits.

/// Per-user state directory relative to HOME (~/.roster).
pub const HOME_DIR: &str = ".roster";

/// Environment variable overriding the state directory.
pub const HOME_ENV: &str = "ROSTER_HOME";

/// Environment variable overriding the API base url.
pub const API_URL_ENV: &str = "ROSTER_API_URL";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "ROSTER_LOG";

/// Configuration file name inside the state directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Credential file name inside the state directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Account name used when none is given.
pub const DEFAULT_ACCOUNT: &str = "default";

/// Longest accepted account name, in bytes.
pub const MAX_ACCOUNT_NAME_LEN: usize = 64;

/// Longest accepted token, in bytes.
pub const MAX_TOKEN_LEN: usize = 4096;

/// Path probed to confirm a token is live.
pub const DEFAULT_PROBE_PATH: &str = "/v1/me";

/// Remote API request timeout.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

/// How long a browser session waits for a submission.
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 300;

/// Consecutive rejected submissions before a session is failed.
pub const DEFAULT_MAX_FAILURES: u32 = 5;

/// Requests allowed per (client, endpoint) within one window.
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 20;

/// Rate limit window length.
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Header carrying the per-session secret on API calls.
pub const SESSION_HEADER: &str = "x-roster-session";

/// Largest request body the handshake server reads.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// How long shutdown waits for in-flight handlers before aborting them.
pub const SHUTDOWN_GRACE_SECS: u64 = 5;
