//! Stored credential set and handshake result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Token;

/// A named credential set, as persisted by a `CredentialStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub name: String,
    pub token: Token,
    pub created_at: DateTime<Utc>,
}

impl Credentials {
    /// Credentials created now.
    pub fn new(name: impl Into<String>, token: Token) -> Self {
        Self {
            name: name.into(),
            token,
            created_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// What a completed browser session hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupResult {
    pub account_name: String,
}
