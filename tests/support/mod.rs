//! Test support utilities for roster integration tests.
//!
//! Provides isolated home directories for the binary, in-process test
//! doubles for the handshake server, and a throwaway fake API.

#![allow(dead_code)]

pub mod api;
pub mod assertions;
pub mod doubles;
pub mod fixtures;

#[allow(unused_imports)]
pub use api::*;
#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use doubles::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own working dir and roster home. No process-global
/// state is mutated, so tests can run in parallel.
pub struct Test {
    /// Working directory for the binary
    pub dir: TempDir,
    /// Directory used as `ROSTER_HOME`
    pub home: TempDir,
    /// API base url passed as `ROSTER_API_URL`, if any
    pub api_url: Option<String>,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self {
            dir,
            home,
            api_url: None,
        }
    }

    /// Create a test environment pointed at an API.
    pub fn with_api(url: impl Into<String>) -> Self {
        Self {
            api_url: Some(url.into()),
            ..Self::new()
        }
    }

    /// Create a test environment with accounts already stored.
    pub fn with_accounts(accounts: &[(&str, &str)]) -> Self {
        let t = Self::new();
        for (name, token) in accounts {
            let output = t.add(name, token);
            assert!(
                output.status.success(),
                "Failed to add account {}: {}",
                name,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        t
    }

    /// Path of the credentials file inside the test home.
    pub fn credentials_path(&self) -> PathBuf {
        self.home.path().join("credentials.json")
    }

    /// Path of the config file inside the test home.
    pub fn config_path(&self) -> PathBuf {
        self.home.path().join("config.toml")
    }
}
