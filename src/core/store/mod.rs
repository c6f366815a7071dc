//! Credential storage.
//!
//! Abstracts where named credential sets live so the CLI and the handshake
//! server can share one interface.
//!
//! ## Adding a New Storage Backend
//!
//! 1. Implement the `CredentialStore` trait
//! 2. Add the implementation in a new file (e.g., `keyring.rs`)
//! 3. Select it from `default_backend`

use crate::core::domain::Credentials;
use crate::error::Result;

mod backend;
mod fs;

pub use backend::default_backend;
pub use fs::Filesystem;

/// Credential storage trait.
///
/// Implementations must be safe to call from concurrent handler tasks.
pub trait CredentialStore: Send + Sync {
    /// Load the credentials stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no such account exists.
    fn get(&self, name: &str) -> Result<Credentials>;

    /// Store `credentials` under `name`, replacing any previous entry.
    fn set(&self, name: &str, credentials: &Credentials) -> Result<()>;

    /// All stored credentials, sorted by name.
    fn list(&self) -> Result<Vec<Credentials>>;

    /// Remove the credentials stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no such account exists.
    fn delete(&self, name: &str) -> Result<()>;
}
