//! Backend selection for credential storage.

use std::sync::Arc;

use tracing::debug;

use super::{CredentialStore, Filesystem};
use crate::error::Result;

/// Default backend: the credentials file in the state directory.
pub fn default_backend() -> Result<Arc<dyn CredentialStore>> {
    let store = Filesystem::open_default()?;
    debug!(path = %store.path().display(), "using filesystem credential store");
    Ok(Arc::new(store))
}
