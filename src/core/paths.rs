//! Per-user state directory resolution.

use std::path::PathBuf;

use crate::core::constants;
use crate::error::{Result, StoreError};

/// Directory holding config and credentials (`~/.roster`).
///
/// `ROSTER_HOME` overrides the location.
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(constants::HOME_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = dirs::home_dir().ok_or(StoreError::NoHome)?;
    Ok(home.join(constants::HOME_DIR))
}

/// Path of the config file.
pub fn config_path() -> Result<PathBuf> {
    Ok(state_dir()?.join(constants::CONFIG_FILE))
}

/// Path of the credentials file.
pub fn credentials_path() -> Result<PathBuf> {
    Ok(state_dir()?.join(constants::CREDENTIALS_FILE))
}
