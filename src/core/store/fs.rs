//! Filesystem-based credential storage.
//!
//! Keeps every account in one JSON document
//! (`~/.roster/credentials.json`), rewritten atomically on each change and
//! restricted to the owner on Unix.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::CredentialStore;
use crate::core::domain::Credentials;
use crate::core::paths;
use crate::core::validation::validate_account_name;
use crate::error::{Result, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    accounts: BTreeMap<String, Credentials>,
}

/// Filesystem credential store.
pub struct Filesystem {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl Filesystem {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store backed by the default credentials file.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(paths::credentials_path()?))
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<CredentialFile> {
        if !self.path.exists() {
            return Ok(CredentialFile::default());
        }

        #[cfg(unix)]
        warn_if_readable_by_others(&self.path);

        let contents = fs::read_to_string(&self.path).map_err(StoreError::Read)?;
        if contents.trim().is_empty() {
            return Ok(CredentialFile::default());
        }
        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt(e.to_string()).into())
    }

    fn write_file(&self, file: &CredentialFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Write)?;
        }

        let contents = serde_json::to_string_pretty(file)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut options = fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut out = options.open(&tmp).map_err(StoreError::Write)?;
            out.write_all(contents.as_bytes())
                .map_err(StoreError::Write)?;
            out.sync_all().map_err(StoreError::Write)?;
        }
        fs::rename(&tmp, &self.path).map_err(StoreError::Write)?;

        debug!(path = %self.path.display(), accounts = file.accounts.len(), "credentials saved");
        Ok(())
    }
}

#[cfg(unix)]
fn warn_if_readable_by_others(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            warn!(
                path = %path.display(),
                mode = %format!("{:o}", mode),
                "insecure credentials file permissions"
            );
        }
    }
}

impl CredentialStore for Filesystem {
    fn get(&self, name: &str) -> Result<Credentials> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_file()?
            .accounts
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()).into())
    }

    fn set(&self, name: &str, credentials: &Credentials) -> Result<()> {
        validate_account_name(name)?;

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.read_file()?;

        let mut entry = credentials.clone();
        entry.name = name.to_string();
        let replaced = file.accounts.insert(name.to_string(), entry).is_some();
        self.write_file(&file)?;

        info!(account = %name, replaced, "credentials stored");
        Ok(())
    }

    fn list(&self) -> Result<Vec<Credentials>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_file()?.accounts.into_values().collect())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.read_file()?;

        if file.accounts.remove(name).is_none() {
            return Err(StoreError::NotFound(name.to_string()).into());
        }
        self.write_file(&file)?;

        info!(account = %name, "credentials deleted");
        Ok(())
    }
}
