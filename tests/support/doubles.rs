//! In-process test doubles for the handshake server.

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use roster::core::api::LivenessProbe;
use roster::core::domain::{Credentials, Token};
use roster::core::store::CredentialStore;
use roster::error::{ApiError, Result, StoreError};

use super::fixtures::VALID_TOKEN;

/// In-memory store counting every `set` call.
#[derive(Default)]
pub struct CountingStore {
    accounts: Mutex<BTreeMap<String, Credentials>>,
    sets: AtomicUsize,
    fail_writes: bool,
    delay: Duration,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A store whose writes always fail.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_writes: true,
            ..Self::default()
        })
    }

    /// A store whose writes block for `delay` before landing.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    /// A store already holding `accounts`.
    pub fn seeded(accounts: &[(&str, &str)]) -> Arc<Self> {
        let store = Self::default();
        {
            let mut map = store.accounts.lock().unwrap();
            for (name, token) in accounts {
                map.insert(
                    name.to_string(),
                    Credentials::new(*name, Token::new(*token)),
                );
            }
        }
        Arc::new(store)
    }

    /// Number of `set` calls, failed ones included.
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    /// The raw token stored under `name`.
    pub fn get_token(&self, name: &str) -> String {
        self.accounts.lock().unwrap()[name].token.expose().to_string()
    }

    pub fn names(&self) -> Vec<String> {
        self.accounts.lock().unwrap().keys().cloned().collect()
    }
}

impl CredentialStore for CountingStore {
    fn get(&self, name: &str) -> Result<Credentials> {
        self.accounts
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()).into())
    }

    fn set(&self, name: &str, credentials: &Credentials) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.fail_writes {
            return Err(StoreError::Write(io::Error::new(io::ErrorKind::Other, "disk full")).into());
        }
        self.accounts
            .lock()
            .unwrap()
            .insert(name.to_string(), credentials.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Credentials>> {
        Ok(self.accounts.lock().unwrap().values().cloned().collect())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.accounts
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()).into())
    }
}

/// Probe accepting only [`VALID_TOKEN`], optionally after a delay.
#[derive(Default)]
pub struct FakeProbe {
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A probe that takes `delay` to answer.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LivenessProbe for FakeProbe {
    async fn check(&self, token: &Token) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if token.expose() == VALID_TOKEN {
            Ok(())
        } else {
            Err(ApiError::Rejected(401).into())
        }
    }
}
