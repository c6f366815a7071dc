//! Fixed-window rate limiting for the handshake server.
//!
//! Each distinct `(key1, key2)` pair gets its own counter; the handshake
//! server uses (client address, endpoint name). A window starts at the first
//! request seen for a key and is not renewed by later requests. Once it has
//! elapsed the next request opens a fresh window with a count of one.
//!
//! State lives for the lifetime of the limiter only. The handshake server is
//! single-session, so the map is not evicted.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::{HandshakeError, Result};

#[derive(Debug, Clone, Copy)]
struct Window {
    start: Instant,
    count: u32,
}

/// In-memory keyed rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<HashMap<(String, String), Window>>,
}

impl RateLimiter {
    /// Allow `max_requests` per key within each `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request for `(key1, key2)`.
    ///
    /// # Errors
    ///
    /// Returns `HandshakeError::RateLimited` once the key has used its budget
    /// for the current window.
    pub fn check(&self, key1: &str, key2: &str) -> Result<()> {
        self.check_at(key1, key2, Instant::now())
    }

    pub(crate) fn check_at(&self, key1: &str, key2: &str, now: Instant) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let entry = state
            .entry((key1.to_string(), key2.to_string()))
            .or_insert(Window {
                start: now,
                count: 0,
            });

        let elapsed = now.saturating_duration_since(entry.start);
        if elapsed >= self.window {
            entry.start = now;
            entry.count = 0;
        }

        entry.count = entry.count.saturating_add(1);

        if entry.count > self.max_requests {
            let retry_after = self.window.saturating_sub(now.saturating_duration_since(entry.start));
            warn!(
                client = %key1,
                endpoint = %key2,
                count = entry.count,
                max = self.max_requests,
                "rate limit exceeded"
            );
            return Err(HandshakeError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            }
            .into());
        }

        Ok(())
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
