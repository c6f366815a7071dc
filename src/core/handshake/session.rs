//! Handshake session state machine.
//!
//! ```text
//! Created -> Listening -> AwaitingSubmission -> Committing -> Completed
//!                 |               |                  \-----> Failed
//!                 \---------------+--> Cancelled | TimedOut | Failed
//! ```
//!
//! Every transition happens under one mutex. The single outcome sender is
//! taken by whichever transition reaches a terminal state first, so the
//! coordinator receives exactly one outcome. `Committing` is entered by at
//! most one submission; while it is held, cancellation and timeout cannot
//! pre-empt the store write and the coordinator waits for its result.

use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::core::domain::SetupResult;
use crate::error::{Error, HandshakeError};

/// What the coordinator receives when the session ends.
pub(crate) type Outcome = std::result::Result<SetupResult, Error>;

/// Lifecycle of one handshake session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Listening,
    AwaitingSubmission,
    Committing,
    Completed,
    Cancelled,
    TimedOut,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed
                | SessionState::Cancelled
                | SessionState::TimedOut
                | SessionState::Failed
        )
    }

    /// Still accepting submissions.
    fn is_open(self) -> bool {
        matches!(
            self,
            SessionState::Listening | SessionState::AwaitingSubmission
        )
    }
}

/// Non-commit ways for a session to end.
#[derive(Debug)]
pub(crate) enum Ending {
    Cancelled,
    TimedOut,
}

/// Result of counting a rejected submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureVerdict {
    /// Session stays open for another attempt.
    Retry { remaining: u32 },
    /// This failure hit the cutoff and failed the session.
    Exhausted(u32),
    /// Session was already closed or committing.
    Closed,
}

struct Inner {
    state: SessionState,
    failures: u32,
    outcome_tx: Option<oneshot::Sender<Outcome>>,
}

impl Inner {
    fn settle(&mut self, state: SessionState, outcome: Outcome) {
        self.state = state;
        match self.outcome_tx.take() {
            Some(tx) => {
                // The receiver only disappears once `start` has returned.
                let _ = tx.send(outcome);
            }
            None => warn!(state = ?state, "session settled twice"),
        }
    }
}

/// Shared state of one session.
pub(crate) struct Session {
    secret: String,
    max_failures: u32,
    inner: Mutex<Inner>,
}

impl Session {
    pub(crate) fn new(secret: String, max_failures: u32) -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let session = Self {
            secret,
            max_failures: max_failures.max(1),
            inner: Mutex::new(Inner {
                state: SessionState::Created,
                failures: 0,
                outcome_tx: Some(tx),
            }),
        };
        (session, rx)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Terminal, so no request may act on it any more.
    pub(crate) fn is_closed(&self) -> bool {
        self.state().is_terminal()
    }

    /// Constant-time comparison against the session secret.
    pub(crate) fn secret_matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.secret.as_bytes(), candidate.as_bytes())
    }

    pub(crate) fn mark_listening(&self) {
        let mut inner = self.lock();
        if inner.state == SessionState::Created {
            inner.state = SessionState::Listening;
        }
    }

    pub(crate) fn mark_page_served(&self) {
        let mut inner = self.lock();
        if inner.state == SessionState::Listening {
            inner.state = SessionState::AwaitingSubmission;
        }
    }

    /// Count a rejected submission against the cutoff.
    pub(crate) fn record_failure(&self) -> FailureVerdict {
        let mut inner = self.lock();
        if !inner.state.is_open() {
            return FailureVerdict::Closed;
        }

        inner.failures += 1;
        let failures = inner.failures;
        if failures >= self.max_failures {
            warn!(failures, "too many failed submissions, failing session");
            inner.settle(
                SessionState::Failed,
                Err(HandshakeError::TooManyAttempts(failures).into()),
            );
            return FailureVerdict::Exhausted(failures);
        }

        debug!(failures, max = self.max_failures, "submission rejected");
        FailureVerdict::Retry {
            remaining: self.max_failures - failures,
        }
    }

    /// Claim the right to write to the store.
    ///
    /// Returns `false` if the session is closed or another submission holds
    /// the claim.
    pub(crate) fn begin_commit(&self) -> bool {
        let mut inner = self.lock();
        if !inner.state.is_open() {
            return false;
        }
        inner.state = SessionState::Committing;
        true
    }

    /// Settle the session after the store write claimed by `begin_commit`.
    pub(crate) fn finish_commit(&self, outcome: Outcome) {
        let mut inner = self.lock();
        if inner.state != SessionState::Committing {
            warn!(state = ?inner.state, "finish_commit without a commit in progress");
            return;
        }
        let state = if outcome.is_ok() {
            SessionState::Completed
        } else {
            SessionState::Failed
        };
        inner.settle(state, outcome);
    }

    /// End the session without a commit.
    ///
    /// Returns `false` if the session already ended or a commit is in flight.
    pub(crate) fn end(&self, ending: Ending) -> bool {
        let mut inner = self.lock();
        if !inner.state.is_open() && inner.state != SessionState::Created {
            return false;
        }
        let (state, error) = match ending {
            Ending::Cancelled => (SessionState::Cancelled, HandshakeError::Cancelled),
            Ending::TimedOut => (SessionState::TimedOut, HandshakeError::TimedOut),
        };
        inner.settle(state, Err(error.into()));
        true
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
