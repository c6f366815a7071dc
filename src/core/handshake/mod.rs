//! Browser-mediated credential setup.
//!
//! A [`SetupServer`] binds an ephemeral loopback listener, serves a page the
//! user pastes a token into, and hands the validated account name back to
//! the caller of [`SetupServer::start`]. The session ends in exactly one of
//! four ways:
//!
//! - a submission passes validation and the liveness probe and is stored
//! - the caller's [`CancellationToken`] fires (or the user presses Cancel)
//! - the configured timeout elapses
//! - too many submissions are rejected, or the store write fails
//!
//! The listener is shut down and drained before `start` returns on every
//! path, so repeated invocations never leak the port and no handler can touch
//! the store afterwards.
//!
//! # Example
//!
//! ```ignore
//! let server = SetupServer::bind(store, probe)?;
//! println!("visit {}", server.url());
//! let result = server.start(CancellationToken::new()).await?;
//! println!("saved {}", result.account_name);
//! ```

mod browser;
mod page;
mod routes;
mod session;

use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub use browser::{BrowserOpener, NoBrowser, SystemBrowser};
pub use session::SessionState;

use self::routes::{build_router, HandshakeState};
use self::session::{Ending, Outcome, Session};
use crate::core::api::LivenessProbe;
use crate::core::config::HandshakeConfig;
use crate::core::constants::{self, SHUTDOWN_GRACE_SECS};
use crate::core::domain::SetupResult;
use crate::core::ratelimit::RateLimiter;
use crate::core::store::CredentialStore;
use crate::core::validation::{normalize_account_name, validate_account_name};
use crate::error::{HandshakeError, Result};

/// Which page the server presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Add one account.
    Login,
    /// Add an account, and list or delete stored ones.
    Manage,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Login => "login",
            Mode::Manage => "manage",
        }
    }
}

/// Tunables for one session.
#[derive(Debug, Clone)]
pub struct HandshakeOptions {
    pub timeout: Duration,
    pub max_failures: u32,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
}

impl Default for HandshakeOptions {
    fn default() -> Self {
        Self::from(&HandshakeConfig::default())
    }
}

impl From<&HandshakeConfig> for HandshakeOptions {
    fn from(config: &HandshakeConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_failures: config.max_failures,
            rate_limit_requests: config.rate_limit_requests,
            rate_limit_window: config.rate_limit_window(),
        }
    }
}

/// Single-use loopback server for one handshake session.
pub struct SetupServer {
    listener: TcpListener,
    addr: SocketAddr,
    mode: Mode,
    secret: String,
    store: Arc<dyn CredentialStore>,
    probe: Arc<dyn LivenessProbe>,
    browser: Box<dyn BrowserOpener>,
    options: HandshakeOptions,
    default_account: String,
}

impl SetupServer {
    /// Bind a Login-mode server on an OS-assigned loopback port.
    ///
    /// # Errors
    ///
    /// Returns `HandshakeError::Bind` if the listener cannot be bound.
    pub fn bind(store: Arc<dyn CredentialStore>, probe: Arc<dyn LivenessProbe>) -> Result<Self> {
        Self::bind_with_mode(store, probe, Mode::Login)
    }

    /// Bind a server for `mode` on an OS-assigned loopback port.
    ///
    /// # Errors
    ///
    /// Returns `HandshakeError::Bind` if the listener cannot be bound.
    pub fn bind_with_mode(
        store: Arc<dyn CredentialStore>,
        probe: Arc<dyn LivenessProbe>,
        mode: Mode,
    ) -> Result<Self> {
        let listener =
            TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).map_err(HandshakeError::Bind)?;
        listener
            .set_nonblocking(true)
            .map_err(HandshakeError::Bind)?;
        let addr = listener.local_addr().map_err(HandshakeError::Bind)?;

        debug!(addr = %addr, mode = mode.as_str(), "handshake listener bound");

        Ok(Self {
            listener,
            addr,
            mode,
            secret: generate_secret(),
            store,
            probe,
            browser: Box::new(SystemBrowser),
            options: HandshakeOptions::default(),
            default_account: constants::DEFAULT_ACCOUNT.to_string(),
        })
    }

    pub fn with_options(mut self, options: HandshakeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_browser(mut self, browser: impl BrowserOpener + 'static) -> Self {
        self.browser = Box::new(browser);
        self
    }

    /// Account name prefilled on the page. Ignored unless it is a valid
    /// account name after normalizing.
    pub fn with_default_account(mut self, name: &str) -> Self {
        let name = normalize_account_name(name);
        if validate_account_name(&name).is_ok() {
            self.default_account = name;
        }
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The url the user opens, carrying this session's secret.
    pub fn url(&self) -> String {
        session_url(self.addr, &self.secret)
    }

    /// Run the session to completion.
    ///
    /// Serves the page, opens the browser, and waits for a stored
    /// submission, cancellation, or timeout, whichever comes first.
    ///
    /// # Errors
    ///
    /// - `HandshakeError::Cancelled` when `cancel` fires or the user cancels
    ///   from the page
    /// - `HandshakeError::TimedOut` when the configured timeout elapses
    /// - `HandshakeError::TooManyAttempts` after repeated rejected submissions
    /// - `HandshakeError::StoreWriteFailed` if saving the credentials fails
    pub async fn start(self, cancel: CancellationToken) -> Result<SetupResult> {
        let url = self.url();
        let SetupServer {
            listener,
            addr,
            mode,
            secret,
            store,
            probe,
            browser,
            options,
            default_account,
        } = self;

        let (session, outcome_rx) = Session::new(secret, options.max_failures);
        let session = Arc::new(session);

        let state = HandshakeState {
            session: Arc::clone(&session),
            store,
            probe,
            limiter: Arc::new(RateLimiter::new(
                options.rate_limit_requests,
                options.rate_limit_window,
            )),
            mode,
            port: addr.port(),
            default_account,
        };

        let listener = tokio::net::TcpListener::from_std(listener).map_err(HandshakeError::Bind)?;
        let app = build_router(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        // Connections may already be queued on the bound socket.
        session.mark_listening();

        let mut server = tokio::spawn(async move {
            let serve = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            if let Err(err) = serve.await {
                error!(addr = %addr, error = %err, "handshake server error");
            }
        });

        info!(addr = %addr, mode = mode.as_str(), "handshake server listening");

        if let Err(e) = browser.open(&url) {
            warn!(error = %e, "could not open a browser; visit the printed url instead");
        }

        let outcome = wait_for_outcome(&session, outcome_rx, &cancel, options.timeout).await;

        let _ = shutdown_tx.send(());
        let grace = Duration::from_secs(SHUTDOWN_GRACE_SECS);
        if tokio::time::timeout(grace, &mut server).await.is_err() {
            warn!("handshake server did not drain in time, aborting it");
            server.abort();
            let _ = server.await;
        }

        info!(state = ?session.state(), "handshake session closed");
        outcome
    }
}

/// Wait for the first of: an outcome from a handler, cancellation, timeout.
///
/// Cancellation and timeout only ask the session to end; if a commit is
/// already in flight they lose, and its outcome is awaited instead.
async fn wait_for_outcome(
    session: &Session,
    mut outcome_rx: oneshot::Receiver<Outcome>,
    cancel: &CancellationToken,
    timeout: Duration,
) -> Outcome {
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);
    let mut cancel_seen = false;
    let mut deadline_seen = false;

    loop {
        tokio::select! {
            received = &mut outcome_rx => {
                return received.unwrap_or_else(|_| {
                    Err(HandshakeError::Server("session ended without an outcome".to_string()).into())
                });
            }
            _ = cancel.cancelled(), if !cancel_seen => {
                cancel_seen = true;
                if session.end(Ending::Cancelled) {
                    debug!("session cancelled by caller");
                }
            }
            _ = &mut deadline, if !deadline_seen => {
                deadline_seen = true;
                if session.end(Ending::TimedOut) {
                    debug!(timeout_secs = timeout.as_secs(), "session timed out");
                }
            }
        }
    }
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn session_url(addr: SocketAddr, secret: &str) -> String {
    format!("http://{}/?session={}", addr, secret)
}
