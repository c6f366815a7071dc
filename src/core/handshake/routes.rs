use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, DefaultBodyLimit, MatchedPath, Path, Query, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::page;
use super::session::{Ending, FailureVerdict, Session};
use super::Mode;
use crate::core::api::LivenessProbe;
use crate::core::constants::{MAX_BODY_BYTES, SESSION_HEADER};
use crate::core::domain::{Credentials, SetupResult, Token};
use crate::core::ratelimit::RateLimiter;
use crate::core::store::CredentialStore;
use crate::core::validation::{
    normalize_account_name, sanitize_token, validate_account_name, validate_token,
};
use crate::error::{ApiError, Error, HandshakeError, StoreError};

const PAGE_CSP: &str = "default-src 'none'; script-src 'unsafe-inline'; \
    style-src 'unsafe-inline'; connect-src 'self'; form-action 'none'; \
    frame-ancestors 'none'; base-uri 'none'";

#[derive(Clone)]
pub(super) struct HandshakeState {
    pub(super) session: Arc<Session>,
    pub(super) store: Arc<dyn CredentialStore>,
    pub(super) probe: Arc<dyn LivenessProbe>,
    pub(super) limiter: Arc<RateLimiter>,
    pub(super) mode: Mode,
    pub(super) port: u16,
    pub(super) default_account: String,
}

/// JSON body of every API response.
#[derive(Debug, Serialize)]
struct Reply {
    ok: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_attempts: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    closed: bool,
}

impl Reply {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            account: None,
            remaining_attempts: None,
            closed: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            ..Self::ok(message)
        }
    }

    fn closed(message: impl Into<String>) -> Self {
        Self {
            closed: true,
            ..Self::error(message)
        }
    }

    fn respond(self, status: StatusCode) -> Response {
        let mut response = (status, Json(self)).into_response();
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}

fn session_closed() -> Response {
    Reply::closed("This setup session is closed. Return to the terminal.")
        .respond(StatusCode::GONE)
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    session: Option<String>,
}

#[derive(Deserialize)]
struct Submission {
    account: String,
    token: Token,
}

#[derive(Debug, Serialize)]
struct AccountSummary {
    name: String,
    created_at: DateTime<Utc>,
    masked: String,
}

#[derive(Debug, Serialize)]
struct AccountList {
    ok: bool,
    accounts: Vec<AccountSummary>,
}

impl HandshakeState {
    /// Checks every request passes before its handler runs.
    ///
    /// Order: Host, Origin, session open, session secret. The rate limit
    /// has already been applied by [`rate_limit`].
    fn guard(
        &self,
        peer: SocketAddr,
        headers: &HeaderMap,
        endpoint: &'static str,
        presented: Option<&str>,
    ) -> Result<(), Response> {
        if !self.host_allowed(headers) {
            warn!(peer = %peer, endpoint, "rejected request with foreign Host header");
            return Err(Reply::error("Host not allowed.").respond(StatusCode::FORBIDDEN));
        }

        if !self.origin_allowed(headers) {
            warn!(peer = %peer, endpoint, "rejected cross-origin request");
            return Err(Reply::error("Origin not allowed.").respond(StatusCode::FORBIDDEN));
        }

        if self.session.is_closed() {
            return Err(session_closed());
        }

        match presented {
            Some(secret) if self.session.secret_matches(secret) => Ok(()),
            _ => {
                warn!(peer = %peer, endpoint, "rejected request for another session");
                Err(Reply::closed(
                    "This page belongs to a different or expired setup session.",
                )
                .respond(StatusCode::FORBIDDEN))
            }
        }
    }

    fn loopback_authorities(&self) -> [String; 2] {
        [
            format!("127.0.0.1:{}", self.port),
            format!("localhost:{}", self.port),
        ]
    }

    fn host_allowed(&self, headers: &HeaderMap) -> bool {
        let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) else {
            return false;
        };
        self.loopback_authorities()
            .iter()
            .any(|allowed| host.eq_ignore_ascii_case(allowed))
    }

    fn origin_allowed(&self, headers: &HeaderMap) -> bool {
        let Some(origin) = headers.get(header::ORIGIN) else {
            return true;
        };
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        self.loopback_authorities()
            .iter()
            .any(|allowed| origin.eq_ignore_ascii_case(&format!("http://{}", allowed)))
    }

    /// Count a rejected submission and build the reply for it.
    fn reject(&self, status: StatusCode, message: impl Into<String>) -> Response {
        let message = message.into();
        match self.session.record_failure() {
            FailureVerdict::Retry { remaining } => Reply {
                remaining_attempts: Some(remaining),
                ..Reply::error(message)
            }
            .respond(status),
            FailureVerdict::Exhausted(attempts) => Reply::closed(format!(
                "{} Too many failed attempts ({}); this setup session is closed.",
                message, attempts
            ))
            .respond(StatusCode::GONE),
            FailureVerdict::Closed => session_closed(),
        }
    }

    fn require_manage(&self) -> Result<(), Response> {
        if self.mode == Mode::Manage {
            return Ok(());
        }
        Err(Reply::error("Not available in this mode.").respond(StatusCode::NOT_FOUND))
    }
}

fn session_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok())
}

async fn landing(
    State(state): State<HandshakeState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    if let Err(response) = state.guard(peer, &headers, "page", query.session.as_deref()) {
        return response;
    }

    state.session.mark_page_served();
    debug!(peer = %peer, "served setup page");

    let html = page::render(state.mode, query.session.as_deref().unwrap_or_default(), &state.default_account);
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
            (header::REFERRER_POLICY, "no-referrer"),
            (header::X_FRAME_OPTIONS, "DENY"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            (header::CONTENT_SECURITY_POLICY, PAGE_CSP),
        ],
        html,
    )
        .into_response()
}

async fn submit_token(
    State(state): State<HandshakeState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(response) = state.guard(peer, &headers, "token", session_header(&headers)) {
        return response;
    }

    let Ok(submission) = serde_json::from_slice::<Submission>(&body) else {
        return state.reject(StatusCode::BAD_REQUEST, "Malformed submission.");
    };

    let account = normalize_account_name(&submission.account);
    if let Err(e) = validate_account_name(&account) {
        return state.reject(StatusCode::BAD_REQUEST, e.to_string());
    }

    let token = Token::new(sanitize_token(submission.token.expose()));
    if let Err(e) = validate_token(token.expose()) {
        return state.reject(StatusCode::BAD_REQUEST, e.to_string());
    }

    if state.session.is_closed() {
        return session_closed();
    }

    match state.probe.check(&token).await {
        Ok(()) => {}
        Err(Error::Api(ApiError::Rejected(status))) => {
            info!(account = %account, status, "token rejected by API");
            return state.reject(
                StatusCode::UNAUTHORIZED,
                "The API did not accept this token.",
            );
        }
        Err(e) => {
            warn!(account = %account, error = %e, "liveness check failed");
            return state.reject(
                StatusCode::BAD_GATEWAY,
                format!("Could not verify the token: {}.", e),
            );
        }
    }

    if !state.session.begin_commit() {
        debug!(account = %account, "lost the race to complete the session");
        return session_closed();
    }

    let committed = tokio::spawn(commit(
        Arc::clone(&state.session),
        Arc::clone(&state.store),
        Credentials::new(account.clone(), token),
    ))
    .await
    .unwrap_or(false);

    if committed {
        Reply {
            account: Some(account.clone()),
            ..Reply::ok(format!("Saved credentials for '{}'.", account))
        }
        .respond(StatusCode::OK)
    } else {
        Reply::closed("Could not save the credentials. See the terminal for details.")
            .respond(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Write claimed credentials and settle the session.
///
/// Spawned by the handler so the session still settles if the client
/// disconnects and the handler future is dropped mid-write.
async fn commit(
    session: Arc<Session>,
    store: Arc<dyn CredentialStore>,
    credentials: Credentials,
) -> bool {
    let account = credentials.name.clone();
    let saved = tokio::task::spawn_blocking(move || store.set(&credentials.name, &credentials))
        .await
        .unwrap_or_else(|e| Err(HandshakeError::Server(e.to_string()).into()));

    match saved {
        Ok(()) => {
            info!(account = %account, "credentials saved from browser session");
            session.finish_commit(Ok(SetupResult {
                account_name: account,
            }));
            true
        }
        Err(e) => {
            error!(account = %account, error = %e, "failed to save credentials");
            session.finish_commit(Err(HandshakeError::StoreWriteFailed(e.to_string()).into()));
            false
        }
    }
}

async fn list_accounts(
    State(state): State<HandshakeState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = state.guard(peer, &headers, "accounts", session_header(&headers)) {
        return response;
    }
    if let Err(response) = state.require_manage() {
        return response;
    }

    let store = Arc::clone(&state.store);
    let listed = tokio::task::spawn_blocking(move || store.list())
        .await
        .unwrap_or_else(|e| Err(HandshakeError::Server(e.to_string()).into()));

    match listed {
        Ok(accounts) => {
            let accounts = accounts
                .into_iter()
                .map(|c| AccountSummary {
                    masked: c.token.masked(),
                    name: c.name,
                    created_at: c.created_at,
                })
                .collect();
            let mut response = Json(AccountList { ok: true, accounts }).into_response();
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            response
        }
        Err(e) => {
            error!(error = %e, "failed to list credentials");
            Reply::error("Could not read stored accounts.")
                .respond(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn delete_account(
    State(state): State<HandshakeState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Response {
    if let Err(response) = state.guard(peer, &headers, "delete", session_header(&headers)) {
        return response;
    }
    if let Err(response) = state.require_manage() {
        return response;
    }

    let name = normalize_account_name(&name);
    if let Err(e) = validate_account_name(&name) {
        return Reply::error(e.to_string()).respond(StatusCode::BAD_REQUEST);
    }

    let store = Arc::clone(&state.store);
    let session = Arc::clone(&state.session);
    let target = name.clone();
    let deleted = tokio::task::spawn_blocking(move || {
        if session.is_closed() {
            return Err(HandshakeError::Cancelled.into());
        }
        store.delete(&target)
    })
    .await
    .unwrap_or_else(|e| Err(HandshakeError::Server(e.to_string()).into()));

    match deleted {
        Ok(()) => {
            info!(account = %name, "credentials deleted from browser session");
            Reply::ok(format!("Removed '{}'.", name)).respond(StatusCode::OK)
        }
        Err(Error::Store(StoreError::NotFound(_))) => {
            Reply::error(format!("No account named '{}'.", name)).respond(StatusCode::NOT_FOUND)
        }
        Err(Error::Handshake(HandshakeError::Cancelled)) => session_closed(),
        Err(e) => {
            error!(account = %name, error = %e, "failed to delete credentials");
            Reply::error("Could not remove the account.")
                .respond(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn cancel(
    State(state): State<HandshakeState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = state.guard(peer, &headers, "cancel", session_header(&headers)) {
        return response;
    }

    if state.session.end(Ending::Cancelled) {
        info!("setup cancelled from the browser");
        Reply::closed("Setup cancelled. You can close this window.")
            .respond(StatusCode::OK)
    } else {
        session_closed()
    }
}

/// Count every request against its (peer, route) budget.
///
/// Runs before extraction and method routing, so oversized bodies and
/// wrong methods are limited like any other request.
async fn rate_limit(
    State(state): State<HandshakeState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "other".to_string());

    match state.limiter.check(&peer.ip().to_string(), &endpoint) {
        Err(Error::Handshake(HandshakeError::RateLimited { retry_after_secs })) => {
            debug!(peer = %peer, endpoint = %endpoint, "rate limited");
            let mut response = Reply::error(format!(
                "Too many requests. Try again in {}s.",
                retry_after_secs
            ))
            .respond(StatusCode::TOO_MANY_REQUESTS);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            response
        }
        _ => next.run(request).await,
    }
}

async fn not_found() -> Response {
    Reply::error("Not found.").respond(StatusCode::NOT_FOUND)
}

pub(super) fn build_router(state: HandshakeState) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/api/token", post(submit_token))
        .route("/api/accounts", get(list_accounts))
        .route("/api/accounts/:name", delete(delete_account))
        .route("/api/cancel", post(cancel))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state)
}
