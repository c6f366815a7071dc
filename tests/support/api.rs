//! A fake Roster API answering liveness probes.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Router,
};
use tokio::runtime::Runtime;

use super::fixtures::{PROBE_PATH, VALID_TOKEN};

/// Fake API on its own runtime, for tests driving the binary.
pub struct FakeApi {
    addr: SocketAddr,
    probes: Arc<AtomicUsize>,
    _runtime: Runtime,
}

impl FakeApi {
    /// Start a fake API that accepts only [`VALID_TOKEN`].
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("failed to build runtime");
        let probes = Arc::new(AtomicUsize::new(0));
        let addr = runtime.block_on(spawn(Arc::clone(&probes)));
        Self {
            addr,
            probes,
            _runtime: runtime,
        }
    }

    /// Base url, without the probe path.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of probe requests received.
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

async fn probe(State(probes): State<Arc<AtomicUsize>>, headers: HeaderMap) -> StatusCode {
    probes.fetch_add(1, Ordering::SeqCst);
    let expected = format!("Bearer {}", VALID_TOKEN);
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => StatusCode::OK,
        _ => StatusCode::UNAUTHORIZED,
    }
}

/// Bind the fake API on the current runtime.
pub async fn spawn(probes: Arc<AtomicUsize>) -> SocketAddr {
    let app = Router::new()
        .route(PROBE_PATH, get(probe))
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .with_state(probes);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fake api");
    let addr = listener.local_addr().expect("fake api has no address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
