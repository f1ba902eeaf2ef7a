//! Shared helpers for the discovery conformance suite.
//!
//! Provides [`spawn_host`]: a function that binds a `TcpListener` on an
//! ephemeral port and serves an in-process host publishing host-meta and
//! WebFinger documents over plain HTTP. Because the host speaks no TLS, every
//! `https://` request the client makes fails, which exercises the `http://`
//! host-meta fallback against a real socket.
//!
//! # Routes
//!
//! | Path | Response |
//! |------|----------|
//! | `/.well-known/host-meta` | depends on [`HostMetaMode`] |
//! | `/lrdd?resource={uri}` | XRD for `acct:alice@{host}` / `acct:bob@{host}`, 404 otherwise |

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use xrd::{HostMeta, HostMetaExt, LinkElement, WebFinger, REL_PROFILE_PAGE, XRD_CONTENT_TYPE};

/// Accounts the fixture host knows about.
pub const ACCOUNTS: [&str; 2] = ["alice", "bob"];

/// What `/.well-known/host-meta` serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMetaMode {
    /// An XRD with an LRDD template pointing at `/lrdd`.
    Lrdd,
    /// 404 Not Found.
    Missing,
    /// A 200 response whose body is not XML.
    Malformed,
}

/// Request counters shared between the fixture host and the tests.
#[derive(Debug)]
pub struct HostState {
    /// `host:port` the fixture is reachable at.
    pub host: String,
    pub mode: HostMetaMode,
    host_meta_hits: AtomicUsize,
    lrdd_hits: AtomicUsize,
    accept_headers: Mutex<Vec<String>>,
}

impl HostState {
    fn new(host: String, mode: HostMetaMode) -> Self {
        Self {
            host,
            mode,
            host_meta_hits: AtomicUsize::new(0),
            lrdd_hits: AtomicUsize::new(0),
            accept_headers: Mutex::new(Vec::new()),
        }
    }

    /// Requests that reached `/.well-known/host-meta`.
    pub fn host_meta_hits(&self) -> usize {
        self.host_meta_hits.load(Ordering::SeqCst)
    }

    /// Requests that reached `/lrdd`.
    pub fn lrdd_hits(&self) -> usize {
        self.lrdd_hits.load(Ordering::SeqCst)
    }

    /// `Accept` header of every request served, in arrival order.
    pub fn accept_headers(&self) -> Vec<String> {
        self.accept_headers.lock().unwrap().clone()
    }

    /// The LRDD template advertised in [`HostMetaMode::Lrdd`].
    pub fn lrdd_template(&self) -> String {
        format!("http://{}/lrdd?resource={{uri}}", self.host)
    }

    /// `acct:{name}@{host}`.
    pub fn account(&self, name: &str) -> String {
        format!("acct:{name}@{}", self.host)
    }

    fn record(&self, headers: &HeaderMap) {
        let accept = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        self.accept_headers.lock().unwrap().push(accept);
    }
}

/// Start an ephemeral in-process host and return its shared state.
///
/// The host runs in a background `tokio` task bound to an OS-assigned port on
/// `127.0.0.1`; [`HostState::host`] holds the resulting `127.0.0.1:PORT`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_host(mode: HostMetaMode) -> Arc<HostState> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");

    let state = Arc::new(HostState::new(addr.to_string(), mode));
    let router = Router::new()
        .route("/.well-known/host-meta", get(host_meta))
        .route("/lrdd", get(lrdd))
        .with_state(Arc::clone(&state));

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("fixture host error");
    });

    state
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn xrd_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, XRD_CONTENT_TYPE)], body).into_response()
}

async fn host_meta(State(state): State<Arc<HostState>>, headers: HeaderMap) -> Response {
    state.host_meta_hits.fetch_add(1, Ordering::SeqCst);
    state.record(&headers);

    match state.mode {
        HostMetaMode::Lrdd => {
            let mut host_meta = HostMeta::default();
            host_meta.add_lrdd_xrd(state.lrdd_template());
            xrd_response(host_meta.to_xml())
        }
        HostMetaMode::Missing => StatusCode::NOT_FOUND.into_response(),
        HostMetaMode::Malformed => "<html><body>not here</body>".into_response(),
    }
}

async fn lrdd(
    State(state): State<Arc<HostState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.lrdd_hits.fetch_add(1, Ordering::SeqCst);
    state.record(&headers);

    let Some(resource) = params.get("resource") else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Some(name) = ACCOUNTS
        .iter()
        .find(|name| state.account(name) == *resource)
    else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let profile = format!("http://{}/@{name}", state.host);
    let mut webfinger = WebFinger::new(resource.as_str());
    webfinger.add_alias(profile.as_str());
    webfinger.add_link(LinkElement::new_href(REL_PROFILE_PAGE, profile).with_type("text/html"));
    xrd_response(webfinger.to_xml())
}
