//! A scripted stand-in for Kibana's HTTP surface.
//!
//! Runs an axum server on its own thread so the blocking client under test
//! can drive it from the test thread.

use std::collections::VecDeque;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::{any, post, put};
use axum::Router;

/// How the mock answers
#[derive(Debug, Clone)]
pub struct Script {
    /// Statuses for successive probes on `/`. The last one repeats.
    pub probe_statuses: Vec<u16>,
    pub enable_status: u16,
    pub enable_body: String,
    /// Held before answering the enable call
    pub enable_delay: Duration,
    pub install_status: u16,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            probe_statuses: vec![302],
            enable_status: 200,
            enable_body: r#"{"acknowledged":true}"#.to_string(),
            enable_delay: Duration::ZERO,
            install_status: 200,
        }
    }
}

/// Headers seen on one API call
#[derive(Debug, Clone, Default)]
pub struct SeenHeaders {
    pub authorization: Option<String>,
    pub kbn_xsrf: Option<String>,
    pub kbn_version: Option<String>,
    pub content_type: Option<String>,
}

impl SeenHeaders {
    fn from_map(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            authorization: get("authorization"),
            kbn_xsrf: get("kbn-xsrf"),
            kbn_version: get("kbn-version"),
            content_type: get("content-type"),
        }
    }
}

struct MockState {
    script: Script,
    pending_probes: Mutex<VecDeque<u16>>,
    probes: AtomicUsize,
    probe_auth: Mutex<Vec<Option<String>>>,
    enables: AtomicUsize,
    installs: AtomicUsize,
    enable_headers: Mutex<Option<SeenHeaders>>,
    install_headers: Mutex<Option<SeenHeaders>>,
}

pub struct MockKibana {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockKibana {
    pub fn start(script: Script) -> Self {
        let state = Arc::new(MockState {
            pending_probes: Mutex::new(script.probe_statuses.iter().copied().collect()),
            script,
            probes: AtomicUsize::new(0),
            probe_auth: Mutex::new(Vec::new()),
            enables: AtomicUsize::new(0),
            installs: AtomicUsize::new(0),
            enable_headers: Mutex::new(None),
            install_headers: Mutex::new(None),
        });

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock kibana");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let addr = listener.local_addr().expect("local addr");

        let app = Router::new()
            .route("/", any(probe))
            .route("/api/detection_engine/index", post(enable))
            .route("/api/detection_engine/rules/prepackaged", put(install))
            .with_state(state.clone());

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app).await.expect("mock kibana serve");
            });
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn probes(&self) -> usize {
        self.state.probes.load(Ordering::SeqCst)
    }

    pub fn enables(&self) -> usize {
        self.state.enables.load(Ordering::SeqCst)
    }

    pub fn installs(&self) -> usize {
        self.state.installs.load(Ordering::SeqCst)
    }

    pub fn probe_auth(&self) -> Vec<Option<String>> {
        self.state.probe_auth.lock().unwrap().clone()
    }

    pub fn enable_headers(&self) -> Option<SeenHeaders> {
        self.state.enable_headers.lock().unwrap().clone()
    }

    pub fn install_headers(&self) -> Option<SeenHeaders> {
        self.state.install_headers.lock().unwrap().clone()
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn probe(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.probes.fetch_add(1, Ordering::SeqCst);
    state
        .probe_auth
        .lock()
        .unwrap()
        .push(SeenHeaders::from_map(&headers).authorization);

    let code = {
        let mut pending = state.pending_probes.lock().unwrap();
        if pending.len() > 1 {
            pending.pop_front().unwrap_or(302)
        } else {
            pending.front().copied().unwrap_or(302)
        }
    };

    let mut builder = Response::builder().status(status(code));
    if code == 302 {
        builder = builder.header(header::LOCATION, "/spaces/enter");
    }
    builder.body(Body::empty()).unwrap()
}

async fn enable(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.enables.fetch_add(1, Ordering::SeqCst);
    *state.enable_headers.lock().unwrap() = Some(SeenHeaders::from_map(&headers));
    if !state.script.enable_delay.is_zero() {
        tokio::time::sleep(state.script.enable_delay).await;
    }

    Response::builder()
        .status(status(state.script.enable_status))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(state.script.enable_body.clone()))
        .unwrap()
}

async fn install(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.installs.fetch_add(1, Ordering::SeqCst);
    *state.install_headers.lock().unwrap() = Some(SeenHeaders::from_map(&headers));

    Response::builder()
        .status(status(state.script.install_status))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"rules_installed":0,"rules_updated":0}"#))
        .unwrap()
}
