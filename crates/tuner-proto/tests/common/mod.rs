#![allow(dead_code)]

//! In-process mock relay: serves canned `api/config` / `api/backends`
//! documents, records every request, and optionally pushes frames over
//! `ws/config`.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::Value;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct RelayFixture {
    pub config: Value,
    /// `None` answers `api/backends` with 404.
    pub backends: Option<Value>,
    /// Raw text frames for `ws/config`; `None` leaves it unrouted, so
    /// upgrades fail.
    pub push_frames: Option<Vec<String>>,
    /// Close each push connection once its frames are sent.
    pub close_push: bool,
}

#[derive(Clone)]
struct Shared {
    fixture: RelayFixture,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl Shared {
    fn record(&self, method: Method, uri: &Uri, query: BTreeMap<String, String>, body: &[u8]) {
        let body = serde_json::from_slice(body).ok();
        if let Ok(mut log) = self.log.lock() {
            log.push(Recorded {
                method,
                path: uri.path().to_string(),
                query,
                body,
            });
        }
    }
}

pub struct MockRelay {
    pub base_url: String,
    log: Arc<Mutex<Vec<Recorded>>>,
    server: JoinHandle<()>,
}

impl MockRelay {
    pub async fn start(fixture: RelayFixture) -> Result<Self> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let with_push = fixture.push_frames.is_some();
        let shared = Shared {
            fixture,
            log: log.clone(),
        };

        let mut app = Router::new()
            .route("/api/config", get(config))
            .route("/api/backends", get(backends))
            .route("/api/receiver", any(command))
            .route("/api/server", any(command))
            .route("/api/radio", any(command));
        if with_push {
            app = app.route("/ws/config", get(push));
        }
        let app = app.with_state(shared);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}/"),
            log,
            server,
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }

    /// Requests to the command endpoints, in arrival order.
    pub fn commands(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| !matches!(r.path.as_str(), "/api/config" | "/api/backends"))
            .collect()
    }
}

impl Drop for MockRelay {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn config(State(shared): State<Shared>, method: Method, uri: Uri) -> Json<Value> {
    shared.record(method, &uri, BTreeMap::new(), &[]);
    Json(shared.fixture.config.clone())
}

async fn backends(State(shared): State<Shared>, method: Method, uri: Uri) -> Response {
    shared.record(method, &uri, BTreeMap::new(), &[]);
    match &shared.fixture.backends {
        Some(doc) => Json(doc.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn command(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> StatusCode {
    shared.record(method, &uri, query, &body);
    StatusCode::OK
}

async fn push(State(shared): State<Shared>, ws: WebSocketUpgrade) -> Response {
    let frames = shared.fixture.push_frames.clone().unwrap_or_default();
    let close = shared.fixture.close_push;
    ws.on_upgrade(move |socket| stream_frames(socket, frames, close))
}

async fn stream_frames(mut socket: WebSocket, frames: Vec<String>, close: bool) {
    for frame in frames {
        if socket.send(Message::Text(frame)).await.is_err() {
            return;
        }
    }
    if close {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }
    // Hold the connection open until the client goes away.
    while let Some(Ok(_)) = socket.recv().await {}
}

/// Poll `check` until it passes or `limit` elapses.
pub async fn eventually<F, Fut>(limit: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    bail!("condition not met within {:?}", limit)
}
