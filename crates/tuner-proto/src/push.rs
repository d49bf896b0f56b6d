//! Push subscription on `ws/config`.
//!
//! Each text or binary frame is a config document and is forwarded to the
//! reconciliation loop as a push snapshot.  A dropped connection is retried
//! with exponential backoff; after `max_attempts` consecutive failures the
//! task reports `Unavailable` and exits, leaving the client pull-only.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Url;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::sync::{PushStatus, Source, SyncEvent};
use crate::wire;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const DEFAULT_MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for PushPolicy {
    fn default() -> Self {
        Self::with_max_attempts(DEFAULT_MAX_ATTEMPTS)
    }
}

impl PushPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }

    /// `initial_backoff * 2^(attempt-1)`, capped at `max_backoff`.
    pub fn compute_backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let multiplier = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(multiplier)
            .min(self.max_backoff)
    }
}

pub fn spawn_push(
    url: Url,
    events: mpsc::Sender<SyncEvent>,
    policy: PushPolicy,
) -> JoinHandle<()> {
    tokio::spawn(run_push_task(url, events, policy))
}

async fn run_push_task(url: Url, events: mpsc::Sender<SyncEvent>, policy: PushPolicy) {
    let mut attempt: u32 = 0;
    loop {
        let status = if attempt == 0 {
            PushStatus::Connecting
        } else {
            PushStatus::Reconnecting { attempt }
        };
        if !report(&events, status).await {
            break;
        }

        match connect_ws(&url).await {
            Ok(stream) => {
                info!("push: connected to {}", url);
                if !report(&events, PushStatus::Connected).await {
                    break;
                }
                attempt = 0; // reset on success
                if !run_read_loop(stream, &events).await {
                    break;
                }
            }
            Err(err) => {
                warn!("push: connect to {} failed: {}", url, err);
            }
        }

        attempt += 1;
        if attempt > policy.max_attempts {
            error!(
                "push: giving up after {} reconnect attempts, continuing pull-only",
                policy.max_attempts
            );
            report(&events, PushStatus::Unavailable).await;
            break;
        }

        let backoff = policy.compute_backoff(attempt);
        warn!(
            "push: retrying in {:?} (attempt {}/{})",
            backoff, attempt, policy.max_attempts
        );
        tokio::time::sleep(backoff).await;

        if events.is_closed() {
            break;
        }
    }
    debug!("push task exiting");
}

/// Returns `false` once the reconciliation loop is gone.
async fn report(events: &mpsc::Sender<SyncEvent>, status: PushStatus) -> bool {
    events.send(SyncEvent::Push(status)).await.is_ok()
}

async fn connect_ws(url: &Url) -> Result<WsStream> {
    let (stream, _response) = connect_async(url.as_str()).await?;
    Ok(stream)
}

/// Read frames until the connection drops.
///
/// Returns `true` if the caller should reconnect, `false` if the event
/// receiver is closed.
async fn run_read_loop(stream: WsStream, events: &mpsc::Sender<SyncEvent>) -> bool {
    let (_sink, mut stream) = stream.split();
    loop {
        let payload = match stream.next().await {
            Some(Ok(WsMessage::Text(text))) => text.as_str().as_bytes().to_vec(),
            Some(Ok(WsMessage::Binary(data))) => data.to_vec(),
            Some(Ok(WsMessage::Close(_))) => {
                debug!("push: received Close frame");
                return true;
            }
            Some(Ok(_)) => continue, // ping/pong, answered by tungstenite
            Some(Err(err)) => {
                warn!("push: read error: {}", err);
                return true;
            }
            None => {
                debug!("push: stream ended");
                return true;
            }
        };

        match wire::decode_config(&payload) {
            Ok(snapshot) => {
                let event = SyncEvent::Snapshot {
                    source: Source::Push,
                    snapshot,
                };
                if events.send(event).await.is_err() {
                    return false;
                }
            }
            Err(err) => warn!("push: dropping undecodable frame: {}", err),
        }
    }
}
