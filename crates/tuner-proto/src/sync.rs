//! SyncController: single-owner reconciliation loop for the mirrored state.
//!
//! Producers (the one-shot pull, the poller and the push task) never touch
//! the stores.  They send `SyncEvent`s into one bounded queue, and the loop
//! owning `SyncState` applies them in arrival order.  Every applied snapshot
//! is followed by a render, whatever it carried.
//!
//! A snapshot replaces each aggregate it carries wholesale; an aggregate it
//! does not carry is left alone.  There is no version comparison, so pull and
//! push race and the last arrival wins.
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::model::{Snapshot, Topology, TuningState};
use crate::push::{spawn_push, PushPolicy};
use crate::resolve::Resolver;
use crate::view::ViewReconciler;

const EVENT_QUEUE_CAPACITY: usize = 64;

// ── SyncEvent ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Pull,
    Push,
}

/// Health of the push subscription, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    /// Turned off in config or on the command line.
    Disabled,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    /// Gave up reconnecting; pulls keep working.
    Unavailable,
}

impl fmt::Display for PushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushStatus::Disabled => write!(f, "push off"),
            PushStatus::Connecting => write!(f, "connecting"),
            PushStatus::Connected => write!(f, "live"),
            PushStatus::Reconnecting { attempt } => write!(f, "reconnecting ({attempt})"),
            PushStatus::Unavailable => write!(f, "pull only"),
        }
    }
}

/// All inputs into the reconciliation loop.
#[derive(Debug)]
pub enum SyncEvent {
    Snapshot { source: Source, snapshot: Snapshot },
    /// A pull failed at the transport or decode level.
    PullFailed(String),
    Push(PushStatus),
    /// Pull now (user request or poller tick).
    Refresh,
    Shutdown,
}

/// What the loop should do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Render,
    Pull,
    Shutdown,
}

// ── SyncState ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SyncState {
    topology: Topology,
    tuning: TuningState,
    push: PushStatus,
    pull_error: Option<String>,
    last_update: Option<(Source, DateTime<Local>)>,
    revision: u64,
}

impl SyncState {
    pub fn new(push: PushStatus) -> Self {
        Self {
            topology: Topology::default(),
            tuning: TuningState::default(),
            push,
            pull_error: None,
            last_update: None,
            revision: 0,
        }
    }

    /// Replace whichever aggregates the snapshot carries.
    pub fn apply(&mut self, snapshot: Snapshot) {
        if let Some(topology) = snapshot.topology {
            self.topology = topology;
        }
        if let Some(tuning) = snapshot.tuning {
            self.tuning = tuning;
        }
        self.revision += 1;
    }

    pub fn handle(&mut self, event: SyncEvent) -> Step {
        match event {
            SyncEvent::Snapshot { source, snapshot } => {
                debug!(
                    "snapshot from {:?}: topology={} tuning={}",
                    source,
                    snapshot.topology.is_some(),
                    snapshot.tuning.is_some()
                );
                if source == Source::Pull {
                    self.pull_error = None;
                }
                self.apply(snapshot);
                self.last_update = Some((source, Local::now()));
                Step::Render
            }
            SyncEvent::PullFailed(error) => {
                self.pull_error = Some(error);
                Step::Render
            }
            SyncEvent::Push(status) => {
                if status != self.push {
                    info!("push: {}", status);
                }
                self.push = status;
                Step::Render
            }
            SyncEvent::Refresh => Step::Pull,
            SyncEvent::Shutdown => Step::Shutdown,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn tuning(&self) -> &TuningState {
        &self.tuning
    }

    pub fn push_status(&self) -> PushStatus {
        self.push
    }

    pub fn pull_error(&self) -> Option<&str> {
        self.pull_error.as_deref()
    }

    pub fn last_update(&self) -> Option<(Source, DateTime<Local>)> {
        self.last_update
    }

    /// Snapshots applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.topology, &self.tuning)
    }
}

// ── Render ────────────────────────────────────────────────────────────────────

/// Anything that redraws from the current state.
pub trait Render {
    fn render(&mut self, state: &SyncState);
}

impl Render for ViewReconciler {
    fn render(&mut self, state: &SyncState) {
        self.reconcile(state.topology(), state.tuning());
    }
}

// ── SyncController ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SyncSettings {
    /// `None` disables scheduled pulls.
    pub poll_interval: Option<Duration>,
    /// `None` disables the push subscription.
    pub push: Option<PushPolicy>,
}

pub struct SyncController {
    state: SyncState,
    client: ApiClient,
    settings: SyncSettings,
    tx: mpsc::Sender<SyncEvent>,
    rx: mpsc::Receiver<SyncEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncController {
    pub fn new(client: ApiClient, settings: SyncSettings) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let push = if settings.push.is_some() {
            PushStatus::Connecting
        } else {
            PushStatus::Disabled
        };
        Self {
            state: SyncState::new(push),
            client,
            settings,
            tx,
            rx,
            tasks: Vec::new(),
        }
    }

    /// Kick off the initial pull, the poller and the push subscription.
    /// None of them is awaited; whichever lands first populates the stores.
    /// A push url that cannot be built leaves the client pull-only.
    pub fn start(&mut self) {
        self.request_pull();

        if let Some(period) = self.settings.poll_interval {
            info!("polling every {:?}", period);
            self.tasks.push(spawn_poller(period, self.tx.clone()));
        }

        if let Some(policy) = self.settings.push.clone() {
            match self.client.push_url() {
                Ok(url) => {
                    info!("subscribing to {}", url);
                    self.tasks.push(spawn_push(url, self.tx.clone(), policy));
                }
                Err(e) => {
                    warn!("push unavailable, continuing pull-only: {}", e);
                    self.state.handle(SyncEvent::Push(PushStatus::Unavailable));
                }
            }
        }
    }

    /// Handle for producers outside the controller (UI refresh, shutdown).
    pub fn sender(&self) -> mpsc::Sender<SyncEvent> {
        self.tx.clone()
    }

    pub fn request_pull(&self) {
        spawn_pull(self.client.clone(), self.tx.clone());
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Wait for the next event that needs a render (or shutdown).  Pull
    /// requests are served internally.  Cancel-safe: an event is either
    /// still queued or fully applied.
    pub async fn next(&mut self) -> Step {
        loop {
            let Some(event) = self.rx.recv().await else {
                return Step::Shutdown;
            };
            match self.state.handle(event) {
                Step::Pull => self.request_pull(),
                step => return step,
            }
        }
    }

    /// Drive `renderer` until a shutdown event.
    pub async fn run<R: Render>(&mut self, renderer: &mut R) {
        renderer.render(&self.state);
        while self.next().await == Step::Render {
            renderer.render(&self.state);
        }
        debug!("sync loop exiting");
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// One pull, reported back as an event.
pub fn spawn_pull(client: ApiClient, tx: mpsc::Sender<SyncEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let event = match client.pull().await {
            Ok(snapshot) => SyncEvent::Snapshot {
                source: Source::Pull,
                snapshot,
            },
            Err(e) => {
                warn!("pull failed: {}", e);
                SyncEvent::PullFailed(e.to_string())
            }
        };
        let _ = tx.send(event).await;
    })
}

/// Ask for a pull every `period`, starting one period from now.
pub fn spawn_poller(period: Duration, tx: mpsc::Sender<SyncEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval.tick().await; // consume the immediate first tick
        loop {
            interval.tick().await;
            if tx.send(SyncEvent::Refresh).await.is_err() {
                break;
            }
        }
    })
}
