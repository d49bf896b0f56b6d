//! Headless mode: no terminal, every reconcile pass is logged.

use tracing::{info, warn};
use tuner_proto::model::OFF;
use tuner_proto::sync::{PushStatus, Render, SyncController, SyncEvent, SyncState};
use tuner_proto::view::ViewReconciler;

pub struct HeadlessLog {
    reconciler: ViewReconciler,
    push: Option<PushStatus>,
}

impl HeadlessLog {
    pub fn new() -> Self {
        Self {
            reconciler: ViewReconciler::new(),
            push: None,
        }
    }

    /// One line per receiver: `Kitchen (vol 500) → Lounge · Jazz`.
    pub fn summary(&self) -> Vec<String> {
        self.reconciler
            .view()
            .receivers
            .iter()
            .map(|row| {
                let target = if row.server_id == OFF {
                    OFF.to_string()
                } else {
                    format!("{} · {}", row.server_label, row.radio_label)
                };
                format!("{} (vol {}) → {}", row.name, row.volume, target)
            })
            .collect()
    }
}

impl Render for HeadlessLog {
    fn render(&mut self, state: &SyncState) {
        let status = state.push_status();
        if self.push != Some(status) {
            info!("push link: {}", status);
            self.push = Some(status);
        }
        if let Some(err) = state.pull_error() {
            warn!("last pull failed: {}", err);
        }

        self.reconciler.render(state);
        let view = self.reconciler.view();
        info!(
            "view #{}: {} receivers, {} servers, {} radios",
            self.reconciler.passes(),
            view.receivers.len(),
            view.servers.len(),
            view.radios.len()
        );
        for line in self.summary() {
            info!("  {}", line);
        }
    }
}

pub async fn run(mut controller: SyncController) -> anyhow::Result<()> {
    controller.start();

    let shutdown = controller.sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown.send(SyncEvent::Shutdown).await;
        }
    });

    controller.run(&mut HeadlessLog::new()).await;
    info!("headless run finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuner_proto::model::{Radio, Receiver, Server, Snapshot, Topology, TuningState};

    #[test]
    fn test_summary_lines() {
        let mut topo = Topology::default();
        let sid = topo.insert_server(Server::new("Lounge", "h1", 80));
        let rid = topo.insert_radio(Radio::new("Jazz", "http://x"));
        let kitchen = topo.insert_receiver(Receiver::new("Kitchen"));
        topo.insert_receiver(Receiver::new("Bath"));
        let mut tuning = TuningState::default();
        tuning.tune_receiver(kitchen, sid.clone());
        tuning.tune_server(sid, rid);

        let mut state = SyncState::new(PushStatus::Disabled);
        state.apply(Snapshot {
            topology: Some(topo),
            tuning: Some(tuning),
        });
        let mut log = HeadlessLog::new();
        log.render(&state);
        assert_eq!(
            log.summary(),
            vec![
                "Bath (vol 0) → off".to_string(),
                "Kitchen (vol 0) → Lounge · Jazz".to_string(),
            ]
        );
    }
}
