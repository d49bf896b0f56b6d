//! AppState: read-only data handed to every component.

use chrono::{DateTime, Local};
use tuner_proto::sync::{PushStatus, Render, Source, SyncState};
use tuner_proto::view::{ListView, ViewReconciler};

pub struct AppState {
    reconciler: ViewReconciler,
    pub push: PushStatus,
    pub pull_error: Option<String>,
    pub last_update: Option<(Source, DateTime<Local>)>,
    /// Volume change per key press.
    pub volume_step: i32,
}

impl AppState {
    pub fn new(volume_step: i32) -> Self {
        Self {
            reconciler: ViewReconciler::new(),
            push: PushStatus::Disabled,
            pull_error: None,
            last_update: None,
            volume_step,
        }
    }

    pub fn view(&self) -> &ListView {
        self.reconciler.view()
    }
}

impl Render for AppState {
    fn render(&mut self, state: &SyncState) {
        self.reconciler.render(state);
        self.push = state.push_status();
        self.pull_error = state.pull_error().map(str::to_string);
        self.last_update = state.last_update();
    }
}
