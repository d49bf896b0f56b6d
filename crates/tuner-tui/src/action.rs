//! Action enum: all user-initiated intents.

use tuner_proto::command::Command;
use tuner_proto::model::Radio;

/// Unique identifier for a focusable pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Receivers,
    Servers,
    Radios,
}

impl ComponentId {
    pub const ALL: [ComponentId; 3] = [
        ComponentId::Receivers,
        ComponentId::Servers,
        ComponentId::Radios,
    ];
}

/// Which selection a picker edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerTarget {
    ReceiverServer { receiver: String },
    ReceiverRadio { receiver: String },
    ServerRadio { server: String },
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Overlays ─────────────────────────────────────────────────────────────
    OpenPicker(PickerTarget),
    ClosePicker,
    /// `None` creates a radio; `Some(id)` edits that radio.
    OpenRadioForm(Option<String>, Radio),
    CloseRadioForm,
    /// Ask for `y` before sending.
    Confirm(String, Command),
    CancelConfirm,

    // ── Relay ────────────────────────────────────────────────────────────────
    Send(Command),
    Refresh,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
