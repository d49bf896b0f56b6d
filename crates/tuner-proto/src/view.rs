//! View reconciliation: project (Topology, TuningState) into sorted rows
//! with active markers.
//!
//! `ViewReconciler::reconcile` throws the previous rows away and rebuilds
//! them from scratch on every call.  Two calls with equal inputs produce
//! equal views.

use crate::model::{EntityMap, Topology, TuningState, OFF};
use crate::resolve::Resolver;

/// How a choice is shown in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Active,
    Inactive,
    /// The `off` entry while something else is selected.
    PowerOff,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: String,
    pub label: String,
    pub marker: Marker,
}

impl Choice {
    fn new(id: &str, label: &str, active_id: &str) -> Self {
        let marker = if id == active_id {
            Marker::Active
        } else if id == OFF {
            Marker::PowerOff
        } else {
            Marker::Inactive
        };
        Self {
            id: id.to_string(),
            label: label.to_string(),
            marker,
        }
    }

    pub fn is_active(&self) -> bool {
        self.marker == Marker::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverRow {
    pub id: String,
    pub name: String,
    pub host: String,
    pub volume: i32,
    pub server_id: String,
    pub server_label: String,
    pub radio_id: String,
    pub radio_label: String,
    /// `off`, then visible servers, then static servers.
    pub servers: Vec<Choice>,
    pub radios: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRow {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub internal: bool,
    pub radio_id: String,
    pub radio_label: String,
    pub radios: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioRow {
    pub id: String,
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListView {
    pub receivers: Vec<ReceiverRow>,
    pub servers: Vec<ServerRow>,
    pub radios: Vec<RadioRow>,
}

impl ListView {
    pub fn receiver(&self, id: &str) -> Option<&ReceiverRow> {
        self.receivers.iter().find(|r| r.id == id)
    }

    pub fn server(&self, id: &str) -> Option<&ServerRow> {
        self.servers.iter().find(|s| s.id == id)
    }

    pub fn radio(&self, id: &str) -> Option<&RadioRow> {
        self.radios.iter().find(|r| r.id == id)
    }
}

/// Entries sorted by case-insensitive label.  The sort is stable over a
/// key-ordered map, so equal labels keep key order.
fn sorted_by_label<'a, T>(
    map: &'a EntityMap<T>,
    label: impl Fn(&T) -> &str,
) -> Vec<(&'a String, &'a T)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_cached_key(|(_, v)| label(v).to_lowercase());
    entries
}

/// Build the full list representation.  Pure.
pub fn build(topology: &Topology, tuning: &TuningState) -> ListView {
    let resolver = Resolver::new(topology, tuning);
    let radios = sorted_by_label(&topology.radios, |r| &r.name);
    let servers = sorted_by_label(&topology.servers, |s| s.label());
    let static_servers = sorted_by_label(&topology.static_servers, |s| s.label());

    let radio_choices = |active: &str| -> Vec<Choice> {
        radios
            .iter()
            .map(|(id, radio)| Choice::new(id, &radio.name, active))
            .collect()
    };

    let receivers = sorted_by_label(&topology.receivers, |r| r.label())
        .into_iter()
        .map(|(id, receiver)| {
            let server_id = resolver.active_server_id(id);
            let radio_id = resolver.active_radio_id(server_id);

            let mut server_choices = vec![Choice::new(OFF, OFF, server_id)];
            server_choices.extend(
                servers
                    .iter()
                    .filter(|(_, s)| !s.internal)
                    .chain(static_servers.iter())
                    .map(|(sid, s)| Choice::new(sid, s.label(), server_id)),
            );

            ReceiverRow {
                id: id.clone(),
                name: receiver.label().to_string(),
                host: receiver.host.clone(),
                volume: receiver.volume,
                server_id: server_id.to_string(),
                server_label: resolver.active_server(id).label().to_string(),
                radio_id: radio_id.to_string(),
                radio_label: resolver.active_radio(server_id).name.clone(),
                servers: server_choices,
                radios: radio_choices(radio_id),
            }
        })
        .collect();

    let server_rows = servers
        .iter()
        .map(|(id, server)| {
            let radio_id = resolver.active_radio_id(id);
            ServerRow {
                id: (*id).clone(),
                name: server.label().to_string(),
                host: server.host.clone(),
                port: server.port,
                internal: server.internal,
                radio_id: radio_id.to_string(),
                radio_label: resolver.active_radio(id).name.clone(),
                radios: radio_choices(radio_id),
            }
        })
        .collect();

    let radio_rows = radios
        .iter()
        .map(|(id, radio)| RadioRow {
            id: (*id).clone(),
            name: radio.name.clone(),
            uri: radio.uri.clone(),
        })
        .collect();

    ListView {
        receivers,
        servers: server_rows,
        radios: radio_rows,
    }
}

/// Holds the rendered rows.  Every reconcile is a full replace.
#[derive(Debug, Default)]
pub struct ViewReconciler {
    view: ListView,
    passes: u64,
}

impl ViewReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconcile(&mut self, topology: &Topology, tuning: &TuningState) {
        self.view = build(topology, tuning);
        self.passes += 1;
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    /// Number of reconcile passes so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}
