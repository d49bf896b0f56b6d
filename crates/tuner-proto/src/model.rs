//! Mirrored state: the topology (what exists) and the tuning state (what is
//! selected).  Both are replaced wholesale by the reducer; nothing here is
//! ever patched in place by a snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity;

/// Id meaning "no server" / "no radio".
pub const OFF: &str = "off";

/// Receiver volume range accepted by the relay server.
pub const VOLUME_MIN: i32 = 0;
pub const VOLUME_MAX: i32 = 1000;

/// Entities keyed by their identity-resolver id.  `BTreeMap` keeps key order
/// deterministic, which the view relies on for tie-breaking.
pub type EntityMap<T> = BTreeMap<String, T>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Radio {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uri: String,
}

impl Radio {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }

    /// Display value returned by the resolver when no radio is active.
    pub fn off() -> Self {
        Self::new(OFF, OFF)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Server {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub name: String,
    /// Spawned by the relay on demand; hidden from receiver-facing choices.
    #[serde(default)]
    pub internal: bool,
}

impl Server {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            name: name.into(),
            internal: false,
        }
    }

    pub fn off() -> Self {
        Self {
            host: OFF.to_string(),
            port: 0,
            name: OFF.to_string(),
            internal: false,
        }
    }

    /// Name when set, host otherwise.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.host
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Receiver {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub volume: i32,
}

impl Receiver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.host
        } else {
            &self.name
        }
    }
}

/// Clamp a volume into the range the relay accepts.
pub fn clamp_volume(volume: i64) -> i32 {
    volume.clamp(VOLUME_MIN as i64, VOLUME_MAX as i64) as i32
}

/// Server-reported inventory of radios, servers and receivers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Topology {
    pub radios: EntityMap<Radio>,
    pub servers: EntityMap<Server>,
    pub receivers: EntityMap<Receiver>,
    /// Statically configured servers that never announce themselves.
    pub static_servers: EntityMap<Server>,
}

impl Topology {
    pub fn is_empty(&self) -> bool {
        self.radios.is_empty()
            && self.servers.is_empty()
            && self.receivers.is_empty()
            && self.static_servers.is_empty()
    }

    /// Look up a server among both the discovered and the static servers.
    pub fn server(&self, id: &str) -> Option<&Server> {
        self.servers.get(id).or_else(|| self.static_servers.get(id))
    }

    pub fn radio(&self, id: &str) -> Option<&Radio> {
        self.radios.get(id)
    }

    pub fn receiver(&self, id: &str) -> Option<&Receiver> {
        self.receivers.get(id)
    }

    pub fn insert_radio(&mut self, radio: Radio) -> String {
        let id = identity::radio_id(&radio);
        self.radios.insert(id.clone(), radio);
        id
    }

    pub fn insert_server(&mut self, server: Server) -> String {
        let id = identity::server_id(&server);
        self.servers.insert(id.clone(), server);
        id
    }

    pub fn insert_static_server(&mut self, server: Server) -> String {
        let id = identity::server_id(&server);
        self.static_servers.insert(id.clone(), server);
        id
    }

    pub fn insert_receiver(&mut self, receiver: Receiver) -> String {
        let id = identity::receiver_id(&receiver);
        self.receivers.insert(id.clone(), receiver);
        id
    }
}

/// Server-reported selections.  Values may name ids that are missing from
/// the current topology; the resolver treats those as [`OFF`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TuningState {
    /// receiver id → server id (or `off`)
    pub receivers: BTreeMap<String, String>,
    /// server id → radio id (or `off`)
    pub servers: BTreeMap<String, String>,
}

impl TuningState {
    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty() && self.servers.is_empty()
    }

    pub fn tune_receiver(&mut self, receiver_id: impl Into<String>, server_id: impl Into<String>) {
        self.receivers.insert(receiver_id.into(), server_id.into());
    }

    pub fn tune_server(&mut self, server_id: impl Into<String>, radio_id: impl Into<String>) {
        self.servers.insert(server_id.into(), radio_id.into());
    }
}

/// One update from either channel.  Each aggregate is optional: a push may
/// carry only tuning, a pull usually carries both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub topology: Option<Topology>,
    pub tuning: Option<TuningState>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.topology.is_none() && self.tuning.is_none()
    }

    pub fn with_topology(topology: Topology) -> Self {
        Self {
            topology: Some(topology),
            tuning: None,
        }
    }

    pub fn with_tuning(tuning: TuningState) -> Self {
        Self {
            topology: None,
            tuning: Some(tuning),
        }
    }
}
