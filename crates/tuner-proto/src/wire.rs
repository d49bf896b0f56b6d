//! Ingestion boundary: JSON from the relay (pull responses and push frames)
//! into typed [`Snapshot`]s.
//!
//! The relay has served two shapes over time:
//!
//! - tuning form: `{"Receivers": {rid: sid}, "Servers": {sid: radio_id}}`,
//!   with the topology either under `Backends` or at `api/backends`;
//! - entity form: full records under `Radios`/`Servers`/`Receivers`, where
//!   `Receiver.ServerId` and `Server.RadioId` carry the tuning.
//!
//! Every entity is re-keyed with [`crate::identity`] regardless of the key it
//! arrived under.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::model::{clamp_volume, Radio, Receiver, Server, Snapshot, Topology, TuningState};

/// Decode a config document (pull `api/config` or a push frame).
pub fn decode_config(bytes: &[u8]) -> Result<Snapshot> {
    let message: ConfigMessage = serde_json::from_slice(bytes)?;
    Ok(message.into_snapshot())
}

/// Decode an `api/backends` document.
pub fn decode_backends(bytes: &[u8]) -> Result<Topology> {
    let message: BackendsMessage = serde_json::from_slice(bytes)?;
    Ok(message.into_topology())
}

/// A section that is either a map or a list of records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entries<T> {
    Map(BTreeMap<String, T>),
    List(Vec<T>),
}

impl<T> Entries<T> {
    fn into_records(self) -> Vec<T> {
        match self {
            Entries::Map(map) => map.into_values().collect(),
            Entries::List(list) => list,
        }
    }
}

/// `Receivers`/`Servers` in a config document: a plain id→id map (tuning
/// form) or full records (entity form).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Section<T> {
    Tuning(BTreeMap<String, Option<String>>),
    Entities(Entries<T>),
}

impl<T> Section<T> {
    fn is_entities(&self) -> bool {
        matches!(self, Section::Entities(_))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ServerRecord {
    host: String,
    port: u16,
    name: String,
    internal: bool,
    radio_id: String,
}

impl ServerRecord {
    fn server(&self) -> Server {
        Server {
            host: self.host.clone(),
            port: self.port,
            name: self.name.clone(),
            internal: self.internal,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ReceiverFields {
    name: String,
    host: String,
    volume: i64,
    server_id: String,
}

/// Older backends documents list receivers by bare name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReceiverRecord {
    Name(String),
    Full(ReceiverFields),
}

impl ReceiverRecord {
    fn receiver(&self) -> Receiver {
        match self {
            ReceiverRecord::Name(name) => Receiver::new(name.clone()),
            ReceiverRecord::Full(fields) => Receiver {
                name: fields.name.clone(),
                host: fields.host.clone(),
                volume: clamp_volume(fields.volume),
            },
        }
    }

    fn server_id(&self) -> Option<&str> {
        match self {
            ReceiverRecord::Full(fields) if !fields.server_id.is_empty() => {
                Some(&fields.server_id)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct BackendsMessage {
    radios: Option<Entries<Radio>>,
    servers: Option<Entries<ServerRecord>>,
    receivers: Option<Entries<ReceiverRecord>>,
    static_servers: Option<Entries<Server>>,
}

impl BackendsMessage {
    fn into_topology(self) -> Topology {
        let mut topology = Topology::default();
        for radio in self.radios.map(Entries::into_records).unwrap_or_default() {
            topology.insert_radio(radio);
        }
        for record in self.servers.map(Entries::into_records).unwrap_or_default() {
            topology.insert_server(record.server());
        }
        for record in self.receivers.map(Entries::into_records).unwrap_or_default() {
            topology.insert_receiver(record.receiver());
        }
        for server in self
            .static_servers
            .map(Entries::into_records)
            .unwrap_or_default()
        {
            topology.insert_static_server(server);
        }
        topology
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ConfigMessage {
    radios: Option<Entries<Radio>>,
    servers: Option<Section<ServerRecord>>,
    receivers: Option<Section<ReceiverRecord>>,
    static_servers: Option<Entries<Server>>,
    backends: Option<BackendsMessage>,
}

impl ConfigMessage {
    fn is_entity_form(&self) -> bool {
        self.radios.is_some()
            || self.servers.as_ref().is_some_and(Section::is_entities)
            || self.receivers.as_ref().is_some_and(Section::is_entities)
    }

    fn into_snapshot(self) -> Snapshot {
        if self.is_entity_form() {
            return self.entity_snapshot();
        }

        let topology = self.backends.map(BackendsMessage::into_topology);
        let tuning = if self.receivers.is_some() || self.servers.is_some() {
            let mut tuning = TuningState::default();
            if let Some(Section::Tuning(map)) = self.receivers {
                tuning.receivers = present(map);
            }
            if let Some(Section::Tuning(map)) = self.servers {
                tuning.servers = present(map);
            }
            Some(tuning)
        } else {
            None
        };
        Snapshot { topology, tuning }
    }

    fn entity_snapshot(self) -> Snapshot {
        let mut topology = Topology::default();
        let mut tuning = TuningState::default();

        for radio in self.radios.map(Entries::into_records).unwrap_or_default() {
            topology.insert_radio(radio);
        }

        match self.servers {
            Some(Section::Entities(entries)) => {
                for record in entries.into_records() {
                    let id = topology.insert_server(record.server());
                    if !record.radio_id.is_empty() {
                        tuning.tune_server(id, record.radio_id);
                    }
                }
            }
            Some(Section::Tuning(map)) => tuning.servers = present(map),
            None => {}
        }

        match self.receivers {
            Some(Section::Entities(entries)) => {
                for record in entries.into_records() {
                    let id = topology.insert_receiver(record.receiver());
                    if let Some(server_id) = record.server_id() {
                        tuning.tune_receiver(id, server_id);
                    }
                }
            }
            Some(Section::Tuning(map)) => tuning.receivers = present(map),
            None => {}
        }

        let statics = self
            .static_servers
            .or_else(|| self.backends.and_then(|b| b.static_servers));
        for server in statics.map(Entries::into_records).unwrap_or_default() {
            topology.insert_static_server(server);
        }

        Snapshot {
            topology: Some(topology),
            tuning: Some(tuning),
        }
    }
}

/// Drop null and empty selections; both mean "nothing tuned".
fn present(map: BTreeMap<String, Option<String>>) -> BTreeMap<String, String> {
    map.into_iter()
        .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (k, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::radio_id_for_uri;
    use crate::model::OFF;

    #[test]
    fn test_tuning_form_has_no_topology() {
        let json = br#"{"Receivers":{"receiver-Kitchen":"server-h1:80"},"Servers":{"server-h1:80":"radio-abc"}}"#;
        let snap = decode_config(json).unwrap();
        assert!(snap.topology.is_none());
        let tuning = snap.tuning.unwrap();
        assert_eq!(tuning.receivers["receiver-Kitchen"], "server-h1:80");
        assert_eq!(tuning.servers["server-h1:80"], "radio-abc");
    }

    #[test]
    fn test_tuning_form_with_embedded_backends() {
        let json = br#"{
            "Receivers": {"receiver-Kitchen": "off", "receiver-Bath": null},
            "Backends": {
                "Radios": [{"Name": "Jazz", "Uri": "http://x"}],
                "Servers": [{"Host": "h1", "Port": 80, "Name": "Lounge"}],
                "Receivers": ["Kitchen"]
            }
        }"#;
        let snap = decode_config(json).unwrap();
        let topo = snap.topology.unwrap();
        assert!(topo.servers.contains_key("server-h1:80"));
        assert!(topo.receivers.contains_key("receiver-Kitchen"));
        assert!(topo.radios.contains_key(&radio_id_for_uri("http://x")));

        let tuning = snap.tuning.unwrap();
        assert_eq!(tuning.receivers.get("receiver-Kitchen").map(String::as_str), Some(OFF));
        assert!(!tuning.receivers.contains_key("receiver-Bath"));
        assert!(tuning.servers.is_empty());
    }

    #[test]
    fn test_entity_form_yields_both_aggregates() {
        let rid = radio_id_for_uri("http://x");
        let json = format!(
            r#"{{
                "Radios": {{"{rid}": {{"Name": "Jazz", "Uri": "http://x"}}}},
                "Servers": {{"server-h1:80": {{"Host": "h1", "Port": 80, "Name": "Lounge",
                                               "Internal": true, "LastPing": 17, "RadioId": "{rid}"}}}},
                "Receivers": {{"whatever": {{"Name": "Kitchen", "Host": "10.0.0.7",
                                             "Volume": 1500, "ServerId": "server-h1:80"}}}}
            }}"#
        );
        let snap = decode_config(json.as_bytes()).unwrap();
        let topo = snap.topology.unwrap();
        let tuning = snap.tuning.unwrap();

        let kitchen = topo.receiver("receiver-Kitchen").unwrap();
        assert_eq!(kitchen.volume, 1000);
        assert!(topo.server("server-h1:80").unwrap().internal);
        assert_eq!(tuning.receivers["receiver-Kitchen"], "server-h1:80");
        assert_eq!(tuning.servers["server-h1:80"], rid);
    }

    #[test]
    fn test_entity_form_skips_empty_selections() {
        let json = br#"{"Radios": {}, "Receivers": {"r": {"Name": "Kitchen", "ServerId": ""}}}"#;
        let snap = decode_config(json).unwrap();
        assert!(snap.topology.unwrap().receivers.contains_key("receiver-Kitchen"));
        assert!(snap.tuning.unwrap().is_empty());
    }

    #[test]
    fn test_empty_document_carries_nothing() {
        assert!(decode_config(b"{}").unwrap().is_empty());
    }

    #[test]
    fn test_backends_with_static_servers_and_missing_fields() {
        let json = br#"{
            "Servers": {"a": {"Host": "h2"}},
            "StaticServers": [{"Host": "attic", "Port": 5004, "Name": "Attic"}],
            "Radios": [{"Name": "Nameless"}]
        }"#;
        let topo = decode_backends(json).unwrap();
        assert!(topo.servers.contains_key("server-h2:0"));
        assert!(topo.static_servers.contains_key("server-attic:5004"));
        assert!(topo.radios.contains_key(&radio_id_for_uri("")));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(decode_config(b"{\"Receivers\": [").is_err());
        assert!(decode_config(b"[1, 2]").is_err());
    }
}
