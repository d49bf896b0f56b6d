//! Selection resolution: which server a receiver is on, which radio a
//! server plays.
//!
//! Every lookup is total.  Missing entries, explicit `off`, and references
//! to entities absent from the topology all resolve to [`OFF`].  Nothing is
//! cached; each render recomputes from the current stores.

use std::borrow::Cow;

use crate::model::{Radio, Server, Topology, TuningState, OFF};

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    topology: &'a Topology,
    tuning: &'a TuningState,
}

impl<'a> Resolver<'a> {
    pub fn new(topology: &'a Topology, tuning: &'a TuningState) -> Self {
        Self { topology, tuning }
    }

    /// Server the receiver is tuned to, or `off`.  Static servers count as
    /// present; internal ones too.
    pub fn active_server_id(&self, receiver_id: &str) -> &'a str {
        match self.tuning.receivers.get(receiver_id) {
            Some(id) if id != OFF && self.topology.server(id).is_some() => id.as_str(),
            _ => OFF,
        }
    }

    /// Radio the server plays, or `off`.  `off` in yields `off` out without
    /// consulting the tuning state.
    pub fn active_radio_id(&self, server_id: &str) -> &'a str {
        if server_id == OFF {
            return OFF;
        }
        match self.tuning.servers.get(server_id) {
            Some(id) if id != OFF && self.topology.radios.contains_key(id) => id.as_str(),
            _ => OFF,
        }
    }

    /// receiver → server → radio, two single-hop lookups.
    pub fn effective_radio_id(&self, receiver_id: &str) -> &'a str {
        self.active_radio_id(self.active_server_id(receiver_id))
    }

    pub fn active_server(&self, receiver_id: &str) -> Cow<'a, Server> {
        self.topology
            .server(self.active_server_id(receiver_id))
            .map(Cow::Borrowed)
            .unwrap_or_else(|| Cow::Owned(Server::off()))
    }

    pub fn active_radio(&self, server_id: &str) -> Cow<'a, Radio> {
        self.topology
            .radio(self.active_radio_id(server_id))
            .map(Cow::Borrowed)
            .unwrap_or_else(|| Cow::Owned(Radio::off()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Receiver, Server};

    fn scenario_topology() -> Topology {
        let mut topo = Topology::default();
        topo.servers.insert("s1".into(), Server::new("Lounge", "h1", 80));
        topo.radios.insert("r1".into(), Radio::new("Jazz", "http://x"));
        topo.receivers.insert("rec1".into(), Receiver::new("Kitchen"));
        topo
    }

    #[test]
    fn test_resolves_receiver_to_server_to_radio() {
        let topo = scenario_topology();
        let mut tuning = TuningState::default();
        tuning.tune_receiver("rec1", "s1");
        tuning.tune_server("s1", "r1");

        let resolver = Resolver::new(&topo, &tuning);
        assert_eq!(resolver.active_server_id("rec1"), "s1");
        assert_eq!(resolver.active_radio_id("s1"), "r1");
        assert_eq!(resolver.effective_radio_id("rec1"), "r1");
        assert_eq!(resolver.active_server("rec1").label(), "Lounge");
        assert_eq!(resolver.active_radio("s1").name, "Jazz");
    }

    #[test]
    fn test_dangling_server_resolves_off() {
        let topo = scenario_topology();
        let mut tuning = TuningState::default();
        tuning.tune_receiver("rec1", "s-missing");
        tuning.tune_server("s1", "r1");

        let resolver = Resolver::new(&topo, &tuning);
        assert_eq!(resolver.active_server_id("rec1"), OFF);
        assert_eq!(resolver.effective_radio_id("rec1"), OFF);
        assert_eq!(*resolver.active_server("rec1"), Server::off());
    }

    #[test]
    fn test_dangling_radio_resolves_off() {
        let topo = scenario_topology();
        let mut tuning = TuningState::default();
        tuning.tune_server("s1", "r-deleted");
        let resolver = Resolver::new(&topo, &tuning);
        assert_eq!(resolver.active_radio_id("s1"), OFF);
        assert_eq!(*resolver.active_radio("s1"), Radio::off());
    }

    #[test]
    fn test_unknown_ids_and_empty_stores_are_total() {
        let topo = Topology::default();
        let tuning = TuningState::default();
        let resolver = Resolver::new(&topo, &tuning);
        for id in ["", "rec1", "receiver-nobody", OFF] {
            assert_eq!(resolver.active_server_id(id), OFF);
            assert_eq!(resolver.active_radio_id(id), OFF);
        }
    }

    #[test]
    fn test_off_server_short_circuits_radio_lookup() {
        let topo = scenario_topology();
        let mut tuning = TuningState::default();
        // A stray entry keyed by the sentinel must not leak through.
        tuning.tune_server(OFF, "r1");
        let resolver = Resolver::new(&topo, &tuning);
        assert_eq!(resolver.active_radio_id(OFF), OFF);
    }

    #[test]
    fn test_static_and_internal_servers_resolve() {
        let mut topo = scenario_topology();
        let mut hidden = Server::new("spawned", "relay", 48110);
        hidden.internal = true;
        topo.servers.insert("s-int".into(), hidden);
        topo.static_servers.insert("s-static".into(), Server::new("Attic", "attic", 5004));

        let mut tuning = TuningState::default();
        tuning.tune_receiver("rec1", "s-int");
        tuning.tune_receiver("rec2", "s-static");

        let resolver = Resolver::new(&topo, &tuning);
        assert_eq!(resolver.active_server_id("rec1"), "s-int");
        assert_eq!(resolver.active_server_id("rec2"), "s-static");
    }
}
