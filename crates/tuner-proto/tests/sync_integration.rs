mod common;

use std::time::Duration;

use axum::http::Method;
use common::{eventually, MockRelay, RelayFixture};
use serde_json::json;
use tokio::time::timeout;
use tuner_proto::client::ApiClient;
use tuner_proto::command::Command;
use tuner_proto::dispatch::spawn_dispatcher;
use tuner_proto::identity::radio_id_for_uri;
use tuner_proto::model::{Radio, OFF};
use tuner_proto::push::PushPolicy;
use tuner_proto::sync::{PushStatus, Source, Step, SyncController, SyncSettings};
use tuner_proto::view::{Marker, ViewReconciler};

const LIMIT: Duration = Duration::from_secs(5);

fn backends_doc() -> serde_json::Value {
    json!({
        "Radios": [
            {"Name": "Jazz", "Uri": "http://jazz"},
            {"Name": "blues", "Uri": "http://blues"}
        ],
        "Servers": [{"Host": "h1", "Port": 80, "Name": "Lounge"}],
        "Receivers": ["Kitchen"]
    })
}

fn tuning_doc(server: &str, radio_uri: &str) -> serde_json::Value {
    json!({
        "Receivers": {"receiver-Kitchen": server},
        "Servers": {"server-h1:80": radio_id_for_uri(radio_uri)}
    })
}

fn client(relay: &MockRelay) -> ApiClient {
    ApiClient::new(&relay.base_url, Duration::from_secs(2)).unwrap()
}

fn quick_push(max_attempts: u32) -> PushPolicy {
    PushPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(20),
    }
}

#[tokio::test]
async fn test_pull_merges_config_and_backends() {
    let relay = MockRelay::start(RelayFixture {
        config: tuning_doc("server-h1:80", "http://jazz"),
        backends: Some(backends_doc()),
        push_frames: None,
        close_push: false,
    })
    .await
    .unwrap();

    let mut controller = SyncController::new(client(&relay), SyncSettings::default());
    controller.start();
    assert_eq!(timeout(LIMIT, controller.next()).await.unwrap(), Step::Render);

    let state = controller.state();
    assert_eq!(state.push_status(), PushStatus::Disabled);
    assert_eq!(
        state.resolver().effective_radio_id("receiver-Kitchen"),
        radio_id_for_uri("http://jazz")
    );

    let mut reconciler = ViewReconciler::new();
    reconciler.reconcile(state.topology(), state.tuning());
    let kitchen = reconciler.view().receiver("receiver-Kitchen").unwrap();
    assert_eq!(kitchen.server_label, "Lounge");
    assert_eq!(kitchen.radio_label, "Jazz");
    let radios: Vec<_> = kitchen.radios.iter().map(|c| (c.label.as_str(), c.marker)).collect();
    assert_eq!(radios, vec![("blues", Marker::Inactive), ("Jazz", Marker::Active)]);

    assert_eq!(relay.hits("/api/backends"), 1);
}

#[tokio::test]
async fn test_entity_form_config_skips_backends() {
    let jazz = radio_id_for_uri("http://jazz");
    let relay = MockRelay::start(RelayFixture {
        config: json!({
            "Radios": [{"Name": "Jazz", "Uri": "http://jazz"}],
            "Servers": {"x": {"Host": "h1", "Port": 80, "Name": "Lounge", "RadioId": jazz}},
            "Receivers": {"y": {"Name": "Kitchen", "Volume": 300, "ServerId": "server-h1:80"}}
        }),
        backends: None,
        push_frames: None,
        close_push: false,
    })
    .await
    .unwrap();

    let mut controller = SyncController::new(client(&relay), SyncSettings::default());
    controller.start();
    timeout(LIMIT, controller.next()).await.unwrap();

    let state = controller.state();
    assert_eq!(state.resolver().effective_radio_id("receiver-Kitchen"), jazz);
    assert_eq!(state.topology().receiver("receiver-Kitchen").unwrap().volume, 300);
    assert_eq!(relay.hits("/api/backends"), 0);
}

#[tokio::test]
async fn test_missing_backends_keeps_tuning() {
    let relay = MockRelay::start(RelayFixture {
        config: tuning_doc(OFF, "http://jazz"),
        backends: None,
        push_frames: None,
        close_push: false,
    })
    .await
    .unwrap();

    let mut controller = SyncController::new(client(&relay), SyncSettings::default());
    controller.start();
    timeout(LIMIT, controller.next()).await.unwrap();

    let state = controller.state();
    assert!(state.pull_error().is_none());
    assert!(state.topology().is_empty());
    assert_eq!(state.tuning().receivers["receiver-Kitchen"], OFF);
}

#[tokio::test]
async fn test_commands_reach_the_relay() {
    let relay = MockRelay::start(RelayFixture::default()).await.unwrap();
    let (sender, _dispatcher) = spawn_dispatcher(client(&relay));

    sender.send(Command::TuneReceiverServer {
        receiver: "receiver-Kitchen".into(),
        server: OFF.into(),
    });
    sender.send(Command::set_volume("receiver-Kitchen", 4000));
    sender.send(Command::SaveRadio {
        id: None,
        radio: Radio::new("Jazz", "http://jazz"),
    });
    sender.send(Command::DeleteRadio { id: "radio-1".into() });

    let relay_ref = &relay;
    eventually(LIMIT, || async move { relay_ref.commands().len() == 4 })
        .await
        .unwrap();
    let sent = relay.commands();

    assert_eq!(sent[0].method, Method::GET);
    assert_eq!(sent[0].path, "/api/receiver");
    assert_eq!(sent[0].query["id"], "receiver-Kitchen");
    assert_eq!(sent[0].query["server"], "off");

    assert_eq!(sent[1].query["volume"], "1000");

    assert_eq!(sent[2].method, Method::POST);
    assert_eq!(sent[2].path, "/api/radio");
    assert_eq!(sent[2].query["id"], "");
    assert_eq!(sent[2].body, Some(json!({"Name": "Jazz", "Uri": "http://jazz"})));

    assert_eq!(sent[3].method, Method::DELETE);
    assert_eq!(sent[3].query["id"], "radio-1");
}

#[tokio::test]
async fn test_push_frames_reach_the_controller() {
    // The pull carries only topology, so the tuning can only come from push.
    let relay = MockRelay::start(RelayFixture {
        config: json!({}),
        backends: Some(backends_doc()),
        push_frames: Some(vec![tuning_doc("server-h1:80", "http://blues").to_string()]),
        close_push: false,
    })
    .await
    .unwrap();

    let settings = SyncSettings {
        poll_interval: None,
        push: Some(quick_push(3)),
    };
    let mut controller = SyncController::new(client(&relay), settings);
    controller.start();

    let blues = radio_id_for_uri("http://blues");
    timeout(LIMIT, async {
        loop {
            let state = controller.state();
            if !state.topology().is_empty()
                && state.resolver().effective_radio_id("receiver-Kitchen") == blues
            {
                break;
            }
            controller.next().await;
        }
    })
    .await
    .unwrap();

    let state = controller.state();
    assert_eq!(state.push_status(), PushStatus::Connected);
    assert!(state.last_update().is_some());
}

#[tokio::test]
async fn test_push_drops_bad_frames_and_reconnects_after_close() {
    let relay = MockRelay::start(RelayFixture {
        config: json!({}),
        backends: None,
        push_frames: Some(vec![
            "not json".to_string(),
            tuning_doc("server-h1:80", "http://blues").to_string(),
        ]),
        close_push: true,
    })
    .await
    .unwrap();

    let settings = SyncSettings {
        poll_interval: None,
        push: Some(quick_push(5)),
    };
    let mut controller = SyncController::new(client(&relay), settings);
    controller.start();

    let mut statuses = vec![controller.state().push_status()];
    timeout(LIMIT, async {
        loop {
            controller.next().await;
            let status = controller.state().push_status();
            if statuses.last() != Some(&status) {
                statuses.push(status);
            }
            let tuning = controller.state().tuning();
            let tuned = tuning.receivers.get("receiver-Kitchen").map(String::as_str)
                == Some("server-h1:80");
            if tuned && statuses.len() >= 3 {
                break;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(
        statuses[..3],
        [
            PushStatus::Connecting,
            PushStatus::Connected,
            PushStatus::Reconnecting { attempt: 1 },
        ]
    );
    let state = controller.state();
    assert_eq!(
        state.tuning().servers.get("server-h1:80").map(String::as_str),
        Some(radio_id_for_uri("http://blues").as_str())
    );
    assert!(matches!(state.last_update(), Some((Source::Push, _))));
}

#[tokio::test]
async fn test_poller_pulls_without_being_asked() {
    let relay = MockRelay::start(RelayFixture {
        config: tuning_doc("server-h1:80", "http://jazz"),
        backends: Some(backends_doc()),
        push_frames: None,
        close_push: false,
    })
    .await
    .unwrap();

    let settings = SyncSettings {
        poll_interval: Some(Duration::from_millis(50)),
        push: None,
    };
    let mut controller = SyncController::new(client(&relay), settings);
    controller.start();

    timeout(LIMIT, async {
        while controller.state().revision() < 3 {
            controller.next().await;
        }
    })
    .await
    .unwrap();

    assert!(relay.hits("/api/config") >= 3);
    assert!(controller.state().pull_error().is_none());
}

#[tokio::test]
async fn test_dead_push_endpoint_degrades_to_pull_only() {
    let relay = MockRelay::start(RelayFixture {
        config: tuning_doc("server-h1:80", "http://jazz"),
        backends: Some(backends_doc()),
        push_frames: None,
        close_push: false,
    })
    .await
    .unwrap();

    let settings = SyncSettings {
        poll_interval: None,
        push: Some(quick_push(2)),
    };
    let mut controller = SyncController::new(client(&relay), settings);
    controller.start();

    timeout(LIMIT, async {
        while controller.state().push_status() != PushStatus::Unavailable {
            controller.next().await;
        }
    })
    .await
    .unwrap();

    // Pulls are unaffected.
    controller.request_pull();
    timeout(LIMIT, async {
        while controller.state().revision() < 2 {
            controller.next().await;
        }
    })
    .await
    .unwrap();

    let state = controller.state();
    assert_eq!(state.push_status(), PushStatus::Unavailable);
    assert!(state.pull_error().is_none());
    assert_eq!(
        state.resolver().effective_radio_id("receiver-Kitchen"),
        radio_id_for_uri("http://jazz")
    );
}

#[tokio::test]
async fn test_unreachable_relay_records_pull_error() {
    let client = ApiClient::new("http://127.0.0.1:9/", Duration::from_millis(500)).unwrap();
    let mut controller = SyncController::new(client, SyncSettings::default());
    controller.start();
    timeout(LIMIT, controller.next()).await.unwrap();
    assert!(controller.state().pull_error().is_some());
    assert!(controller.state().topology().is_empty());
}
