//! End-to-end pipeline tests against a local feed server.
//!
//! The fixture accepts plain WebSocket connections on 127.0.0.1:0 and
//! speaks the hub's JSON frames, so the full chain - transport, codec,
//! merge, replay, commands - is exercised without a real backend.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use corridor_client::{
    ClientConfig, ConnectionStatus, Error, ReconnectConfig, StatusUpdate, SyncClient,
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

const WAIT: Duration = Duration::from_secs(5);

fn test_config(url: &str) -> ClientConfig {
    ClientConfig::from_env()
        .with_url(url)
        .with_heartbeat_interval(Duration::from_secs(60))
}

fn node_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "intersection_id": id,
        "name": format!("Node {id}"),
        "lat": 28.6139,
        "lng": 77.209,
        "neighbors": [],
        "current_phase": {
            "phase_id": 0,
            "active_directions": ["east", "west"],
            "status": "GREEN",
            "remaining_time": 20
        },
        "overall_metrics": {
            "total_vehicles_passed": 0,
            "avg_wait_time_all_sides": 0.0,
            "throughput": 0.0,
            "avg_speed": 0.0,
            "cycle_time": 60
        },
        "direction_metrics": {}
    })
}

fn snapshot_json(nodes: &[&str]) -> String {
    serde_json::json!({
        "type": "city_update",
        "timestamp": "2026-08-06T10:00:00Z",
        "city": {
            "city_id": "CITY_TEST",
            "center": {"lat": 28.6139, "lng": 77.209},
            "nodes": nodes.iter().map(|id| node_json(id)).collect::<Vec<_>>(),
        },
        "incidents": [],
        "ambulance_routes": [],
        "event_log_tail": []
    })
    .to_string()
}

fn incident_update_json(id: &str, status: &str) -> String {
    serde_json::json!({
        "type": "incident_update",
        "timestamp": "2026-08-06T10:01:00Z",
        "incident": {
            "incident_id": id,
            "intersection_id": "INT_A",
            "direction": "east",
            "incident_type": "accident",
            "severity": 2,
            "created_at": "2026-08-06T10:01:00Z",
            "status": status
        }
    })
    .to_string()
}

fn route_update_json(id: &str) -> String {
    serde_json::json!({
        "type": "ambulance_route_update",
        "timestamp": "2026-08-06T10:02:00Z",
        "route": {
            "route_id": id,
            "from_intersection": "INT_A",
            "to_intersection": "INT_D",
            "created_at": "2026-08-06T10:02:00Z",
            "eta_seconds": 45,
            "status": "enroute"
        }
    })
    .to_string()
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws/city", listener.local_addr().unwrap());
    (listener, url)
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    timeout(WAIT, async {
        loop {
            if condition().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn wait_for_status(rx: &mut watch::Receiver<StatusUpdate>, want: ConnectionStatus) {
    timeout(WAIT, async {
        loop {
            if rx.borrow().status == want {
                return;
            }
            rx.changed().await.expect("status channel closed");
        }
    })
    .await
    .expect("status not reached in time");
}

#[tokio::test]
async fn snapshot_selection_and_precedence() {
    let (listener, url) = bind().await;
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<String>();

    // Push-driven server: sends exactly the frames the test hands it.
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(frame) = frame_rx.recv().await {
            if ws.send(Message::text(frame)).await.is_err() {
                break;
            }
        }
    });

    let mut client = SyncClient::new(test_config(&url));
    client.connect();
    let store = client.store();

    // Snapshot with two nodes: selection defaults to the first.
    frame_tx.send(snapshot_json(&["INT_A", "INT_B"])).unwrap();
    wait_until(|| {
        let store = Arc::clone(&store);
        async move { store.read().await.nodes().len() == 2 }
    })
    .await;
    {
        let store = store.read().await;
        assert_eq!(store.selected_node(), Some("INT_A"));
        assert!(store.incidents().is_empty());
        assert_eq!(store.city_id(), Some("CITY_TEST"));
    }

    // Incremental incident insert.
    frame_tx
        .send(incident_update_json("INC_X", "active"))
        .unwrap();
    wait_until(|| {
        let store = Arc::clone(&store);
        async move { store.read().await.incidents().len() == 1 }
    })
    .await;
    assert_eq!(store.read().await.incidents()[0].incident_id, "INC_X");

    // A snapshot with no incidents wipes the incremental entry.
    frame_tx.send(snapshot_json(&["INT_A", "INT_B"])).unwrap();
    wait_until(|| {
        let store = Arc::clone(&store);
        async move { store.read().await.incidents().is_empty() }
    })
    .await;

    // Both snapshots were recorded for replay; the incremental update was not.
    let replay = client.replay();
    assert_eq!(replay.read().await.len(), 2);

    client.disconnect().await;
    assert!(!client.is_running());
    assert_eq!(client.status().status, ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn commands_fail_while_disconnected() {
    // Never connected: every command fails synchronously and nothing is
    // queued or reflected in the store.
    let client = SyncClient::new(test_config("ws://127.0.0.1:9/ws/city"));

    let err = client
        .dispatch_ambulance("INT_A", "INT_B", 45)
        .unwrap_err();
    assert!(matches!(err, Error::NotConnected));
    assert!(matches!(client.ping().unwrap_err(), Error::NotConnected));

    assert!(client.store().read().await.routes().is_empty());
}

#[tokio::test]
async fn command_round_trip() {
    let (listener, url) = bind().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<serde_json::Value>();

    // Echo server: answers a dispatch with the route update the hub would
    // broadcast.
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            let Message::Text(text) = msg else { continue };
            let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            if value["type"] == "dispatch_ambulance" {
                if ws.send(Message::text(route_update_json("AMB_1"))).await.is_err() {
                    break;
                }
            }
            if seen_tx.send(value).is_err() {
                break;
            }
        }
    });

    let mut client = SyncClient::new(test_config(&url));
    client.connect();
    let mut status = client.subscribe_status();
    wait_for_status(&mut status, ConnectionStatus::Connected).await;

    client.dispatch_ambulance("INT_A", "INT_D", 45).unwrap();

    let seen = timeout(WAIT, seen_rx.recv()).await.unwrap().unwrap();
    assert_eq!(seen["type"], "dispatch_ambulance");
    assert_eq!(seen["from_intersection"], "INT_A");
    assert_eq!(seen["eta_seconds"], 45);

    // The store reflects the command only through the server echo.
    let store = client.store();
    wait_until(|| {
        let store = Arc::clone(&store);
        async move { store.read().await.routes().len() == 1 }
    })
    .await;
    assert_eq!(store.read().await.routes()[0].route_id, "AMB_1");

    client.disconnect().await;
}

#[tokio::test]
async fn heartbeat_pings_reach_the_server() {
    let (listener, url) = bind().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<serde_json::Value>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            let Message::Text(text) = msg else { continue };
            let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            if seen_tx.send(value).is_err() {
                break;
            }
        }
    });

    let config = test_config(&url).with_heartbeat_interval(Duration::from_millis(50));
    let mut client = SyncClient::new(config);
    client.connect();

    let seen = timeout(WAIT, seen_rx.recv()).await.unwrap().unwrap();
    assert_eq!(seen["type"], "ping");

    client.disconnect().await;
}

#[tokio::test]
async fn reconnects_after_connection_loss() {
    let (listener, url) = bind().await;

    tokio::spawn(async move {
        // First connection: accept, then drop without a close handshake.
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_async(stream).await;
        drop(ws);

        // Second connection: serve a snapshot and stay up.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        if ws.send(Message::text(snapshot_json(&["INT_A"]))).await.is_err() {
            return;
        }
        while let Some(Ok(_)) = ws.next().await {}
    });

    let config = test_config(&url).with_reconnect(ReconnectConfig {
        base_delay: Duration::from_millis(20),
        max_delay: Duration::from_millis(100),
        max_attempts: 5,
    });
    let mut client = SyncClient::new(config);
    client.connect();

    let store = client.store();
    wait_until(|| {
        let store = Arc::clone(&store);
        async move { store.read().await.nodes().len() == 1 }
    })
    .await;

    client.disconnect().await;
}

#[tokio::test]
async fn exhausted_reconnects_become_terminal_error() {
    // Grab a free port, then close it so every attempt is refused.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let url = format!("ws://{addr}/ws/city");

    let config = test_config(&url).with_reconnect(ReconnectConfig {
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(20),
        max_attempts: 2,
    });
    let mut client = SyncClient::new(config);
    client.connect();

    let mut status = client.subscribe_status();
    wait_for_status(&mut status, ConnectionStatus::Error).await;
    assert!(client.status().error.is_some());

    // The driver has stopped; no further attempts until an explicit connect.
    timeout(WAIT, async {
        while client.is_running() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    // An explicit connect leaves the terminal state.
    client.connect();
    assert!(client.is_running());
    client.disconnect().await;
}
