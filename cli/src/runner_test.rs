use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use super::*;

const WAIT: Duration = Duration::from_secs(5);

fn test_config(port: u16) -> ClientConfig {
    let mut config = ClientConfig::for_host(&format!("127.0.0.1:{port}"));
    config.settle_delay = Duration::from_millis(10);
    config.initial_reconnect_delay = Duration::from_millis(20);
    config.max_reconnect_attempts = 2;
    config
}

async fn listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    (listener, port)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (tcp, _) = timeout(WAIT, listener.accept()).await.expect("accept timeout").expect("accept");
    tokio_tungstenite::accept_async(tcp).await.expect("handshake")
}

async fn next_command(ws: &mut WebSocketStream<TcpStream>) -> Value {
    loop {
        let message = timeout(WAIT, ws.next()).await.expect("recv timeout").expect("stream open").expect("frame");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).expect("json");
        }
    }
}

async fn push(ws: &mut WebSocketStream<TcpStream>, frame: Value) {
    ws.send(Message::Text(frame.to_string().into())).await.expect("send");
}

// =============================================================
// Connect and settle
// =============================================================

#[tokio::test]
async fn settle_requests_snapshot_and_state_mirrors_it() {
    let (listener, port) = listener().await;
    let mut client = ScaleClient::spawn(test_config(port));
    let mut server = accept(&listener).await;

    assert_eq!(next_command(&mut server).await, json!({ "command": "getVessels" }));
    push(&mut server, json!({ "vessels": [{ "name": "PLA", "vesselWeight": 120, "spoolWeight": 250 }] })).await;

    let state = client.ready(WAIT).await.expect("snapshot");
    assert_eq!(state.status, "Connected");
    assert_eq!(state.vessels.len(), 1);
    assert_eq!(state.vessels.get(0).map(|v| v.name.as_str()), Some("PLA"));
}

#[tokio::test]
async fn live_updates_replayed_after_server_drops_connection() {
    let (listener, port) = listener().await;
    let client = ScaleClient::spawn(test_config(port));
    client.perform(UserAction::ToggleLiveUpdates).await.expect("toggle");

    let mut first = accept(&listener).await;
    assert_eq!(next_command(&mut first).await, json!({ "command": "getVessels" }));
    assert_eq!(next_command(&mut first).await, json!({ "command": "toggleUpdates", "enabled": true }));
    drop(first);

    let mut second = accept(&listener).await;
    assert_eq!(next_command(&mut second).await, json!({ "command": "getVessels" }));
    assert_eq!(next_command(&mut second).await, json!({ "command": "toggleUpdates", "enabled": true }));
}

#[tokio::test]
async fn weight_frames_render_once_live_updates_are_on() {
    let (listener, port) = listener().await;
    let mut client = ScaleClient::spawn(test_config(port));
    let mut server = accept(&listener).await;
    next_command(&mut server).await;
    push(&mut server, json!({ "vessels": [] })).await;
    client.ready(WAIT).await.expect("snapshot");

    client.perform(UserAction::ToggleLiveUpdates).await.expect("toggle");
    assert_eq!(next_command(&mut server).await, json!({ "command": "toggleUpdates", "enabled": true }));
    push(&mut server, json!({ "weight": 12.345, "filamentWeight": 3.5 })).await;

    let state = client.wait_until(WAIT, |state| state.total_weight.is_some()).await.expect("weight");
    assert_eq!(state.total_text().as_deref(), Some("Total: 12.35g"));
    assert_eq!(state.filament.display_text(), "Filament: 3.50g");
}

// =============================================================
// Commands and status
// =============================================================

#[tokio::test]
async fn vessel_status_triggers_single_resync() {
    let (listener, port) = listener().await;
    let mut client = ScaleClient::spawn(test_config(port));
    let mut server = accept(&listener).await;
    next_command(&mut server).await;
    push(&mut server, json!({ "vessels": [] })).await;
    let before = client.ready(WAIT).await.expect("snapshot");

    client
        .perform(UserAction::AddVessel(filascale_frames::Vessel::new("PETG", 100.0, 200.0)))
        .await
        .expect("add");
    let add = next_command(&mut server).await;
    assert_eq!(add["command"], "addVessel");
    assert_eq!(add["vessel"]["name"], "PETG");

    push(&mut server, json!({ "status": "Vessel added" })).await;
    let state = client.next_status(before.status_rev, WAIT).await.expect("status");
    assert_eq!(state.status, "Vessel added");
    assert_eq!(next_command(&mut server).await, json!({ "command": "getVessels" }));

    client.perform(UserAction::Tare).await.expect("tare");
    assert_eq!(next_command(&mut server).await, json!({ "command": "tare" }));
}

#[tokio::test]
async fn tare_before_connect_is_rejected() {
    let (listener, port) = listener().await;
    drop(listener);
    let client = ScaleClient::spawn(test_config(port));
    let result = client.perform(UserAction::Tare).await;
    assert!(matches!(result, Err(CliError::Command(CommandError::NotConnected))));
}

#[tokio::test]
async fn unreachable_device_exhausts_budget() {
    let (listener, port) = listener().await;
    drop(listener);
    let mut client = ScaleClient::spawn(test_config(port));
    let result = client.ready(WAIT).await;
    assert!(matches!(result, Err(CliError::ConnectionFailed(2))));
    let state = client.snapshot();
    assert_eq!(state.status, "Connection failed - Please refresh page");
}
