use futures::{SinkExt, StreamExt};
use serde_json::json;
use spoor_engine::config::SpoorConfig;
use spoor_relay::server::RelayServer;
use spoor_relay::session::Session;
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Start a relay with storage and export routed into `dir`, spawn its
/// session loop and return the address the simulated shim connects to.
async fn start_relay(dir: &Path) -> String {
    let mut config = SpoorConfig::default();
    config.storage.path = Some(dir.join("state.json"));
    config.export.dir = Some(dir.to_path_buf());

    let server = RelayServer::new(0);
    let handle = server.start().await.expect("failed to start relay");
    let addr = format!("ws://{}", handle.local_addr);

    let session = Session::new(&config, handle.control_tx.clone());
    tokio::spawn(session.run(handle.inbound_rx));

    addr
}

async fn connect(addr: &str) -> Client {
    let (client, _) = connect_async(addr).await.expect("failed to connect");
    client
}

async fn send_json(client: &mut Client, value: serde_json::Value) {
    client
        .send(Message::Text(value.to_string()))
        .await
        .expect("failed to send frame");
}

async fn recv_text(client: &mut Client) -> String {
    let msg = tokio::time::timeout(Duration::from_secs(2), client.next())
        .await
        .expect("timeout waiting for frame")
        .expect("stream ended")
        .expect("websocket error");
    msg.to_string()
}

/// Next non-control frame. Observer control broadcasts interleave with
/// acks on a socket that is both shim and control surface.
async fn recv_ack(client: &mut Client) -> serde_json::Value {
    for _ in 0..5 {
        let text = recv_text(client).await;
        let value: serde_json::Value = serde_json::from_str(&text).expect("invalid json frame");
        if value.get("action").is_none() {
            return value;
        }
    }
    panic!("no ack within 5 frames");
}

fn page_loaded(url: &str) -> serde_json::Value {
    json!({"event": "pageLoaded", "url": url})
}

fn click_frame(id: &str) -> serde_json::Value {
    json!({
        "event": "click",
        "target": {"tag": "button", "attributes": {"id": id}},
        "text": "Go"
    })
}

#[tokio::test]
async fn test_recording_round_trip_over_websocket() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_relay(dir.path()).await;
    let mut client = connect(&addr).await;

    send_json(&mut client, page_loaded("https://a.test")).await;

    send_json(&mut client, json!({"action": "startRecording"})).await;
    let ack = recv_ack(&mut client).await;
    assert_eq!(ack["status"], "Recording started");

    send_json(&mut client, click_frame("go")).await;

    send_json(&mut client, json!({"action": "getStatus"})).await;
    let status = recv_ack(&mut client).await;
    assert_eq!(status["isRecording"], json!(true));
    let trace = status["trace"].as_array().expect("trace array");
    assert_eq!(trace.len(), 2);
    assert_eq!(trace[0]["type"], "navigate");
    assert_eq!(trace[0]["url"], "https://a.test");
    assert_eq!(trace[1]["type"], "click");
    assert_eq!(trace[1]["selector"], "#go");

    send_json(&mut client, json!({"action": "stopRecording"})).await;
    let ack = recv_ack(&mut client).await;
    assert_eq!(ack["status"], "Recording stopped");

    send_json(&mut client, json!({"action": "downloadActionTrace"})).await;
    send_json(&mut client, json!({"action": "getStatus"})).await;
    let status = recv_ack(&mut client).await;
    assert_eq!(status["isRecording"], json!(false));
    assert!(status["trace"].as_array().unwrap().is_empty());

    // The artifact landed in the export directory with the full trace.
    let content = std::fs::read_to_string(dir.path().join("action_trace.json"))
        .expect("artifact missing");
    let written: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
    assert_eq!(written.len(), 2);
}

#[tokio::test]
async fn test_session_resumes_across_page_loads() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_relay(dir.path()).await;
    let mut client = connect(&addr).await;

    send_json(&mut client, page_loaded("https://a.test")).await;
    send_json(&mut client, json!({"action": "startRecording"})).await;
    recv_ack(&mut client).await;
    send_json(&mut client, click_frame("go")).await;

    // A reload tears the page context down; the next load restores the
    // live session from the state file and marks the new URL.
    send_json(&mut client, page_loaded("https://b.test")).await;

    send_json(&mut client, json!({"action": "getStatus"})).await;
    let status = recv_ack(&mut client).await;
    assert_eq!(status["isRecording"], json!(true));
    let trace = status["trace"].as_array().expect("trace array");
    assert_eq!(trace.len(), 3);
    assert_eq!(trace[2]["type"], "navigate");
    assert_eq!(trace[2]["url"], "https://b.test");
}

#[tokio::test]
async fn test_undecodable_frames_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_relay(dir.path()).await;
    let mut client = connect(&addr).await;

    send_json(&mut client, page_loaded("https://a.test")).await;
    client
        .send(Message::Text("not json at all".to_string()))
        .await
        .expect("failed to send frame");
    send_json(&mut client, json!({"action": "takeScreenshot"})).await;

    // The connection survives and commands still work.
    send_json(&mut client, json!({"action": "getStatus"})).await;
    let status = recv_ack(&mut client).await;
    assert_eq!(status["isRecording"], json!(false));
}

#[tokio::test]
async fn test_commands_before_page_context_get_no_ack() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_relay(dir.path()).await;
    let mut client = connect(&addr).await;

    // No page context yet: the command is logged and produces no frame.
    send_json(&mut client, json!({"action": "startRecording"})).await;

    send_json(&mut client, page_loaded("https://a.test")).await;
    send_json(&mut client, json!({"action": "getStatus"})).await;

    // The first frame back is the status ack, not a started ack, and the
    // ignored start left the engine idle.
    let first = recv_ack(&mut client).await;
    assert!(first.get("isRecording").is_some());
    assert_eq!(first["isRecording"], json!(false));
}

#[tokio::test]
async fn test_observer_control_reaches_connected_shims() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start_relay(dir.path()).await;

    let mut shim = connect(&addr).await;
    let mut panel = connect(&addr).await;

    send_json(&mut shim, page_loaded("https://a.test")).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    send_json(&mut panel, json!({"action": "startRecording"})).await;
    let ack = recv_ack(&mut panel).await;
    assert_eq!(ack["status"], "Recording started");

    // The shim socket sees the listener controls, not the acks.
    assert_eq!(recv_text(&mut shim).await, r#"{"action":"observe"}"#);

    send_json(&mut shim, click_frame("go")).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    send_json(&mut panel, json!({"action": "stopRecording"})).await;
    let ack = recv_ack(&mut panel).await;
    assert_eq!(ack["status"], "Recording stopped");
    assert_eq!(recv_text(&mut shim).await, r#"{"action":"unobserve"}"#);

    send_json(&mut panel, json!({"action": "getStatus"})).await;
    let status = recv_ack(&mut panel).await;
    assert_eq!(status["trace"].as_array().unwrap().len(), 2);
}
