//! End-to-end tests against a live relay on an ephemeral port.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use relay_gateway::app_state::AppState;
use relay_gateway::auth::AcceptTruthy;
use relay_gateway::config::RelayConfig;
use relay_gateway::cors::OriginPolicy;
use relay_gateway::domain::RoomName;
use relay_gateway::server::{build_app, build_state};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const ALLOWED: &str = "http://localhost:3000";
const FOREIGN: &str = "https://evil.example";

async fn spawn_relay() -> (SocketAddr, AppState) {
    let config = RelayConfig::from_lookup(|_| None).expect("default config");
    let state = build_state(&config, Arc::new(AcceptTruthy));
    let policy = OriginPolicy::new(config.allowed_origins.iter().cloned());
    let app = build_app(state.clone(), policy);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, state)
}

async fn connect(addr: SocketAddr, state: &AppState) -> Client {
    let before = state.relay.connections().len().await;
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("ws connect");
    wait_for_connections(state, before + 1).await;
    ws
}

async fn wait_for_connections(state: &AppState, expected: usize) {
    for _ in 0..200 {
        if state.relay.connections().len().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {expected} connections");
}

async fn send(ws: &mut Client, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    ws.send(Message::text(frame)).await.expect("ws send");
}

async fn recv(ws: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("ws error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("json frame");
        }
    }
}

async fn assert_silent(ws: &mut Client) {
    let next = tokio::time::timeout(Duration::from_millis(250), ws.next()).await;
    assert!(next.is_err(), "unexpected frame: {next:?}");
}

async fn join_admin(ws: &mut Client) {
    send(ws, "join-admin", json!("secret")).await;
    let frame = recv(ws).await;
    assert_eq!(frame["event"], "admin-joined");
}

#[tokio::test]
async fn root_reports_running() {
    let (addr, _) = spawn_relay().await;
    let resp = assert_ok!(reqwest::get(format!("http://{addr}/")).await);
    assert_eq!(resp.status(), 200);
    assert_eq!(assert_ok!(resp.text().await), "WebSocket server is running");
}

#[tokio::test]
async fn health_counts_connections() {
    let (addr, state) = spawn_relay().await;
    let _ws = connect(addr, &state).await;

    let resp = assert_ok!(reqwest::get(format!("http://{addr}/health")).await);
    let body: Value = assert_ok!(resp.json().await);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["connections"], 1);
}

#[tokio::test]
async fn allowed_origin_gets_cors_headers() {
    let (addr, _) = spawn_relay().await;
    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/"))
        .header("origin", ALLOWED)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some(ALLOWED)
    );
    assert_eq!(
        resp.headers().get("access-control-allow-credentials").and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn foreign_origin_is_rejected() {
    let (addr, _) = spawn_relay().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{addr}/"))
        .header("origin", FOREIGN)
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 403);

    let resp = client
        .post(format!("http://{addr}/emit"))
        .header("origin", FOREIGN)
        .json(&json!({ "event": "x" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.expect("json body");
    assert!(body["error"].as_str().is_some_and(|e| e.ends_with(FOREIGN)));
}

#[tokio::test]
async fn foreign_origin_preflight_is_rejected() {
    let (addr, _) = spawn_relay().await;
    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/emit"))
        .header("origin", FOREIGN)
        .header("access-control-request-method", "POST")
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 403);
    assert!(resp.headers().get("access-control-allow-credentials").is_none());
}

#[tokio::test]
async fn emit_with_non_object_body_is_bad_request() {
    let (addr, _) = spawn_relay().await;
    let client = reqwest::Client::new();

    for body in ["null", "42"] {
        let resp = client
            .post(format!("http://{addr}/emit"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 400, "body {body}");
    }

    let resp = client
        .post(format!("http://{addr}/emit"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"], "Event name is required");
}

#[tokio::test]
async fn foreign_origin_cannot_open_socket() {
    let (addr, state) = spawn_relay().await;

    let mut request = format!("ws://{addr}/ws").into_client_request().expect("request");
    request
        .headers_mut()
        .insert("origin", HeaderValue::from_static(FOREIGN));
    assert!(tokio_tungstenite::connect_async(request).await.is_err());

    let mut request = format!("ws://{addr}/ws").into_client_request().expect("request");
    request
        .headers_mut()
        .insert("origin", HeaderValue::from_static(ALLOWED));
    assert!(tokio_tungstenite::connect_async(request).await.is_ok());
    wait_for_connections(&state, 1).await;
}

#[tokio::test]
async fn emit_without_event_is_bad_request() {
    let (addr, _) = spawn_relay().await;
    let client = reqwest::Client::new();

    for body in [json!({}), json!({ "data": 1, "room": "r" }), json!({ "event": "" })] {
        let resp = client
            .post(format!("http://{addr}/emit"))
            .json(&body)
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.expect("json body");
        assert_eq!(body["error"], "Event name is required");
    }
}

#[tokio::test]
async fn emit_reserved_event_is_server_error() {
    let (addr, _) = spawn_relay().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/emit"))
        .json(&json!({ "event": "disconnect" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"], "Failed to emit event");
}

#[tokio::test]
async fn emit_to_room_reaches_members_only() {
    let (addr, state) = spawn_relay().await;
    let mut admin = connect(addr, &state).await;
    let mut guest = connect(addr, &state).await;
    join_admin(&mut admin).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/emit"))
        .json(&json!({ "event": "x", "data": { "deal": 9 }, "room": "admin-room" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body, json!({ "success": true, "message": "Event x emitted" }));

    assert_eq!(recv(&mut admin).await, json!({ "event": "x", "data": { "deal": 9 } }));
    assert_silent(&mut guest).await;
}

#[tokio::test]
async fn emit_without_room_reaches_everyone() {
    let (addr, state) = spawn_relay().await;
    let mut a = connect(addr, &state).await;
    let mut b = connect(addr, &state).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/emit"))
        .json(&json!({ "event": "x", "data": [1, 2] }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);

    for ws in [&mut a, &mut b] {
        assert_eq!(recv(ws).await, json!({ "event": "x", "data": [1, 2] }));
    }
}

#[tokio::test]
async fn truthy_token_joins_admin_room() {
    let (addr, state) = spawn_relay().await;
    let mut ws = connect(addr, &state).await;

    send(&mut ws, "join-admin", json!("token")).await;
    assert_eq!(
        recv(&mut ws).await,
        json!({ "event": "admin-joined", "data": { "success": true } })
    );
    assert_eq!(state.relay.connections().members(&RoomName::admin()).await.len(), 1);
}

#[tokio::test]
async fn falsy_token_is_ignored() {
    let (addr, state) = spawn_relay().await;
    let mut ws = connect(addr, &state).await;

    send(&mut ws, "join-admin", json!("")).await;
    send(&mut ws, "join-admin", Value::Null).await;
    assert_silent(&mut ws).await;
    assert!(state.relay.connections().members(&RoomName::admin()).await.is_empty());
}

#[tokio::test]
async fn admin_action_is_relayed_and_confirmed() {
    let (addr, state) = spawn_relay().await;
    let mut a = connect(addr, &state).await;
    let mut b = connect(addr, &state).await;
    let mut c = connect(addr, &state).await;

    let action = json!({ "event": "deal-added", "payload": { "id": 1 } });
    send(&mut a, "admin-action", action.clone()).await;

    for ws in [&mut b, &mut c] {
        assert_eq!(recv(ws).await, json!({ "event": "deal-added", "data": { "id": 1 } }));
    }
    assert_eq!(
        recv(&mut a).await,
        json!({ "event": "action-confirmed", "data": { "success": true, "action": action } })
    );
    assert_silent(&mut b).await;
}

#[tokio::test]
async fn malformed_frames_are_ignored() {
    let (addr, state) = spawn_relay().await;
    let mut a = connect(addr, &state).await;
    let mut b = connect(addr, &state).await;

    a.send(Message::text("not json")).await.expect("send");
    send(&mut a, "admin-action", json!({ "payload": 1 })).await;
    send(&mut a, "something-else", json!(1)).await;
    assert_silent(&mut b).await;

    // The connection is still usable afterwards.
    join_admin(&mut a).await;
}

#[tokio::test]
async fn closed_socket_is_unregistered() {
    let (addr, state) = spawn_relay().await;
    let mut ws = connect(addr, &state).await;
    join_admin(&mut ws).await;

    ws.close(None).await.expect("close");
    wait_for_connections(&state, 0).await;
    assert!(state.relay.connections().members(&RoomName::admin()).await.is_empty());
}
