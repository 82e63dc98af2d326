//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching inbound frames to the [`RelayService`] and writing queued
//! outbound events to the socket.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use super::messages::ClientMessage;
use crate::domain::ConnectionId;
use crate::error::RelayError;
use crate::service::RelayService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// The connection is registered on entry and unregistered when the client
/// closes the socket or a write fails.
pub async fn run_connection(socket: WebSocket, relay: RelayService) {
    let (id, mut outbound_rx) = relay.connect().await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => handle_text_message(&relay, id, &text).await,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(%id, %err, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            event = outbound_rx.recv() => {
                let Some(event) = event else { break };
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(err) => {
                        tracing::error!(%id, %err, "failed to serialize event");
                        continue;
                    }
                };
                if ws_tx.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
        }
    }

    relay.disconnect(id).await;
}

/// Dispatches one text frame. Malformed or unsupported input is logged and
/// otherwise ignored.
async fn handle_text_message(relay: &RelayService, id: ConnectionId, text: &str) {
    let msg = match ClientMessage::parse(text) {
        Ok(msg) => msg,
        Err(err) => {
            tracing::debug!(%id, %err, "ignoring malformed frame");
            return;
        }
    };

    let result = match msg {
        ClientMessage::JoinAdmin(token) => relay.join_admin(id, &token).await.map(|_| ()),
        ClientMessage::AdminAction(action) => relay.relay(id, action).await.map(|_| ()),
        ClientMessage::Unknown(event) => {
            tracing::debug!(%id, %event, "ignoring unhandled event");
            Ok(())
        }
    };

    match result {
        Ok(()) => {}
        Err(err @ RelayError::ReservedEvent(_)) => {
            tracing::warn!(%id, %err, "admin action dropped");
        }
        Err(err) => tracing::debug!(%id, %err, "message ignored"),
    }
}
