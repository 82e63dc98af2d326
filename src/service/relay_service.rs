//! Relay service: connection lifecycle, admin joins, and event fan-out.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::auth::CredentialVerifier;
use crate::domain::outbound_event::is_reserved;
use crate::domain::{ConnectionId, ConnectionManager, OutboundEvent, RoomName};
use crate::error::RelayError;

/// Orchestration layer over the [`ConnectionManager`].
///
/// Shared by the WebSocket connection tasks and the HTTP publish handler.
/// Every operation on an existing connection first checks that it is still
/// registered, so nothing is emitted on behalf of a closed connection.
#[derive(Debug, Clone)]
pub struct RelayService {
    connections: Arc<ConnectionManager>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl RelayService {
    /// Creates a new `RelayService`.
    #[must_use]
    pub fn new(connections: Arc<ConnectionManager>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            connections,
            verifier,
        }
    }

    /// Returns a reference to the inner [`ConnectionManager`].
    #[must_use]
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// Registers a freshly accepted connection.
    pub async fn connect(&self) -> (ConnectionId, mpsc::Receiver<OutboundEvent>) {
        let (id, rx) = self.connections.register().await;
        tracing::info!(%id, "client connected");
        (id, rx)
    }

    /// Handles `join-admin`.
    ///
    /// If the verifier accepts `credential`, the connection joins the admin
    /// room and receives `admin-joined {success: true}`. A rejected
    /// credential changes nothing. Returns whether the join happened.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConnectionNotFound`] if the connection has
    /// already disconnected.
    pub async fn join_admin(&self, id: ConnectionId, credential: &Value) -> Result<bool, RelayError> {
        if !self.connections.contains(id).await {
            return Err(RelayError::ConnectionNotFound(id));
        }
        if !self.verifier.verify(credential) {
            tracing::debug!(%id, "admin credential rejected");
            return Ok(false);
        }
        self.connections.join(id, RoomName::admin()).await?;
        self.connections
            .emit_to(id, OutboundEvent::admin_joined())
            .await?;
        tracing::info!(%id, "admin joined");
        Ok(true)
    }

    /// Handles `admin-action`.
    ///
    /// `action` is the raw `{event, payload}` object. The payload is
    /// broadcast under `event` to every other connection, then the sender
    /// gets `action-confirmed` echoing the whole action. Returns the number
    /// of connections that received the broadcast.
    ///
    /// # Errors
    ///
    /// - [`RelayError::ConnectionNotFound`] if the sender has disconnected.
    /// - [`RelayError::InvalidRequest`] if `action.event` is not a string.
    /// - [`RelayError::ReservedEvent`] if `action.event` is reserved.
    ///
    /// Nothing is emitted in any error case.
    pub async fn relay(&self, id: ConnectionId, action: Value) -> Result<usize, RelayError> {
        if !self.connections.contains(id).await {
            return Err(RelayError::ConnectionNotFound(id));
        }
        tracing::info!(%id, %action, "admin action");

        let event = action
            .get("event")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RelayError::InvalidRequest("admin-action without event".to_string()))?;
        if is_reserved(event) {
            return Err(RelayError::ReservedEvent(event.to_string()));
        }
        let payload = action.get("payload").cloned().unwrap_or(Value::Null);

        let forwarded = OutboundEvent::new(event, payload);
        let recipients = self.connections.broadcast_except(id, &forwarded).await;
        self.connections
            .emit_to(id, OutboundEvent::action_confirmed(action))
            .await?;
        Ok(recipients)
    }

    /// Removes a connection. Returns `false` if it was already gone.
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let removed = self.connections.unregister(id).await;
        tracing::info!(%id, "client disconnected");
        removed
    }

    /// Emits `data` under `event` to the members of `room`, or to every
    /// connection when `room` is `None`. Returns the number of recipients.
    ///
    /// # Errors
    ///
    /// - [`RelayError::MissingEvent`] if `event` is empty.
    /// - [`RelayError::ReservedEvent`] if `event` is reserved.
    pub async fn publish(
        &self,
        event: &str,
        data: Value,
        room: Option<&RoomName>,
    ) -> Result<usize, RelayError> {
        if event.is_empty() {
            return Err(RelayError::MissingEvent);
        }
        if is_reserved(event) {
            return Err(RelayError::ReservedEvent(event.to_string()));
        }

        let outbound = OutboundEvent::new(event, data);
        let recipients = match room {
            Some(room) => self.connections.emit_to_room(room, &outbound).await,
            None => self.connections.broadcast(&outbound).await,
        };
        tracing::info!(
            event,
            room = room.map(RoomName::as_str),
            recipients,
            "event emitted"
        );
        Ok(recipients)
    }
}
