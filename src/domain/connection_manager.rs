//! In-memory registry of live connections and their rooms.
//!
//! [`ConnectionManager`] owns every connection's outbound queue and the
//! room membership index. It is constructed once at startup and shared with
//! handlers through [`crate::app_state::AppState`].

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};

use super::{ConnectionId, OutboundEvent, RoomName};
use crate::error::RelayError;

/// Per-connection bookkeeping.
#[derive(Debug)]
struct ConnectionEntry {
    tx: mpsc::Sender<OutboundEvent>,
    rooms: HashSet<RoomName>,
    connected_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Registry {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<RoomName, HashSet<ConnectionId>>,
}

/// Central store for all live connections.
///
/// # Concurrency
///
/// A single `RwLock` guards both indexes so membership and connection
/// lifetime stay consistent. Deliveries only need the read lock and never
/// await while holding it: each one is a `try_send` onto a bounded queue,
/// and a full queue drops the event instead of waiting.
#[derive(Debug)]
pub struct ConnectionManager {
    inner: RwLock<Registry>,
    outbound_capacity: usize,
}

impl ConnectionManager {
    /// Creates an empty registry whose connections buffer up to
    /// `outbound_capacity` undelivered events each.
    #[must_use]
    pub fn new(outbound_capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Registry::default()),
            outbound_capacity: outbound_capacity.max(1),
        }
    }

    /// Registers a new connection and returns its ID together with the
    /// receiving end of its outbound queue.
    ///
    /// The connection starts as the only member of its own room.
    pub async fn register(&self) -> (ConnectionId, mpsc::Receiver<OutboundEvent>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(self.outbound_capacity);
        let own = RoomName::own(id);

        let mut reg = self.inner.write().await;
        reg.rooms.entry(own.clone()).or_default().insert(id);
        reg.connections.insert(
            id,
            ConnectionEntry {
                tx,
                rooms: HashSet::from([own]),
                connected_at: Utc::now(),
            },
        );
        (id, rx)
    }

    /// Removes a connection and its room memberships. Rooms left without
    /// members are dropped.
    ///
    /// Returns `false` if the connection was not registered.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let mut reg = self.inner.write().await;
        let Some(entry) = reg.connections.remove(&id) else {
            return false;
        };
        for room in entry.rooms {
            if let Some(members) = reg.rooms.get_mut(&room) {
                members.remove(&id);
                if members.is_empty() {
                    reg.rooms.remove(&room);
                }
            }
        }
        tracing::debug!(
            %id,
            connected_for_secs = (Utc::now() - entry.connected_at).num_seconds(),
            "connection unregistered"
        );
        true
    }

    /// Adds a connection to a room.
    ///
    /// Returns `true` if the connection was not already a member.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConnectionNotFound`] if the connection is not
    /// registered.
    pub async fn join(&self, id: ConnectionId, room: RoomName) -> Result<bool, RelayError> {
        let mut reg = self.inner.write().await;
        let entry = reg
            .connections
            .get_mut(&id)
            .ok_or(RelayError::ConnectionNotFound(id))?;
        let added = entry.rooms.insert(room.clone());
        reg.rooms.entry(room).or_default().insert(id);
        Ok(added)
    }

    /// Returns the rooms a connection belongs to, sorted by name.
    pub async fn rooms_of(&self, id: ConnectionId) -> Vec<RoomName> {
        let reg = self.inner.read().await;
        let mut rooms: Vec<RoomName> = reg
            .connections
            .get(&id)
            .map(|entry| entry.rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    /// Returns the members of a room.
    pub async fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        let reg = self.inner.read().await;
        reg.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if the connection is registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.inner.read().await.connections.contains_key(&id)
    }

    /// Sends an event to a single connection.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConnectionNotFound`] if the connection is not
    /// registered.
    pub async fn emit_to(&self, id: ConnectionId, event: OutboundEvent) -> Result<(), RelayError> {
        let reg = self.inner.read().await;
        let entry = reg
            .connections
            .get(&id)
            .ok_or(RelayError::ConnectionNotFound(id))?;
        deliver(id, entry, event);
        Ok(())
    }

    /// Sends an event to every connection. Returns the number of queues
    /// that accepted it.
    pub async fn broadcast(&self, event: &OutboundEvent) -> usize {
        let reg = self.inner.read().await;
        reg.connections
            .iter()
            .filter(|(id, entry)| deliver(**id, entry, event.clone()))
            .count()
    }

    /// Sends an event to every connection except `sender`.
    pub async fn broadcast_except(&self, sender: ConnectionId, event: &OutboundEvent) -> usize {
        let reg = self.inner.read().await;
        reg.connections
            .iter()
            .filter(|(id, _)| **id != sender)
            .filter(|(id, entry)| deliver(**id, entry, event.clone()))
            .count()
    }

    /// Sends an event to every member of `room`. An unknown room reaches
    /// nobody.
    pub async fn emit_to_room(&self, room: &RoomName, event: &OutboundEvent) -> usize {
        let reg = self.inner.read().await;
        let Some(members) = reg.rooms.get(room) else {
            return 0;
        };
        members
            .iter()
            .filter_map(|id| reg.connections.get(id).map(|entry| (*id, entry)))
            .filter(|(id, entry)| deliver(*id, entry, event.clone()))
            .count()
    }

    /// Returns the number of live connections.
    pub async fn len(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Returns `true` if no connection is live.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.connections.is_empty()
    }

    /// Returns the number of non-empty rooms, own rooms included.
    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Enqueues without waiting. Returns `false` if the event was dropped.
fn deliver(id: ConnectionId, entry: &ConnectionEntry, event: OutboundEvent) -> bool {
    match entry.tx.try_send(event) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(ev)) => {
            tracing::warn!(%id, event = %ev.event, "outbound queue full, dropping event");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!(%id, "outbound queue closed");
            false
        }
    }
}
