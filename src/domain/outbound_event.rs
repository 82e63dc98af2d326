//! Events delivered to connected clients.

use serde::{Deserialize, Serialize};

/// Event names the realtime layer uses for its own lifecycle. Emitting one
/// of these to clients is refused.
pub const RESERVED_EVENTS: [&str; 6] = [
    "connect",
    "connect_error",
    "disconnect",
    "disconnecting",
    "newListener",
    "removeListener",
];

/// Server → client `admin-joined` event name.
pub const ADMIN_JOINED: &str = "admin-joined";

/// Server → client `action-confirmed` event name.
pub const ACTION_CONFIRMED: &str = "action-confirmed";

/// Returns `true` if `name` is reserved and cannot be emitted.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_EVENTS.contains(&name)
}

/// A named event with an arbitrary JSON payload.
///
/// This is also the wire shape of every realtime text frame, in both
/// directions: `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEvent {
    /// Event name the client listens on.
    pub event: String,
    /// Payload, forwarded untouched. `null` when absent.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl OutboundEvent {
    /// Creates an event from a name and payload.
    #[must_use]
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// `admin-joined {success: true}`.
    #[must_use]
    pub fn admin_joined() -> Self {
        Self::new(ADMIN_JOINED, serde_json::json!({ "success": true }))
    }

    /// `action-confirmed {success: true, action}` echoing the raw action.
    #[must_use]
    pub fn action_confirmed(action: serde_json::Value) -> Self {
        Self::new(
            ACTION_CONFIRMED,
            serde_json::json!({ "success": true, "action": action }),
        )
    }
}
