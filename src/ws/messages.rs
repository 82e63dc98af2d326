//! Client → server realtime messages.
//!
//! Every text frame is a JSON object `{"event": "...", "data": ...}`, the
//! shape of [`OutboundEvent`]. Inbound frames are classified by event name.
//! Array frames (`["event", data]`) are not accepted.

use serde_json::Value;

use crate::domain::OutboundEvent;

/// Client → server `join-admin` event name.
pub const JOIN_ADMIN: &str = "join-admin";

/// Client → server `admin-action` event name.
pub const ADMIN_ACTION: &str = "admin-action";

/// A parsed inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// `join-admin` carrying the credential.
    JoinAdmin(Value),
    /// `admin-action` carrying the raw `{event, payload}` object.
    AdminAction(Value),
    /// Any event name the server does not handle.
    Unknown(String),
}

impl ClientMessage {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the frame is not an `{event, data}` object.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("frame must be a JSON object"));
        }
        serde_json::from_value::<OutboundEvent>(value).map(Self::from)
    }
}

impl From<OutboundEvent> for ClientMessage {
    fn from(frame: OutboundEvent) -> Self {
        match frame.event.as_str() {
            JOIN_ADMIN => Self::JoinAdmin(frame.data),
            ADMIN_ACTION => Self::AdminAction(frame.data),
            _ => Self::Unknown(frame.event),
        }
    }
}
