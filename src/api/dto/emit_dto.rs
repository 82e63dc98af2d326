//! Publish endpoint DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::is_truthy;
use crate::domain::RoomName;
use crate::error::RelayError;

/// Request body for `POST /emit`.
///
/// Fields are kept loosely typed so that presence and truthiness can be
/// checked the same way for every JSON value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EmitRequest {
    /// Event name clients listen on. Required.
    #[serde(default)]
    #[schema(value_type = String)]
    pub event: Option<Value>,
    /// Payload forwarded untouched.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
    /// Target room. Omit to deliver to every connection.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub room: Option<Value>,
}

/// A validated publish request.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitCommand {
    /// Event name.
    pub event: String,
    /// Payload.
    pub data: Value,
    /// Target room, `None` for everyone.
    pub room: Option<RoomName>,
}

impl EmitRequest {
    /// Validates the request.
    ///
    /// A missing or falsy `event` is [`RelayError::MissingEvent`]. A falsy
    /// `room` means "everyone". Truthy values that are not strings are
    /// rejected rather than coerced.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MissingEvent`] or [`RelayError::InvalidRequest`].
    pub fn validate(self) -> Result<EmitCommand, RelayError> {
        let event = match self.event {
            Some(Value::String(event)) if !event.is_empty() => event,
            Some(other) if is_truthy(&other) => {
                return Err(RelayError::InvalidRequest(
                    "event must be a string".to_string(),
                ));
            }
            _ => return Err(RelayError::MissingEvent),
        };

        let room = match self.room {
            Some(Value::String(room)) if !room.is_empty() => Some(RoomName::new(room)),
            Some(other) if is_truthy(&other) => {
                return Err(RelayError::InvalidRequest(
                    "room must be a string".to_string(),
                ));
            }
            _ => None,
        };

        Ok(EmitCommand {
            event,
            data: self.data,
            room,
        })
    }
}

/// Response body for a successful `POST /emit`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmitResponse {
    /// Always `true`.
    pub success: bool,
    /// `Event <name> emitted`.
    pub message: String,
}
