//! Room labels.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ConnectionId;

/// Label of the room privileged clients join with `join-admin`.
pub const ADMIN_ROOM: &str = "admin-room";

/// Name of a broadcast group.
///
/// Rooms are created implicitly by the first join and vanish when their
/// last member disconnects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    /// Creates a room name from any string-like label.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The admin room.
    #[must_use]
    pub fn admin() -> Self {
        Self::new(ADMIN_ROOM)
    }

    /// The private room every connection is a member of.
    #[must_use]
    pub fn own(id: ConnectionId) -> Self {
        Self(id.to_string())
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
