//! Domain layer: connection identity, rooms, events, and the connection
//! registry.
//!
//! Everything here lives in process memory only and disappears with the
//! connections it describes.

pub mod connection_id;
pub mod connection_manager;
pub mod outbound_event;
pub mod room;

pub use connection_id::ConnectionId;
pub use connection_manager::ConnectionManager;
pub use outbound_event::OutboundEvent;
pub use room::{ADMIN_ROOM, RoomName};
