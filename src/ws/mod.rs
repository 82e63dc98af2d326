//! WebSocket layer: upgrade handler, connection loop, message parsing.
//!
//! The endpoint at `/ws` carries the realtime channel: `join-admin` and
//! `admin-action` from clients, relayed and published events to them.

pub mod connection;
pub mod handler;
pub mod messages;
