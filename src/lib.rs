//! # relay-gateway
//!
//! WebSocket relay with an admin room and an HTTP publish endpoint.
//!
//! Clients connect over WebSocket, may join the admin room with
//! `join-admin`, and broadcast to each other with `admin-action`. External
//! systems push events to connected clients through `POST /emit`.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── Origin gate + CORS (cors)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── RelayService (service/) ── CredentialVerifier (auth)
//!     │
//!     └── ConnectionManager (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod cors;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;
