//! Shared application state injected into all Axum handlers.

use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay service owning the connection registry.
    pub relay: RelayService,
}

impl AppState {
    /// Wraps a relay service.
    #[must_use]
    pub const fn new(relay: RelayService) -> Self {
        Self { relay }
    }
}
