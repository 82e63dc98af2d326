//! Service layer: relay orchestration over the connection registry.

pub mod relay_service;

pub use relay_service::RelayService;
