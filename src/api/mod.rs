//! REST API layer: route handlers, DTOs, OpenAPI document.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the HTTP endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "relay-gateway", description = "WebSocket relay with an HTTP publish endpoint"),
    paths(
        handlers::system::root_handler,
        handlers::system::health_handler,
        handlers::emit::emit_event,
    ),
    components(schemas(
        dto::EmitRequest,
        dto::EmitResponse,
        handlers::system::HealthResponse,
        crate::error::ErrorResponse,
    )),
    tags(
        (name = "System", description = "Liveness and health"),
        (name = "Relay", description = "Publishing events to connected clients"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = handlers::routes();

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
