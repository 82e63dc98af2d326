//! Publish endpoint handler.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{EmitRequest, EmitResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, RelayError};

/// `POST /emit` — Publish an event to a room or to every connection.
///
/// # Errors
///
/// Returns [`RelayError`] when the event name is missing or the event
/// cannot be emitted.
#[utoipa::path(
    post,
    path = "/emit",
    tag = "Relay",
    summary = "Publish an event",
    description = "Delivers `data` under `event` to the members of `room`, or to every connected client when `room` is omitted.",
    request_body = EmitRequest,
    responses(
        (status = 200, description = "Event emitted", body = EmitResponse),
        (status = 400, description = "Event name missing, or body is not a JSON object", body = ErrorResponse),
        (status = 500, description = "Event could not be emitted", body = ErrorResponse),
    )
)]
pub async fn emit_event(
    State(state): State<AppState>,
    body: Result<Json<EmitRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RelayError> {
    let cmd = parse_body(body)?.validate()?;
    state
        .relay
        .publish(&cmd.event, cmd.data, cmd.room.as_ref())
        .await?;

    Ok(Json(EmitResponse {
        success: true,
        message: format!("Event {} emitted", cmd.event),
    }))
}

/// Maps body rejections onto 400s. A request without a JSON content type
/// is read as an empty object, which then fails on the missing event name.
fn parse_body(
    body: Result<Json<EmitRequest>, JsonRejection>,
) -> Result<EmitRequest, RelayError> {
    match body {
        Ok(Json(req)) => Ok(req),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(EmitRequest::default()),
        Err(rejection) => Err(RelayError::InvalidRequest(rejection.body_text())),
    }
}

/// Publish routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/emit", post(emit_event))
}
