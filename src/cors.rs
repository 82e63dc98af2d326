//! Cross-origin gate for HTTP requests and WebSocket handshakes.
//!
//! [`OriginPolicy`] decides; [`enforce_origin`] rejects disallowed origins
//! before any handler runs, and [`OriginPolicy::cors_layer`] adds CORS
//! response headers for the allowed ones.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::RelayError;

/// Fixed allow-list of browser origins.
///
/// Requests without an `Origin` header come from non-browser callers
/// (curl, mobile apps, server-to-server) and are always allowed.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Arc<[String]>,
}

impl OriginPolicy {
    /// Creates a policy allowing exactly the given origins.
    #[must_use]
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `origin` is absent or on the allow-list.
    #[must_use]
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        origin.is_none_or(|origin| self.allowed.iter().any(|allowed| allowed == origin))
    }

    /// Checks `origin` against the policy.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::OriginRejected`] if the origin is present and
    /// not allowed.
    pub fn check(&self, origin: Option<&str>) -> Result<(), RelayError> {
        if self.is_allowed(origin) {
            return Ok(());
        }
        let origin = origin.unwrap_or_default().to_string();
        tracing::warn!(%origin, "origin rejected");
        Err(RelayError::OriginRejected(origin))
    }

    /// Returns the allowed origins.
    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Builds a [`CorsLayer`] that answers preflights and adds CORS headers
    /// for allowed origins, with credentials enabled.
    #[must_use]
    pub fn cors_layer(&self) -> CorsLayer {
        let policy = self.clone();
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _parts: &Parts| {
                    origin
                        .to_str()
                        .is_ok_and(|origin| policy.is_allowed(Some(origin)))
                },
            ))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}

/// Middleware rejecting requests whose `Origin` is not allowed.
///
/// Applies equally to plain HTTP requests and to the WebSocket upgrade
/// request on `/ws`.
///
/// # Errors
///
/// Returns [`RelayError::OriginRejected`] (403) for disallowed origins.
pub async fn enforce_origin(
    State(policy): State<OriginPolicy>,
    request: Request,
    next: Next,
) -> Result<Response, RelayError> {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
    policy.check(origin.as_deref())?;
    Ok(next.run(request).await)
}
