//! Request ID middleware for tracing and debugging.
//!
//! Every request gets an `x-request-id` (taken from the caller or generated),
//! echoed on the response and attached to the request's log lines and metrics.

use crate::{logging, metrics};
use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

/// Correlation header read from the caller and set on every response
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The caller's id when it is printable and non-empty, otherwise a fresh UUID
fn resolve_request_id(headers: &HeaderMap) -> String {
    match headers.get(REQUEST_ID_HEADER).map(HeaderValue::to_str) {
        Some(Ok(id)) if !id.trim().is_empty() => id.to_owned(),
        _ => Uuid::new_v4().to_string(),
    }
}

/// Tag the request with an id, then log and count it once the response is ready
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use tourney_server::api::request_id::request_id_middleware;
///
/// # async fn example() {
/// let app: Router = Router::new()
///     .route("/", get(|| async { "Hello" }))
///     .layer(middleware::from_fn(request_id_middleware));
/// # }
/// ```
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let started = Instant::now();
    let request_id = resolve_request_id(request.headers());

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let method = request.method().to_string();
    // Route template keeps metric labels bounded; fall back to the raw path
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        uri = %request.uri(),
        "Request started"
    );

    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, header_value);
    }

    let duration_ms = started.elapsed().as_millis() as u64;
    logging::log_api_request(
        &method,
        &route,
        parts.status.as_u16(),
        duration_ms,
        &request_id,
    );
    metrics::http_requests_total(&method, &route, parts.status.as_u16());
    metrics::http_request_duration_ms(&method, &route, duration_ms as f64);

    Response::from_parts(parts, body)
}

/// Id of the request being handled
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> axum::extract::FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestId>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Request ID not found in extensions",
        ))
    }
}
