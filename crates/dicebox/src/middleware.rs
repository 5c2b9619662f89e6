//! Request ids and per-request tracing spans.

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use dicebox_session::generate_session_id;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;

/// Header carrying the request id, in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const REQUEST_ID_LENGTH: usize = 20;

/// Generates a random alphanumeric id for requests that arrive without an
/// `x-request-id` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRequestId;

impl MakeRequestId for RandomRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = generate_session_id(REQUEST_ID_LENGTH);
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Opens the span every request is handled in: `request{rid, method, path}`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let rid = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        rid = %rid,
        method = %request.method(),
        path = %request.uri().path(),
    )
}
