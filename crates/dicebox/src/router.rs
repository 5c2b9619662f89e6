//! Route table and middleware stack.

use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use dicebox_session::SessionKeeper;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::middleware::{RandomRequestId, make_request_span};

/// Builds the HTTP router over any [`SessionKeeper`].
///
/// Every request gets an `x-request-id` (the caller's, or a generated
/// one), is traced in a span carrying that id, and has the id echoed on
/// the response.
pub fn router<K: SessionKeeper>(keeper: Arc<K>) -> Router {
    Router::new()
        .route("/sessions", post(handler::create_session::<K>))
        .route("/sessions/{session_id}/{player_id}", post(handler::roll::<K>))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(RandomRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(keeper)
}
