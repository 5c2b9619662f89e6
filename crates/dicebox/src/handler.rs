//! Request handlers for the two session endpoints.
//!
//! Bodies are decoded and encoded through [`JsonCodec`] so the wire format
//! lives in one place.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{OriginalUri, Path, State};
use axum::http::{Method, header};
use axum::response::{IntoResponse, Response};
use dicebox_protocol::{
    Codec, CreateSessionRequest, JsonCodec, PlayerId, ProtocolError, RollResponse, SessionId,
};
use dicebox_session::SessionKeeper;
use serde::Serialize;

use crate::{ApiError, DiceboxError};

/// `POST /sessions`
///
/// Body `{num_players, duration_seconds}`, both optional. Responds with
/// `{id, num_players}`.
pub(crate) async fn create_session<K: SessionKeeper>(
    State(keeper): State<Arc<K>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: CreateSessionRequest = JsonCodec
        .decode(&body)
        .map_err(|e| ApiError::new(&method, &uri, e))?;

    // Negative counts are as invalid as zero.
    let num_players = usize::try_from(request.num_players).unwrap_or(0);

    let info = keeper
        .create_session(num_players, request.duration_seconds)
        .map_err(|e| ApiError::new(&method, &uri, e))?;

    json(&info).map_err(|e| ApiError::new(&method, &uri, e))
}

/// `POST /sessions/{session_id}/{player_id}`
///
/// Rolls for the player, then holds the request open until the session
/// closes. Responds with `{your, winner}`.
pub(crate) async fn roll<K: SessionKeeper>(
    State(keeper): State<Arc<K>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Path((session_id, player_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let fail = |e: DiceboxError| ApiError::new(&method, &uri, e);

    let session_id = SessionId::new(session_id);
    if session_id.is_empty() {
        return Err(fail(missing("sessionID")));
    }
    let player_id = PlayerId::new(player_id);
    if player_id.is_empty() {
        return Err(fail(missing("playerID")));
    }

    let ticket = keeper
        .submit_roll(&session_id, player_id)
        .map_err(|e| fail(e.into()))?;

    tracing::debug!(
        %session_id,
        player_id = %ticket.roll.player_id,
        roll = ticket.roll.value,
        "waiting for session to close"
    );

    let winner = ticket.winner.wait().await.map_err(|e| fail(e.into()))?;

    json(&RollResponse {
        your: ticket.roll,
        winner,
    })
    .map_err(fail)
}

fn missing(what: &str) -> DiceboxError {
    ProtocolError::InvalidMessage(format!("no {what} provided")).into()
}

fn json<T: Serialize>(value: &T) -> Result<Response, DiceboxError> {
    let bytes = JsonCodec.encode(value)?;
    Ok(([(header::CONTENT_TYPE, JsonCodec.content_type())], bytes).into_response())
}
