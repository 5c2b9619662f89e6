//! Unified error type for the dicebox server, and its HTTP rendering.

use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use dicebox_protocol::{Codec, ErrorBody, JsonCodec, ProtocolError};
use dicebox_session::SessionError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors
/// automatically, so handlers and the server loop deal with one type.
#[derive(Debug, thiserror::Error)]
pub enum DiceboxError {
    /// The request could not be read (bad JSON, missing path id).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session layer refused the operation.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Configuration could not be loaded.
    #[error("failed to load config: {0}")]
    Config(#[from] config::ConfigError),

    /// Binding or serving failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DiceboxError {
    /// The HTTP status this error maps to: input problems are the
    /// client's fault, everything else is reported as a server error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Protocol(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Config(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// A [`DiceboxError`] bound to the request that produced it.
///
/// Renders as `{path, method, code, msg}`.
#[derive(Debug)]
pub struct ApiError {
    path: String,
    method: String,
    error: DiceboxError,
}

impl ApiError {
    pub fn new(method: &Method, uri: &Uri, error: impl Into<DiceboxError>) -> Self {
        Self {
            path: uri.path().to_owned(),
            method: method.as_str().to_owned(),
            error: error.into(),
        }
    }

    pub fn error(&self) -> &DiceboxError {
        &self.error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!(
                path = %self.path,
                method = %self.method,
                error = %self.error,
                "request failed"
            );
        } else {
            tracing::debug!(
                path = %self.path,
                method = %self.method,
                error = %self.error,
                "rejected request"
            );
        }

        let body = ErrorBody {
            path: self.path,
            method: self.method,
            code: status.as_u16(),
            msg: self.error.to_string(),
        };
        match JsonCodec.encode(&body) {
            Ok(bytes) => (
                status,
                [(header::CONTENT_TYPE, JsonCodec.content_type())],
                bytes,
            )
                .into_response(),
            Err(_) => (status, body.msg).into_response(),
        }
    }
}
