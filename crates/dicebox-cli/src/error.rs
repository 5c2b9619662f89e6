//! Error types for the command-line client.

use dicebox_protocol::ProtocolError;

/// Errors that end a CLI command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The server could not be reached or the transfer broke off.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a body that is not what was expected.
    #[error("unexpected response: {0}")]
    Protocol(#[from] ProtocolError),

    /// The server rejected the request.
    #[error("{msg} ({status})")]
    Server { status: u16, msg: String },
}
