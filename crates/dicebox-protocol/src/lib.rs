//! Wire protocol for dicebox.
//!
//! This crate defines the shapes that travel between the CLI, the HTTP
//! server, and the session core:
//!
//! - **Identity** ([`SessionId`], [`PlayerId`]): string newtypes so a
//!   session id can never be passed where a player id is expected.
//! - **Game data** ([`Roll`], [`SessionInfo`]): what the core produces.
//! - **Transport bodies** ([`CreateSessionRequest`], [`RollResponse`],
//!   [`ErrorBody`]): the JSON documents exchanged over HTTP.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those documents are
//!   turned into bytes and back.
//!
//! # Architecture
//!
//! ```text
//! HTTP / CLI (bytes) → Protocol (typed bodies) → Session core (Roll, SessionInfo)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    CreateSessionRequest, ErrorBody, PlayerId, Roll, RollResponse, SessionId,
    SessionInfo,
};
