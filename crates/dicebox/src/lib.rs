//! # dicebox
//!
//! HTTP server for timed multiplayer dice sessions.
//!
//! Players join a session by rolling once; the highest roll wins and every
//! player's request returns with the result when the roster fills or the
//! deadline passes. The session logic lives in `dicebox-session`; this
//! crate exposes it over HTTP:
//!
//! - `POST /sessions` with `{num_players, duration_seconds}` → `{id, num_players}`
//! - `POST /sessions/{session_id}/{player_id}` → `{your, winner}` once the
//!   session closes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dicebox::prelude::*;
//!
//! # async fn demo() -> Result<(), DiceboxError> {
//! let config = ServerConfig::load()?;
//! let server = DiceboxServer::builder()
//!     .bind(&config.addr())
//!     .registry_config(config.registry_config())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod middleware;
mod router;
mod server;
mod settings;

pub use error::{ApiError, DiceboxError};
pub use middleware::{REQUEST_ID_HEADER, RandomRequestId, make_request_span};
pub use router::router;
pub use server::{DiceboxServer, DiceboxServerBuilder};
pub use settings::ServerConfig;

pub mod prelude {
    pub use crate::{DiceboxError, DiceboxServer, DiceboxServerBuilder, ServerConfig, router};
    pub use dicebox_protocol::{PlayerId, Roll, RollResponse, SessionId, SessionInfo};
    pub use dicebox_session::{
        RegistryConfig, SessionError, SessionKeeper, SessionRegistry, WinnerHandle,
    };
}
