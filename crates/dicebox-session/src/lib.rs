//! Dice session lifecycle for dicebox.
//!
//! A session is one bounded dice round: up to `max_players` players each
//! roll once, the highest roll wins, and the round closes when either the
//! roster is full or the deadline elapses. Each session runs as its own
//! Tokio task; the registry catalogs the sessions that are still running.
//!
//! # Key types
//!
//! - [`SessionRegistry`]: creates sessions under a capacity limit, routes
//!   rolls to them, and forgets them once they close
//! - [`SessionKeeper`]: the two-operation capability the outer layers
//!   depend on (implemented by the registry, mockable in tests)
//! - [`RollTicket`] / [`WinnerHandle`]: what a successful roll returns:
//!   the committed roll now, the winner later
//! - [`SessionPhase`]: `Open → Closing → Closed`
//! - [`RegistryConfig`]: capacity, per-session limits, roll range, durations
//! - [`RollSource`]: where roll values come from

mod config;
mod dice;
mod error;
mod keeper;
mod registry;
mod session;

pub use config::{
    CloseReason, DURATION_CEILING, PLAYERS_CEILING, RegistryConfig, SessionPhase,
};
pub use dice::{RollSource, ThreadRngRoller, generate_session_id};
pub use error::SessionError;
pub use keeper::SessionKeeper;
pub use registry::{SessionRegistry, SessionSnapshot};
pub use session::{RollTicket, WinnerHandle};
