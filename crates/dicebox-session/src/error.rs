//! Error types for the session layer.

use dicebox_protocol::{PlayerId, SessionId};

/// Errors that can occur while creating sessions or submitting rolls.
///
/// Every variant is reported synchronously by the operation that detected
/// it. Nothing here is retried by the core.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A session needs at least two players.
    #[error("not enough players to start session: {0} (minimum is 2)")]
    NotEnoughPlayers(usize),

    /// More players were asked for than the registry allows per session.
    #[error("too many players for one session: {0} (maximum is {1})")]
    TooManyPlayers(usize, usize),

    /// The registry already runs its maximum number of sessions.
    #[error("max number of sessions reached ({0})")]
    CapacityExceeded(usize),

    /// No running session has this id.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The player has already rolled in this session.
    #[error("player {0} already rolled dice for session {1}")]
    PlayerAlreadyRolled(PlayerId, SessionId),

    /// Every player slot in the session is taken.
    #[error("max number of players for session {0} reached")]
    MaxPlayersReached(SessionId),

    /// The session stopped accepting rolls because it is closing.
    #[error("session {0} is closing and no longer accepts rolls")]
    SessionClosed(SessionId),

    /// The session went away without delivering a result (runtime shutdown).
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),
}
