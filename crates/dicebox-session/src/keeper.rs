//! The capability the HTTP layer depends on.

use dicebox_protocol::{PlayerId, SessionId, SessionInfo};

use crate::{RollSource, RollTicket, SessionError, SessionRegistry};

/// Creates sessions and accepts rolls.
///
/// The transport layer is generic over this trait so its handlers can be
/// tested against a scripted keeper without running real sessions.
pub trait SessionKeeper: Send + Sync + 'static {
    /// Creates a session for `max_players` players. A non-positive
    /// `duration_secs` selects the keeper's default duration.
    fn create_session(
        &self,
        max_players: usize,
        duration_secs: i64,
    ) -> Result<SessionInfo, SessionError>;

    /// Commits one roll for `player_id` in `session_id`.
    fn submit_roll(
        &self,
        session_id: &SessionId,
        player_id: PlayerId,
    ) -> Result<RollTicket, SessionError>;
}

impl<R: RollSource> SessionKeeper for SessionRegistry<R> {
    fn create_session(
        &self,
        max_players: usize,
        duration_secs: i64,
    ) -> Result<SessionInfo, SessionError> {
        SessionRegistry::create_session(self, max_players, duration_secs)
    }

    fn submit_roll(
        &self,
        session_id: &SessionId,
        player_id: PlayerId,
    ) -> Result<RollTicket, SessionError> {
        SessionRegistry::submit_roll(self, session_id, player_id)
    }
}
