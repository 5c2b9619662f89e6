//! Registry configuration and the session state machine.

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Upper bound on any session duration, whatever the config says.
///
/// Keeps deadline arithmetic on `Instant` far away from overflow.
pub const DURATION_CEILING: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Upper bound on `max_players`, whatever the config says.
///
/// The session's intake queue is sized to its player count.
pub const PLAYERS_CEILING: usize = 1_000_000;

/// Number of symbols session ids are drawn from (`[A-Za-z0-9]`).
const ID_ALPHABET: usize = 62;

/// Configuration shared by the registry and every session it creates.
///
/// All limits here apply to untrusted input: `create_session` is reachable
/// straight from an HTTP body, so player counts and durations are bounded
/// before anything is allocated or any deadline is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of sessions running at the same time.
    pub max_sessions: usize,

    /// Maximum number of players a single session may be created for.
    pub max_players: usize,

    /// Exclusive upper bound for roll values: rolls land in `0..max_roll`.
    pub max_roll: u32,

    /// Duration used when a session is created with a non-positive one.
    pub default_duration: Duration,

    /// Longest duration a session may ask for. Longer requests are cut
    /// down to this value.
    pub max_duration: Duration,

    /// Length of generated session ids.
    pub id_length: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sessions: 100,
            max_players: 1_000,
            max_roll: 100,
            default_duration: Duration::from_secs(10),
            max_duration: Duration::from_secs(60 * 60),
            id_length: 20,
        }
    }
}

impl RegistryConfig {
    /// Fixes any out-of-range value so the config is safe to use.
    ///
    /// Called by [`SessionRegistry::new`](crate::SessionRegistry::new).
    /// Every adjustment is logged at `warn`. Rules:
    /// - `max_players` lies in `2..=PLAYERS_CEILING`.
    /// - `max_roll` is at least 1 (an empty range cannot be sampled).
    /// - `default_duration` lies in `1s..=DURATION_CEILING`.
    /// - `max_duration` lies in `default_duration..=DURATION_CEILING`.
    /// - `id_length` is at least 1, and long enough that the id space is
    ///   strictly larger than `max_sessions`. Otherwise a full registry
    ///   could never find a free id.
    pub fn validated(mut self) -> Self {
        if self.max_players < 2 {
            tracing::warn!(max_players = self.max_players, "max_players below 2, using 2");
            self.max_players = 2;
        }
        if self.max_players > PLAYERS_CEILING {
            tracing::warn!(
                max_players = self.max_players,
                ceiling = PLAYERS_CEILING,
                "max_players too large, clamping"
            );
            self.max_players = PLAYERS_CEILING;
        }
        if self.max_roll == 0 {
            tracing::warn!("max_roll is 0, using 1");
            self.max_roll = 1;
        }
        if self.default_duration < Duration::from_secs(1) {
            tracing::warn!(
                duration = ?self.default_duration,
                "default_duration below one second, clamping"
            );
            self.default_duration = Duration::from_secs(1);
        }
        if self.default_duration > DURATION_CEILING {
            tracing::warn!(
                duration = ?self.default_duration,
                "default_duration too long, clamping"
            );
            self.default_duration = DURATION_CEILING;
        }
        if self.max_duration < self.default_duration {
            tracing::warn!(
                max_duration = ?self.max_duration,
                default_duration = ?self.default_duration,
                "max_duration shorter than default_duration, raising"
            );
            self.max_duration = self.default_duration;
        }
        if self.max_duration > DURATION_CEILING {
            tracing::warn!(max_duration = ?self.max_duration, "max_duration too long, clamping");
            self.max_duration = DURATION_CEILING;
        }
        if self.id_length == 0 {
            tracing::warn!("id_length is 0, using default");
            self.id_length = Self::default().id_length;
        }
        let requested = self.id_length;
        while !id_space_exceeds(self.id_length, self.max_sessions) {
            self.id_length += 1;
        }
        if self.id_length != requested {
            tracing::warn!(
                requested,
                id_length = self.id_length,
                max_sessions = self.max_sessions,
                "id_length too short for max_sessions, lengthening"
            );
        }
        self
    }

    /// Resolves the requested duration: non-positive seconds select
    /// `default_duration`, anything longer than `max_duration` is cut down
    /// to it.
    pub fn session_duration(&self, duration_secs: i64) -> Duration {
        u64::try_from(duration_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(self.default_duration)
            .min(self.max_duration)
    }
}

/// Returns `true` if ids of `len` symbols can label more than `sessions`
/// sessions.
fn id_space_exceeds(len: usize, sessions: usize) -> bool {
    u32::try_from(len)
        .ok()
        .and_then(|len| ID_ALPHABET.checked_pow(len))
        .is_none_or(|space| space > sessions)
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a session.
///
/// Transitions are strictly ordered:
///
/// ```text
/// Open → Closing → Closed
/// ```
///
/// - **Open**: accepting rolls.
/// - **Closing**: a closing trigger fired; pending rolls are being folded
///   and the winner is being delivered. No new rolls are accepted.
/// - **Closed**: every player has their result; the registry is about to
///   forget the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Open,
    Closing,
    Closed,
}

impl SessionPhase {
    /// Returns `true` if the session accepts new rolls.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns the next phase, or `None` from `Closed`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Open => Some(Self::Closing),
            Self::Closing => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Returns `true` if moving to `target` is a valid transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Closing => write!(f, "Closing"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// CloseReason
// ---------------------------------------------------------------------------

/// Which closing trigger ended a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Every player slot was filled.
    RosterComplete,
    /// The deadline elapsed first.
    DeadlineElapsed,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RosterComplete => write!(f, "roster complete"),
            Self::DeadlineElapsed => write!(f, "deadline elapsed"),
        }
    }
}
