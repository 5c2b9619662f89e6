//! Core protocol types for dicebox's wire format.
//!
//! Everything here is plain data: identifiers, rolls, and the JSON bodies
//! of the two HTTP operations. Field names on the wire follow the
//! historical API (`num_players`, `roll`, `msg`), so serde renames are used
//! where the Rust name reads better.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a player within a session.
///
/// Player ids are chosen by the client (usually a user name) and are only
/// meaningful inside one session: "alice" in session A and "alice" in
/// session B are unrelated.
///
/// `#[serde(transparent)]` serializes this as the bare string, so
/// `PlayerId("alice")` becomes `"alice"` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Creates a player id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the id is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifies a session (one dice round).
///
/// Generated by the server as a random alphanumeric string. Unique among
/// the sessions that are currently running; a closed session's id may be
/// handed out again later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Creates a session id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the id is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Game data
// ---------------------------------------------------------------------------

/// One player's draw in a session.
///
/// Drawn exactly once per player per session and never recomputed.
/// On the wire: `{"player_id": "alice", "roll": 37}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    /// Who rolled.
    pub player_id: PlayerId,
    /// What they rolled, in `0..max_roll`.
    #[serde(rename = "roll")]
    pub value: u32,
}

impl Roll {
    /// Creates a roll.
    pub fn new(player_id: PlayerId, value: u32) -> Self {
        Self { player_id, value }
    }

    /// Returns `true` if this roll should replace `current` as the best
    /// roll. Only a strictly greater value wins, so on a tie the roll that
    /// got there first keeps the lead.
    pub fn beats(&self, current: &Roll) -> bool {
        self.value > current.value
    }
}

/// The public view of a session, returned when it is created.
///
/// On the wire: `{"id": "...", "num_players": 2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// The session's unique id.
    pub id: SessionId,
    /// How many distinct players may roll before the session closes.
    #[serde(rename = "num_players")]
    pub max_players: usize,
}

// ---------------------------------------------------------------------------
// HTTP bodies
// ---------------------------------------------------------------------------

/// Body of `POST /sessions`.
///
/// Both fields default to `0` when missing. A player count below two is
/// rejected by the session core; a non-positive duration is replaced by the
/// server's default. The count is signed so that a negative number reaches
/// the core as "not enough players" rather than as a decode error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Number of players the session waits for.
    #[serde(default)]
    pub num_players: i64,
    /// Seconds until the session closes on its own.
    #[serde(default)]
    pub duration_seconds: i64,
}

/// Body returned by `POST /sessions/{session}/{player}` once the session
/// has closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResponse {
    /// The caller's own roll.
    pub your: Roll,
    /// The session's winning roll.
    pub winner: Roll,
}

impl RollResponse {
    /// Returns `true` if the caller's roll is the winning one.
    pub fn is_winner(&self) -> bool {
        self.your.player_id == self.winner.player_id
    }
}

/// Body of every non-2xx HTTP response.
///
/// On the wire: `{"path": "/sessions", "method": "POST", "code": 400, "msg": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Request path that failed.
    pub path: String,
    /// Request method that failed.
    pub method: String,
    /// HTTP status code, repeated in the body.
    pub code: u16,
    /// Human-readable reason.
    pub msg: String,
}
