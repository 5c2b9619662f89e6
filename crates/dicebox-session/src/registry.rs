//! Session registry: creates, catalogs, and reclaims running sessions.
//!
//! The registry owns a catalog of every session that is still running,
//! keyed by its id. Creating a session inserts it into the catalog and
//! spawns its control task; the task removes the entry again once the
//! session has closed and delivered its result. Rolls look the session up
//! by id and then talk to the session directly, so the catalog lock is
//! never held while a roll is being committed.
//!
//! # Bounds
//!
//! Both create parameters come straight from clients. `max_players` is
//! checked against [`RegistryConfig::max_players`] before anything is
//! allocated, and the duration is cut down to
//! [`RegistryConfig::max_duration`]. Session ids are drawn at random and
//! retried on collision; [`RegistryConfig::validated`] guarantees the id
//! space is larger than `max_sessions`, so a free id always exists while
//! the registry is below capacity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use dicebox_protocol::{PlayerId, SessionId, SessionInfo};
use tokio::time::Instant;

use crate::session::Session;
use crate::{
    RegistryConfig, RollSource, RollTicket, SessionError, SessionPhase, ThreadRngRoller,
    generate_session_id,
};

/// Point-in-time view of one running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub info: SessionInfo,
    pub phase: SessionPhase,
    /// Number of players that have rolled so far.
    pub players_rolled: usize,
    /// Time left until the deadline fires, zero once it has passed.
    pub remaining: Duration,
}

/// The session catalog, shared with every session task so a closing
/// session can remove itself.
///
/// Session tasks only hold a `Weak` reference: once the last registry
/// clone is dropped, closing sessions find nothing to clean up.
struct Catalog {
    sessions: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl Catalog {
    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<Session>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reclaim(&self, id: &SessionId) {
        let mut sessions = self.lock();
        if sessions.remove(id).is_some() {
            tracing::debug!(
                session_id = %id,
                remaining = sessions.len(),
                "session reclaimed"
            );
        }
    }
}

/// Creates sessions under a capacity limit and routes rolls to them.
///
/// Cheap to clone; clones share the same catalog. Must be used from inside
/// a Tokio runtime because every session runs as its own task.
///
/// # Example
///
/// ```no_run
/// use dicebox_protocol::PlayerId;
/// use dicebox_session::{RegistryConfig, SessionRegistry};
///
/// # async fn demo() -> Result<(), dicebox_session::SessionError> {
/// let registry = SessionRegistry::new(RegistryConfig::default());
/// let info = registry.create_session(2, 10)?;
///
/// let alice = registry.submit_roll(&info.id, PlayerId::from("alice"))?;
/// let _bob = registry.submit_roll(&info.id, PlayerId::from("bob"))?;
///
/// let winner = alice.winner.wait().await?;
/// println!("{} won with {}", winner.player_id, winner.value);
/// # Ok(())
/// # }
/// ```
pub struct SessionRegistry<R: RollSource = ThreadRngRoller> {
    catalog: Arc<Catalog>,
    roller: Arc<R>,
    config: RegistryConfig,
}

impl<R: RollSource> Clone for SessionRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            roller: Arc::clone(&self.roller),
            config: self.config.clone(),
        }
    }
}

impl SessionRegistry<ThreadRngRoller> {
    /// Creates an empty registry that draws rolls from the thread RNG.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_roller(config, ThreadRngRoller)
    }
}

impl<R: RollSource> SessionRegistry<R> {
    /// Creates an empty registry that draws rolls from `roller`.
    pub fn with_roller(config: RegistryConfig, roller: R) -> Self {
        Self {
            catalog: Arc::new(Catalog {
                sessions: Mutex::new(HashMap::new()),
            }),
            roller: Arc::new(roller),
            config: config.validated(),
        }
    }

    /// The (validated) configuration in use.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Creates and starts a session for `max_players` players.
    ///
    /// `duration_secs <= 0` selects the configured default duration, and
    /// anything above `max_duration` is cut down to it. The deadline is
    /// armed before this returns.
    ///
    /// # Errors
    /// - [`SessionError::NotEnoughPlayers`] if `max_players < 2`.
    /// - [`SessionError::TooManyPlayers`] if `max_players` exceeds the
    ///   configured per-session limit.
    /// - [`SessionError::CapacityExceeded`] if `max_sessions` sessions are
    ///   already running.
    pub fn create_session(
        &self,
        max_players: usize,
        duration_secs: i64,
    ) -> Result<SessionInfo, SessionError> {
        if max_players < 2 {
            return Err(SessionError::NotEnoughPlayers(max_players));
        }
        if max_players > self.config.max_players {
            return Err(SessionError::TooManyPlayers(
                max_players,
                self.config.max_players,
            ));
        }

        let duration = self.config.session_duration(duration_secs);

        // Capacity check, id pick and insert happen under one lock so two
        // concurrent creates cannot both take the last slot.
        let mut sessions = self.catalog.lock();
        if sessions.len() >= self.config.max_sessions {
            return Err(SessionError::CapacityExceeded(self.config.max_sessions));
        }

        // Terminates: the id space is larger than `max_sessions`.
        let id = loop {
            let candidate = SessionId::new(generate_session_id(self.config.id_length));
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!(session_id = %candidate, "session id collision, retrying");
        };

        let (session, control) =
            Session::new(id.clone(), max_players, self.config.max_roll, duration);
        let info = session.info();
        sessions.insert(id.clone(), session);
        drop(sessions);

        let catalog: Weak<Catalog> = Arc::downgrade(&self.catalog);
        tokio::spawn(control.run(move |id| {
            if let Some(catalog) = catalog.upgrade() {
                catalog.reclaim(id);
            }
        }));

        tracing::info!(
            session_id = %id,
            max_players,
            duration_secs = duration.as_secs(),
            "session created"
        );
        Ok(info)
    }

    /// Submits a roll for `player_id` in session `session_id`.
    ///
    /// Returns as soon as the roll is committed. The ticket's
    /// [`WinnerHandle`](crate::WinnerHandle) resolves when the session
    /// closes.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] if no running session has this id.
    /// - [`SessionError::PlayerAlreadyRolled`] on a second roll.
    /// - [`SessionError::MaxPlayersReached`] when every slot is taken.
    /// - [`SessionError::SessionClosed`] if the session began closing.
    pub fn submit_roll(
        &self,
        session_id: &SessionId,
        player_id: PlayerId,
    ) -> Result<RollTicket, SessionError> {
        // Release the catalog before touching the session lock.
        let session = self
            .catalog
            .lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;

        session.add_roll(player_id, self.roller.as_ref())
    }

    /// Number of sessions currently running.
    pub fn session_count(&self) -> usize {
        self.catalog.lock().len()
    }

    /// Ids of the sessions currently running, in no particular order.
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.catalog.lock().keys().cloned().collect()
    }

    /// Returns a snapshot of a running session, or `None` if it is unknown
    /// or already reclaimed.
    pub fn snapshot(&self, session_id: &SessionId) -> Option<SessionSnapshot> {
        let session = self.catalog.lock().get(session_id).cloned()?;
        let (phase, players_rolled) = session.progress();
        Some(SessionSnapshot {
            info: session.info(),
            phase,
            players_rolled,
            remaining: session.deadline().saturating_duration_since(Instant::now()),
        })
    }
}

impl<R: RollSource> std::fmt::Debug for SessionRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.session_count())
            .field("config", &self.config)
            .finish()
    }
}
