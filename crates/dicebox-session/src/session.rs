//! A single dice session: shared state plus one control task.
//!
//! Roll submission and the closing decision meet at the session lock.
//! `add_roll` validates and commits under that lock and returns at once;
//! the control task folds committed rolls into the best roll and, on the
//! first closing trigger, takes the same lock to stop intake, drain what is
//! still queued, and hand the winner to every player.
//!
//! # Channels
//!
//! | channel       | kind              | carries                         |
//! |---------------|-------------------|---------------------------------|
//! | intake        | `mpsc`, bounded   | committed rolls, one per player |
//! | roster full   | `oneshot`         | fired by the last player slot   |
//! | winner        | `oneshot` per player | the winning roll at close    |
//!
//! The intake queue is sized to `max_players`, so a committed roll never
//! waits for queue space while the session lock is held. The registry has
//! already bounded `max_players` and the duration by the time a session is
//! built here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dicebox_protocol::{PlayerId, Roll, SessionId, SessionInfo};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};

use crate::{CloseReason, RollSource, SessionError, SessionPhase};

// ---------------------------------------------------------------------------
// Caller-facing handles
// ---------------------------------------------------------------------------

/// Resolves once, with the session's winning roll.
///
/// Every player that rolled successfully holds one. The session delivers
/// into it when it closes, whether the roster filled up or the deadline
/// passed.
#[derive(Debug)]
pub struct WinnerHandle {
    session_id: SessionId,
    receiver: oneshot::Receiver<Roll>,
}

impl WinnerHandle {
    /// Wraps the receiving half of a one-shot winner channel.
    pub fn new(session_id: SessionId, receiver: oneshot::Receiver<Roll>) -> Self {
        Self {
            session_id,
            receiver,
        }
    }

    /// The session this handle belongs to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Waits for the session to close and returns the winning roll.
    ///
    /// # Errors
    /// [`SessionError::Unavailable`] if the session task went away without
    /// delivering, which only happens when the runtime shuts down.
    pub async fn wait(self) -> Result<Roll, SessionError> {
        let Self {
            session_id,
            receiver,
        } = self;
        receiver
            .await
            .map_err(|_| SessionError::Unavailable(session_id))
    }

    /// Returns the winner if it has already been delivered.
    pub fn try_winner(&mut self) -> Option<Roll> {
        self.receiver.try_recv().ok()
    }
}

/// The result of a successful roll submission.
#[derive(Debug)]
pub struct RollTicket {
    /// The caller's committed roll.
    pub roll: Roll,
    /// Resolves to the winning roll when the session closes.
    pub winner: WinnerHandle,
}

// ---------------------------------------------------------------------------
// Shared session state
// ---------------------------------------------------------------------------

/// Mutable state guarded by the session lock.
struct SessionState {
    phase: SessionPhase,
    /// One entry per player who rolled. The sender delivers their result.
    players: HashMap<PlayerId, oneshot::Sender<Roll>>,
    /// Intake queue towards the control task, sized to `max_players`.
    rolls: mpsc::Sender<Roll>,
    /// Fired once when the last player slot is taken.
    roster_full: Option<oneshot::Sender<()>>,
}

/// The part of a session the registry holds on to.
pub(crate) struct Session {
    id: SessionId,
    max_players: usize,
    max_roll: u32,
    deadline: Instant,
    state: Mutex<SessionState>,
}

/// The receiving ends owned by the control task.
pub(crate) struct SessionLoop {
    session: Arc<Session>,
    rolls: mpsc::Receiver<Roll>,
    roster_full: oneshot::Receiver<()>,
}

impl Session {
    /// Builds a session and its (not yet running) control loop.
    ///
    /// The deadline is armed now; the caller registers the session and then
    /// spawns [`SessionLoop::run`].
    pub(crate) fn new(
        id: SessionId,
        max_players: usize,
        max_roll: u32,
        duration: Duration,
    ) -> (Arc<Self>, SessionLoop) {
        let (rolls_tx, rolls_rx) = mpsc::channel(max_players.max(1));
        let (full_tx, full_rx) = oneshot::channel();

        let session = Arc::new(Self {
            id,
            max_players,
            max_roll,
            deadline: Instant::now() + duration,
            state: Mutex::new(SessionState {
                phase: SessionPhase::Open,
                players: HashMap::new(),
                rolls: rolls_tx,
                roster_full: Some(full_tx),
            }),
        });

        let control = SessionLoop {
            session: Arc::clone(&session),
            rolls: rolls_rx,
            roster_full: full_rx,
        };
        (session, control)
    }

    pub(crate) fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            max_players: self.max_players,
        }
    }

    pub(crate) fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Current phase and number of players who rolled.
    pub(crate) fn progress(&self) -> (SessionPhase, usize) {
        let state = self.lock();
        (state.phase, state.players.len())
    }

    /// Commits a roll for `player_id`.
    ///
    /// Draws the value, stores the player's result sender, queues the roll
    /// for the control task, and fires the roster trigger on the last slot.
    /// Never waits on anything but the session lock.
    pub(crate) fn add_roll<R: RollSource + ?Sized>(
        &self,
        player_id: PlayerId,
        roller: &R,
    ) -> Result<RollTicket, SessionError> {
        let mut state = self.lock();

        if !state.phase.is_open() {
            return Err(SessionError::SessionClosed(self.id.clone()));
        }
        if state.players.contains_key(&player_id) {
            return Err(SessionError::PlayerAlreadyRolled(player_id, self.id.clone()));
        }
        // Two rolls racing for the last slot: the second one lands here.
        if state.players.len() >= self.max_players {
            return Err(SessionError::MaxPlayersReached(self.id.clone()));
        }

        let roll = Roll::new(player_id.clone(), roller.roll(self.max_roll));

        // At most one roll per player slot, so the queue has room while open.
        state
            .rolls
            .try_send(roll.clone())
            .map_err(|_| SessionError::Unavailable(self.id.clone()))?;

        let (result_tx, result_rx) = oneshot::channel();
        state.players.insert(player_id, result_tx);

        tracing::debug!(
            session_id = %self.id,
            player_id = %roll.player_id,
            roll = roll.value,
            players = state.players.len(),
            "roll committed"
        );

        if state.players.len() == self.max_players {
            if let Some(full) = state.roster_full.take() {
                let _ = full.send(());
            }
        }

        Ok(RollTicket {
            winner: WinnerHandle::new(self.id.clone(), result_rx),
            roll,
        })
    }

    /// Stops intake, folds whatever is still queued, and delivers the
    /// winner to every player. Runs entirely under the session lock so no
    /// roll can be committed between the drain and the broadcast.
    fn close(
        &self,
        rolls: &mut mpsc::Receiver<Roll>,
        mut highest: Option<Roll>,
    ) -> Option<Roll> {
        let mut state = self.lock();
        debug_assert!(state.phase.can_transition_to(SessionPhase::Closing));
        state.phase = SessionPhase::Closing;

        while let Ok(roll) = rolls.try_recv() {
            fold(&mut highest, roll);
        }

        let players = std::mem::take(&mut state.players);
        if let Some(winner) = &highest {
            for (player_id, result) in players {
                if result.send(winner.clone()).is_err() {
                    tracing::debug!(
                        session_id = %self.id,
                        %player_id,
                        "player stopped waiting for the result"
                    );
                }
            }
        } else {
            debug_assert!(players.is_empty(), "every player queued a roll");
        }

        state.phase = SessionPhase::Closed;
        highest
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionLoop {
    /// Runs the control loop until the session closes, then calls
    /// `on_closed` with the session id.
    ///
    /// Waits on three events at once: a queued roll, the roster trigger,
    /// and the deadline. Queued rolls are taken first when several are
    /// ready, and the loop ends on the first closing trigger.
    pub(crate) async fn run<F>(self, on_closed: F) -> Option<Roll>
    where
        F: FnOnce(&SessionId) + Send,
    {
        let Self {
            session,
            mut rolls,
            mut roster_full,
        } = self;

        tracing::info!(
            session_id = %session.id,
            max_players = session.max_players,
            "session opened"
        );

        let deadline = time::sleep_until(session.deadline);
        tokio::pin!(deadline);

        let mut highest: Option<Roll> = None;
        let reason = loop {
            tokio::select! {
                biased;
                Some(roll) = rolls.recv() => fold(&mut highest, roll),
                _ = &mut roster_full => break CloseReason::RosterComplete,
                () = &mut deadline => break CloseReason::DeadlineElapsed,
            }
        };

        let winner = session.close(&mut rolls, highest);

        match &winner {
            Some(roll) => tracing::info!(
                session_id = %session.id,
                %reason,
                winner = %roll.player_id,
                roll = roll.value,
                "session closed"
            ),
            None => tracing::info!(
                session_id = %session.id,
                %reason,
                "session closed without rolls"
            ),
        }

        on_closed(&session.id);
        winner
    }
}

/// Replaces `highest` with `roll` if there is no best roll yet or `roll`
/// is strictly greater.
fn fold(highest: &mut Option<Roll>, roll: Roll) {
    match highest {
        Some(best) if !roll.beats(best) => {}
        _ => *highest = Some(roll),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Hands out a fixed sequence of values, then zeros.
    struct Scripted {
        values: Vec<u32>,
        next: AtomicUsize,
    }

    impl Scripted {
        fn new(values: &[u32]) -> Self {
            Self {
                values: values.to_vec(),
                next: AtomicUsize::new(0),
            }
        }
    }

    impl RollSource for Scripted {
        fn roll(&self, _max: u32) -> u32 {
            let i = self.next.fetch_add(1, Ordering::Relaxed);
            self.values.get(i).copied().unwrap_or(0)
        }
    }

    fn pid(name: &str) -> PlayerId {
        PlayerId::from(name)
    }

    fn roll(name: &str, value: u32) -> Roll {
        Roll::new(pid(name), value)
    }

    fn new_session(max_players: usize) -> (Arc<Session>, SessionLoop) {
        Session::new(
            SessionId::from("s1"),
            max_players,
            100,
            Duration::from_secs(10),
        )
    }

    // =====================================================================
    // fold()
    // =====================================================================

    #[test]
    fn test_fold_first_roll_always_becomes_highest() {
        let mut highest = None;
        fold(&mut highest, roll("alice", 0));
        assert_eq!(highest, Some(roll("alice", 0)));
    }

    #[test]
    fn test_fold_keeps_first_on_tie() {
        let mut highest = Some(roll("alice", 50));
        fold(&mut highest, roll("bob", 50));
        assert_eq!(highest, Some(roll("alice", 50)));
    }

    #[test]
    fn test_fold_replaces_on_strictly_greater() {
        let mut highest = Some(roll("alice", 50));
        fold(&mut highest, roll("bob", 51));
        fold(&mut highest, roll("carol", 10));
        assert_eq!(highest, Some(roll("bob", 51)));
    }

    // =====================================================================
    // add_roll()
    // =====================================================================

    #[tokio::test]
    async fn test_add_roll_returns_committed_roll() {
        let (session, _control) = new_session(3);
        let dice = Scripted::new(&[42]);

        let ticket = session.add_roll(pid("alice"), &dice).unwrap();

        assert_eq!(ticket.roll, roll("alice", 42));
        assert_eq!(ticket.winner.session_id(), &SessionId::from("s1"));
        assert_eq!(session.progress(), (SessionPhase::Open, 1));
    }

    #[tokio::test]
    async fn test_add_roll_same_player_twice_rejected() {
        let (session, _control) = new_session(3);
        let dice = Scripted::new(&[1, 2]);

        session.add_roll(pid("alice"), &dice).unwrap();
        let result = session.add_roll(pid("alice"), &dice);

        assert!(matches!(
            result,
            Err(SessionError::PlayerAlreadyRolled(p, _)) if p == pid("alice")
        ));
        assert_eq!(session.progress().1, 1);
    }

    #[tokio::test]
    async fn test_add_roll_beyond_max_players_rejected() {
        let (session, _control) = new_session(2);
        let dice = Scripted::new(&[1, 2, 3]);

        session.add_roll(pid("alice"), &dice).unwrap();
        session.add_roll(pid("bob"), &dice).unwrap();
        let result = session.add_roll(pid("carol"), &dice);

        assert!(matches!(result, Err(SessionError::MaxPlayersReached(_))));
    }

    #[tokio::test]
    async fn test_add_roll_last_slot_fires_roster_trigger() {
        let (session, mut control) = new_session(2);
        let dice = Scripted::new(&[1, 2]);

        session.add_roll(pid("alice"), &dice).unwrap();
        assert!(control.roster_full.try_recv().is_err(), "not full yet");

        session.add_roll(pid("bob"), &dice).unwrap();
        assert!(control.roster_full.try_recv().is_ok(), "roster complete");
    }

    // =====================================================================
    // run() / close()
    // =====================================================================

    #[tokio::test]
    async fn test_run_full_roster_delivers_highest_to_all() {
        let (session, control) = new_session(2);
        let dice = Scripted::new(&[37, 82]);

        let alice = session.add_roll(pid("alice"), &dice).unwrap();
        let bob = session.add_roll(pid("bob"), &dice).unwrap();

        let (closed_tx, closed_rx) = oneshot::channel();
        let winner = control
            .run(move |id| {
                let _ = closed_tx.send(id.clone());
            })
            .await;

        assert_eq!(winner, Some(roll("bob", 82)));
        assert_eq!(alice.winner.wait().await.unwrap(), roll("bob", 82));
        assert_eq!(bob.winner.wait().await.unwrap(), roll("bob", 82));
        assert_eq!(closed_rx.await.unwrap(), SessionId::from("s1"));
        assert_eq!(session.progress(), (SessionPhase::Closed, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_deadline_closes_partial_roster() {
        let (session, control) = new_session(5);
        let dice = Scripted::new(&[30, 60]);

        let alice = session.add_roll(pid("alice"), &dice).unwrap();
        let bob = session.add_roll(pid("bob"), &dice).unwrap();

        let winner = control.run(|_| {}).await;

        assert_eq!(winner, Some(roll("bob", 60)));
        assert_eq!(alice.winner.wait().await.unwrap(), roll("bob", 60));
        assert_eq!(bob.winner.wait().await.unwrap(), roll("bob", 60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_deadline_without_rolls_has_no_winner() {
        let (session, control) = new_session(3);

        let winner = control.run(|_| {}).await;

        assert_eq!(winner, None);
        assert_eq!(session.progress(), (SessionPhase::Closed, 0));
    }

    #[tokio::test]
    async fn test_close_drains_queued_rolls() {
        // Rolls still sitting in the queue when the trigger wins the race
        // are folded before the winner is chosen.
        let (session, mut control) = new_session(3);
        let dice = Scripted::new(&[10, 99]);

        let alice = session.add_roll(pid("alice"), &dice).unwrap();
        let bob = session.add_roll(pid("bob"), &dice).unwrap();

        let winner = session.close(&mut control.rolls, None);

        assert_eq!(winner, Some(roll("bob", 99)));
        assert_eq!(alice.winner.wait().await.unwrap(), roll("bob", 99));
        assert_eq!(bob.winner.wait().await.unwrap(), roll("bob", 99));
    }

    #[tokio::test]
    async fn test_add_roll_after_close_rejected() {
        let (session, mut control) = new_session(3);
        let dice = Scripted::new(&[10, 20]);

        session.add_roll(pid("alice"), &dice).unwrap();
        session.close(&mut control.rolls, None);

        let result = session.add_roll(pid("bob"), &dice);
        assert!(matches!(result, Err(SessionError::SessionClosed(_))));
    }

    #[tokio::test]
    async fn test_close_with_dropped_handle_still_delivers_to_others() {
        let (session, mut control) = new_session(3);
        let dice = Scripted::new(&[10, 20]);

        let alice = session.add_roll(pid("alice"), &dice).unwrap();
        drop(session.add_roll(pid("bob"), &dice).unwrap());

        session.close(&mut control.rolls, None);

        assert_eq!(alice.winner.wait().await.unwrap(), roll("bob", 20));
    }

    #[tokio::test]
    async fn test_winner_handle_unavailable_when_sender_dropped() {
        let (tx, rx) = oneshot::channel::<Roll>();
        drop(tx);
        let handle = WinnerHandle::new(SessionId::from("gone"), rx);

        let result = handle.wait().await;

        assert!(matches!(result, Err(SessionError::Unavailable(id)) if id.as_str() == "gone"));
    }

    #[tokio::test]
    async fn test_try_winner_before_and_after_delivery() {
        let (tx, rx) = oneshot::channel();
        let mut handle = WinnerHandle::new(SessionId::from("s"), rx);

        assert_eq!(handle.try_winner(), None);
        tx.send(roll("alice", 5)).unwrap();
        assert_eq!(handle.try_winner(), Some(roll("alice", 5)));
    }
}
