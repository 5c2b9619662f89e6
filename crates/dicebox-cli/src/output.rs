//! Lines printed for command results.

use dicebox_protocol::{RollResponse, SessionInfo};

/// Output of `dicebox new`: the bare session id, so it can be piped.
pub fn session_created(info: &SessionInfo) -> String {
    info.id.to_string()
}

/// Output of `dicebox roll`.
pub fn roll_outcome(response: &RollResponse) -> String {
    if response.is_winner() {
        format!("You won with: {}", response.your.value)
    } else {
        format!(
            "{} won with: {}, you rolled: {}",
            response.winner.player_id, response.winner.value, response.your.value
        )
    }
}

#[cfg(test)]
mod tests {
    use dicebox_protocol::{PlayerId, Roll, SessionId};

    use super::*;

    fn roll(name: &str, value: u32) -> Roll {
        Roll::new(PlayerId::from(name), value)
    }

    #[test]
    fn test_session_created_prints_bare_id() {
        let info = SessionInfo {
            id: SessionId::from("AbC123"),
            max_players: 2,
        };
        assert_eq!(session_created(&info), "AbC123");
    }

    #[test]
    fn test_roll_outcome_winner() {
        let response = RollResponse {
            your: roll("alice", 82),
            winner: roll("alice", 82),
        };
        assert_eq!(roll_outcome(&response), "You won with: 82");
    }

    #[test]
    fn test_roll_outcome_loser() {
        let response = RollResponse {
            your: roll("alice", 37),
            winner: roll("bob", 82),
        };
        assert_eq!(roll_outcome(&response), "bob won with: 82, you rolled: 37");
    }

    #[test]
    fn test_roll_outcome_tie_lost_to_earlier_roll() {
        let response = RollResponse {
            your: roll("bob", 50),
            winner: roll("alice", 50),
        };
        assert_eq!(roll_outcome(&response), "alice won with: 50, you rolled: 50");
    }
}
