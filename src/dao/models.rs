//! Backend-agnostic entities handed to the persistence layer.

use time::OffsetDateTime;
use uuid::Uuid;

/// One player's finished-game record, written once at game over.
///
/// Mirrors the leaderboard schema consumed downstream: placement and accuracy
/// are denormalised here so ranking queries never need the room state.
#[derive(Debug, Clone, PartialEq)]
pub struct GameResultEntity {
    /// Durable account identifier of the player.
    pub user_id: Uuid,
    /// Final score for this game.
    pub score: u32,
    /// Game mode label, always "multiplayer" for room games.
    pub game_mode: String,
    /// Content source the game was played with.
    pub playlist: String,
    /// Rounds answered correctly.
    pub correct_answers: u32,
    /// Total rounds played.
    pub total_questions: u32,
    /// Correct answers as a percentage of total rounds.
    pub accuracy: f64,
    /// Code of the room the game was played in.
    pub room_code: String,
    /// 1-based final placement.
    pub placement: u32,
    /// Number of players ranked in this game.
    pub total_players: u32,
    /// Timestamp the result was recorded.
    pub recorded_at: OffsetDateTime,
}

impl GameResultEntity {
    /// Accuracy percentage for a correct/total pair, rounded to two decimals
    /// the way the leaderboard stores it.
    pub fn accuracy_percent(correct_answers: u32, total_questions: u32) -> f64 {
        if total_questions == 0 {
            return 0.0;
        }
        let raw = correct_answers as f64 / total_questions as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_rounds_to_two_decimals() {
        assert_eq!(GameResultEntity::accuracy_percent(2, 3), 66.67);
        assert_eq!(GameResultEntity::accuracy_percent(7, 7), 100.0);
        assert_eq!(GameResultEntity::accuracy_percent(0, 0), 0.0);
    }
}
