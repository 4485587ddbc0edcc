//! Pure scoring formula for answer submissions.
//!
//! Leaderboards depend on these being exact, reproducible integers: the time
//! bonus uses floor, never rounding.

/// Points awarded for any correct answer before bonuses.
const BASE_POINTS: u32 = 250;
/// Points per second left on the clock when the answer was submitted.
const TIME_BONUS_PER_SECOND: u32 = 10;
/// Points per consecutive correct answer beyond the first.
const STREAK_BONUS_STEP: u32 = 50;

/// Outcome of scoring a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    /// Points awarded for this submission.
    pub points: u32,
    /// The player's streak after this submission.
    pub streak: u32,
}

/// Compute the points and new streak for a submission.
///
/// An incorrect answer yields zero points and resets the streak. A correct
/// answer earns the base amount, a floored time bonus proportional to the
/// remaining seconds, and a streak bonus that grows with each consecutive
/// correct answer beyond the first.
pub fn score(is_correct: bool, time_remaining_secs: f64, prior_streak: u32) -> ScoreOutcome {
    if !is_correct {
        return ScoreOutcome {
            points: 0,
            streak: 0,
        };
    }

    let time_bonus = (time_remaining_secs.max(0.0) * TIME_BONUS_PER_SECOND as f64).floor() as u32;
    let streak = prior_streak + 1;
    let streak_bonus = if streak > 1 {
        (streak - 1) * STREAK_BONUS_STEP
    } else {
        0
    };

    ScoreOutcome {
        points: BASE_POINTS + time_bonus + streak_bonus,
        streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incorrect_answer_scores_zero_and_resets_streak() {
        assert_eq!(
            score(false, 6.5, 4),
            ScoreOutcome {
                points: 0,
                streak: 0
            }
        );
    }

    #[test]
    fn correct_answer_earns_base_plus_time_bonus() {
        let outcome = score(true, 5.0, 0);
        assert_eq!(outcome.points, 250 + 50);
        assert_eq!(outcome.streak, 1);
    }

    #[test]
    fn time_bonus_floors_fractional_seconds() {
        assert_eq!(score(true, 6.99, 0).points, 250 + 69);
        assert_eq!(score(true, 0.09, 0).points, 250);
    }

    #[test]
    fn full_answer_window_caps_time_bonus_at_seventy() {
        assert_eq!(score(true, 7.0, 0).points, 250 + 70);
    }

    #[test]
    fn streak_bonus_starts_on_second_consecutive_correct() {
        assert_eq!(score(true, 0.0, 0).points, 250);
        assert_eq!(score(true, 0.0, 1).points, 250 + 50);
        assert_eq!(score(true, 0.0, 2).points, 250 + 100);
    }

    #[test]
    fn negative_time_remaining_is_clamped() {
        assert_eq!(score(true, -1.0, 0).points, 250);
    }

    #[test]
    fn score_is_strictly_increasing_in_time_and_streak() {
        let mut last = 0;
        for tenths in 0..70 {
            let points = score(true, tenths as f64 / 10.0, 0).points;
            assert!(points >= last);
            last = points;
        }
        for streak in 1..10 {
            assert!(score(true, 3.0, streak).points > score(true, 3.0, streak - 1).points);
        }
    }
}
