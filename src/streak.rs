/// Updated win/loss streak after one match. Positive values are consecutive
/// wins, negative values consecutive losses. A result that breaks a streak
/// resets to zero rather than crossing it.
pub fn next_streak(previous: i64, win: bool) -> i64 {
    if win {
        if previous < 0 {
            0
        } else {
            previous + 1
        }
    } else if previous > 0 {
        0
    } else {
        previous - 1
    }
}

/// Milestone notifications fire on every fifth consecutive win or loss.
pub fn is_milestone(streak: i64) -> bool {
    streak != 0 && streak % 5 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wins_extend_a_win_streak() {
        assert_eq!(next_streak(3, true), 4);
        assert_eq!(next_streak(0, true), 1);
    }

    #[test]
    fn losses_extend_a_loss_streak() {
        assert_eq!(next_streak(-2, false), -3);
        assert_eq!(next_streak(0, false), -1);
    }

    #[test]
    fn breaking_a_streak_resets_to_zero() {
        assert_eq!(next_streak(3, false), 0);
        assert_eq!(next_streak(-2, true), 0);
        assert_eq!(next_streak(-17, true), 0);
        assert_eq!(next_streak(12, false), 0);
    }

    #[test]
    fn milestones_fire_on_multiples_of_five_only() {
        assert!(is_milestone(5));
        assert!(is_milestone(-5));
        assert!(is_milestone(10));
        assert!(is_milestone(-15));
        assert!(!is_milestone(0));
        assert!(!is_milestone(3));
        assert!(!is_milestone(7));
        assert!(!is_milestone(-4));
    }
}
