use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

/// Derived streak values. Never mutated in place — always replaced by a full
/// recomputation from entry history, which is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakState {
    pub current_streak: i32,
    pub best_streak: i32,
    pub last_active_date: Option<NaiveDate>,
}

/// Collapse an unordered, possibly duplicated list of activity dates into
/// the user's streak state. A morning and an evening entry on the same day
/// count as one active day.
///
/// The current streak is the run of consecutive calendar days ending at the
/// most recent activity date. Day steps are calendar arithmetic, not elapsed
/// hours, so DST transitions can't produce off-by-one runs. The best streak
/// only ever grows: `max(previous_best, current)`.
pub fn compute_streak(activity_dates: &[NaiveDate], previous_best: i32) -> StreakState {
    let unique: BTreeSet<NaiveDate> = activity_dates.iter().copied().collect();

    let Some(&most_recent) = unique.iter().next_back() else {
        return StreakState {
            current_streak: 0,
            best_streak: previous_best,
            last_active_date: None,
        };
    };

    let mut current = 0i32;
    let mut expected = most_recent;
    for &date in unique.iter().rev() {
        if date != expected {
            break;
        }
        current += 1;
        expected -= chrono::Duration::days(1);
    }

    StreakState {
        current_streak: current,
        best_streak: previous_best.max(current),
        last_active_date: Some(most_recent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_history_means_no_streak() {
        let state = compute_streak(&[], 4);
        assert_eq!(
            state,
            StreakState {
                current_streak: 0,
                best_streak: 4,
                last_active_date: None,
            }
        );
    }

    #[test]
    fn consecutive_days_count() {
        let dates = [date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)];
        let state = compute_streak(&dates, 0);
        assert_eq!(state.current_streak, 3);
        assert_eq!(state.best_streak, 3);
        assert_eq!(state.last_active_date, Some(date(2024, 1, 3)));
    }

    #[test]
    fn gap_breaks_the_chain() {
        let dates = [date(2024, 1, 1), date(2024, 1, 3)];
        let state = compute_streak(&dates, 0);
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.last_active_date, Some(date(2024, 1, 3)));
    }

    #[test]
    fn duplicate_dates_count_once() {
        // Morning and evening entries on the same day.
        let dates = [date(2024, 2, 10), date(2024, 2, 10)];
        let state = compute_streak(&dates, 0);
        assert_eq!(state.current_streak, 1);
    }

    #[test]
    fn duplicates_inside_a_run_do_not_inflate_it() {
        let dates = [
            date(2024, 2, 9),
            date(2024, 2, 10),
            date(2024, 2, 10),
            date(2024, 2, 11),
        ];
        let state = compute_streak(&dates, 0);
        assert_eq!(state.current_streak, 3);
    }

    #[test]
    fn input_order_is_irrelevant() {
        let dates = [date(2024, 1, 3), date(2024, 1, 1), date(2024, 1, 2)];
        assert_eq!(compute_streak(&dates, 0).current_streak, 3);
    }

    #[test]
    fn best_streak_never_decreases() {
        let dates = [date(2024, 3, 1), date(2024, 3, 2)];
        let state = compute_streak(&dates, 9);
        assert_eq!(state.current_streak, 2);
        assert_eq!(state.best_streak, 9);
    }

    #[test]
    fn best_streak_grows_with_current() {
        let dates = [
            date(2024, 3, 1),
            date(2024, 3, 2),
            date(2024, 3, 3),
            date(2024, 3, 4),
        ];
        let state = compute_streak(&dates, 2);
        assert_eq!(state.best_streak, 4);
    }

    #[test]
    fn old_runs_do_not_extend_the_current_streak() {
        let dates = [
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 10),
        ];
        let state = compute_streak(&dates, 0);
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.last_active_date, Some(date(2024, 1, 10)));
    }

    #[test]
    fn month_rollover_is_calendar_based() {
        let dates = [date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)];
        assert_eq!(compute_streak(&dates, 0).current_streak, 3);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let dates = [date(2024, 5, 1), date(2024, 5, 2), date(2024, 5, 3)];
        let first = compute_streak(&dates, 0);
        let second = compute_streak(&dates, first.best_streak);
        assert_eq!(first, second);
    }
}
