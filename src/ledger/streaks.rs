//! Streak tracking
//!
//! A streak is a run of consecutive UTC days with at least one ledger entry.

use chrono::NaiveDate;

/// Current and best streak for one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakInfo {
    pub current: u32,
    pub best: u32,
    pub last_activity_day: Option<NaiveDate>,
}

impl StreakInfo {
    /// Active if the last activity was today or yesterday
    pub fn is_active(&self, today: NaiveDate) -> bool {
        let Some(last) = self.last_activity_day else {
            return false;
        };
        (today - last).num_days() <= 1
    }

    /// Compute streaks from the active days of a user.
    ///
    /// `days` need not be sorted or unique. The current streak only counts
    /// when it is still active relative to `today`.
    pub fn from_days(days: &[NaiveDate], today: NaiveDate) -> Self {
        let mut days: Vec<NaiveDate> = days.iter().copied().filter(|d| *d <= today).collect();
        days.sort();
        days.dedup();

        let Some(&last) = days.last() else {
            return Self::default();
        };

        let mut best = 1u32;
        let mut run = 1u32;
        for pair in days.windows(2) {
            if (pair[1] - pair[0]).num_days() == 1 {
                run += 1;
            } else {
                run = 1;
            }
            best = best.max(run);
        }

        // `run` is the length of the run that ends on `last`
        let info = Self {
            current: run,
            best,
            last_activity_day: Some(last),
        };
        if info.is_active(today) {
            info
        } else {
            Self { current: 0, ..info }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let info = StreakInfo::from_days(&[], d(10));
        assert_eq!(info, StreakInfo::default());
        assert!(!info.is_active(d(10)));
    }

    #[test]
    fn test_current_run_ending_yesterday_counts() {
        let info = StreakInfo::from_days(&[d(7), d(8), d(9), d(9)], d(10));
        assert_eq!(info.current, 3);
        assert_eq!(info.best, 3);
    }

    #[test]
    fn test_broken_streak_keeps_best() {
        let info = StreakInfo::from_days(&[d(1), d(2), d(3), d(4), d(8)], d(10));
        assert_eq!(info.current, 0);
        assert_eq!(info.best, 4);
        assert!(info.current <= info.best);
    }

    #[test]
    fn test_unsorted_input() {
        let info = StreakInfo::from_days(&[d(10), d(8), d(9)], d(10));
        assert_eq!(info.current, 3);
        assert_eq!(info.last_activity_day, Some(d(10)));
    }
}
