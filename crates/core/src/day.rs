//! Calendar-day boundary policy.
//!
//! Streaks and daily tasks compare timestamps by calendar day. Which
//! calendar is a deployment decision: UTC by default, or a fixed offset
//! for sites serving a single timezone (e.g. `+420` minutes for Vietnam).
//! Every day comparison in the engine goes through this module so the
//! policy is applied consistently.

use chrono::{FixedOffset, NaiveDate};

use crate::types::Timestamp;

/// How timestamps are truncated to calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBoundary {
    /// Days roll over at UTC midnight.
    Utc,
    /// Days roll over at midnight in a fixed offset, in minutes east of
    /// UTC. Offset must be within ±24h or construction panics at startup.
    FixedOffsetMinutes(i32),
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::Utc
    }
}

impl DayBoundary {
    /// Truncate a timestamp to its calendar day under this policy.
    pub fn day_of(self, ts: Timestamp) -> NaiveDate {
        match self {
            Self::Utc => ts.date_naive(),
            Self::FixedOffsetMinutes(minutes) => {
                let offset = FixedOffset::east_opt(minutes * 60)
                    .expect("day boundary offset out of range");
                ts.with_timezone(&offset).date_naive()
            }
        }
    }

    /// Whole days from `a`'s day to `b`'s day (positive when `b` is later).
    pub fn days_between(self, a: Timestamp, b: Timestamp) -> i64 {
        (self.day_of(b) - self.day_of(a)).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> Timestamp {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn utc_same_day() {
        let policy = DayBoundary::Utc;
        assert_eq!(
            policy.days_between(ts("2024-03-01 00:00:01"), ts("2024-03-01 23:59:59")),
            0
        );
    }

    #[test]
    fn utc_rollover_at_midnight() {
        let policy = DayBoundary::Utc;
        assert_eq!(
            policy.days_between(ts("2024-03-01 23:59:59"), ts("2024-03-02 00:00:01")),
            1
        );
    }

    #[test]
    fn fixed_offset_shifts_the_boundary() {
        // UTC+7: 18:00 UTC on the 1st is already 01:00 on the 2nd locally.
        let policy = DayBoundary::FixedOffsetMinutes(420);
        assert_eq!(
            policy.day_of(ts("2024-03-01 18:00:00")),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
        // Two instants on different UTC days, same local day.
        assert_eq!(
            policy.days_between(ts("2024-03-01 18:00:00"), ts("2024-03-02 10:00:00")),
            0
        );
    }

    #[test]
    fn gap_of_several_days() {
        let policy = DayBoundary::Utc;
        assert_eq!(
            policy.days_between(ts("2024-03-01 12:00:00"), ts("2024-03-05 12:00:00")),
            4
        );
    }
}
