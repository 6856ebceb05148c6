//! Streak transition state machine.
//!
//! The decision of what a check-in does is pure: given the day gap between
//! the last check-in and now, plus the freezes available, produce a
//! [`StreakTransition`]. Applying the transition (row updates, XP awards,
//! milestone badges) is the engine's job; keeping the decision here makes
//! the whole table testable without a database.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// Streak lengths that grant a milestone badge.
pub const STREAK_MILESTONES: [i32; 7] = [3, 7, 14, 30, 60, 100, 365];

/// The milestone reached at exactly this streak length, if any.
pub fn milestone_for(current_streak: i32) -> Option<i32> {
    STREAK_MILESTONES
        .iter()
        .copied()
        .find(|m| *m == current_streak)
}

/// Badge slug for a streak milestone. Must match the badge catalog seed.
pub fn milestone_badge_slug(days: i32) -> Option<&'static str> {
    match days {
        3 => Some("chuoi-3-ngay"),
        7 => Some("mot-tuan-khong-nghi"),
        14 => Some("hai-tuan-lien-tiep"),
        30 => Some("mot-thang-tron-ven"),
        60 => Some("hai-thang-ben-bi"),
        100 => Some("mot-tram-ngay"),
        365 => Some("mot-nam-doc-gia"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Outcome of a check-in relative to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// Already checked in today; nothing changes, no XP.
    SameDay,
    /// Checked in on the very next day; streak grows by one.
    Continued,
    /// Missed at least one day but a freeze covers it; streak preserved.
    FreezeConsumed,
    /// Missed at least one day with no freeze left; streak resets to 1.
    Broken,
}

/// Decide the transition from the day gap and freeze budget.
///
/// `day_gap` is `days_between(last_check_in, now)` under the configured
/// [`DayBoundary`](crate::day::DayBoundary). A negative gap (clock skew,
/// manual fixture rows dated in the future) is treated as the same day so
/// it can never double-award.
pub fn evaluate_transition(day_gap: i64, freezes_available: i32) -> StreakTransition {
    if day_gap <= 0 {
        StreakTransition::SameDay
    } else if day_gap == 1 {
        StreakTransition::Continued
    } else if freezes_available > 0 {
        StreakTransition::FreezeConsumed
    } else {
        StreakTransition::Broken
    }
}

impl StreakTransition {
    /// The streak length after applying this transition to `current`.
    pub fn next_streak(self, current: i32) -> i32 {
        match self {
            Self::SameDay | Self::FreezeConsumed => current,
            Self::Continued => current + 1,
            Self::Broken => 1,
        }
    }
}
