//! Action catalog and the fixed action → XP reward table.
//!
//! Every XP-earning event is tagged with a [`PointAction`]. Actions in the
//! first group have a fixed reward looked up from the table; actions in the
//! second group (bonuses and rewards whose value is computed elsewhere)
//! require an explicit point override at award time.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fixed rewards
// ---------------------------------------------------------------------------

/// XP for reading a post.
pub const XP_READ: i32 = 10;
/// XP for posting a comment.
pub const XP_COMMENT: i32 = 15;
/// XP for reacting to a post.
pub const XP_REACT: i32 = 5;
/// XP for the daily login check-in (before the streak bonus).
pub const XP_LOGIN: i32 = 10;
/// XP for a visitor's very first action (granted at registration).
pub const XP_FIRST_ACTION: i32 = 25;

/// Extra XP per day of streak length, added on a continued streak.
pub const STREAK_BONUS_PER_DAY: i32 = 2;

/// XP for completing every daily task in one day.
pub const ALL_TASKS_BONUS_XP: i32 = 50;

/// Streak freezes a brand-new visitor starts with.
pub const NEW_VISITOR_FREEZES: i32 = 2;

// ---------------------------------------------------------------------------
// PointAction
// ---------------------------------------------------------------------------

/// The reason a point transaction was recorded.
///
/// Serialized in `snake_case`; the same strings are stored in the
/// `point_transactions.action` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointAction {
    Read,
    Comment,
    React,
    Login,
    StreakBonus,
    DailyTask,
    BadgeEarned,
    LevelUp,
    FirstAction,
}

impl PointAction {
    /// Stable string form, as stored in the ledger.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Comment => "comment",
            Self::React => "react",
            Self::Login => "login",
            Self::StreakBonus => "streak_bonus",
            Self::DailyTask => "daily_task",
            Self::BadgeEarned => "badge_earned",
            Self::LevelUp => "level_up",
            Self::FirstAction => "first_action",
        }
    }

    /// Fixed reward from the action table, or `None` for actions whose
    /// value is computed by the caller (bonuses, badge rewards).
    pub fn fixed_reward(self) -> Option<i32> {
        match self {
            Self::Read => Some(XP_READ),
            Self::Comment => Some(XP_COMMENT),
            Self::React => Some(XP_REACT),
            Self::Login => Some(XP_LOGIN),
            Self::FirstAction => Some(XP_FIRST_ACTION),
            Self::StreakBonus | Self::DailyTask | Self::BadgeEarned | Self::LevelUp => None,
        }
    }
}

impl std::str::FromStr for PointAction {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "comment" => Ok(Self::Comment),
            "react" => Ok(Self::React),
            "login" => Ok(Self::Login),
            "streak_bonus" => Ok(Self::StreakBonus),
            "daily_task" => Ok(Self::DailyTask),
            "badge_earned" => Ok(Self::BadgeEarned),
            "level_up" => Ok(Self::LevelUp),
            "first_action" => Ok(Self::FirstAction),
            other => Err(crate::error::CoreError::Validation(format!(
                "Unknown point action: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for PointAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
