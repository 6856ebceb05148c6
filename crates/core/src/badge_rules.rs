//! Badge rule language and its interpreter.
//!
//! Each badge in the catalog carries one [`BadgeRule`], persisted as a
//! tagged JSON object in the `badges.requirement` column. The enum gives
//! compile-time exhaustiveness over the rule shapes; an unrecognized shape
//! fails deserialization instead of silently never matching.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Leaderboard category a [`BadgeRule::WeeklyTopRank`] rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankCategory {
    Xp,
    Streak,
}

/// A badge requirement. Tagged as `{"type": "...", ...}` in jsonb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BadgeRule {
    /// Granted to everyone at registration.
    Signup,
    /// Granted when the visitor was among the first `within_first` signups.
    EarlyAdopter { within_first: i64 },
    /// Current streak reached `days`.
    StreakDays { days: i32 },
    /// Total posts read reached `count`.
    ReadCount { count: i64 },
    /// Total comments posted reached `count`.
    CommentCount { count: i64 },
    /// Posts read in one category reached `count`.
    ReadInCategory { slug: String, count: i64 },
    /// Visitor level reached `level`.
    ReachLevel { level: i32 },
    /// Placed at or above `rank` on last week's leaderboard.
    WeeklyTopRank { category: RankCategory, rank: i64 },
}

// ---------------------------------------------------------------------------
// Evaluation context
// ---------------------------------------------------------------------------

/// Snapshot of the visitor state a rule is evaluated against.
///
/// Built by the badge engine from ledger counts and the streak/profile
/// rows; optional fields are only populated when some catalog rule needs
/// them (weekly ranks are a leaderboard query, not a ledger count).
#[derive(Debug, Clone, Default)]
pub struct RuleContext {
    pub visitor_id: DbId,
    /// Posts read, from the ledger.
    pub read_count: i64,
    /// Comments posted, from the ledger.
    pub comment_count: i64,
    /// Reactions given, from the ledger.
    pub react_count: i64,
    /// Posts read per category slug.
    pub reads_by_category: HashMap<String, i64>,
    pub current_streak: i32,
    pub level: i32,
    /// 1-based position of this visitor among all signups.
    pub signup_order: i64,
    /// Last week's rank per category, when the caller supplied it.
    pub weekly_xp_rank: Option<i64>,
    pub weekly_streak_rank: Option<i64>,
}

impl BadgeRule {
    /// Whether this rule currently holds for the given context.
    pub fn holds(&self, ctx: &RuleContext) -> bool {
        match self {
            Self::Signup => true,
            Self::EarlyAdopter { within_first } => {
                ctx.signup_order > 0 && ctx.signup_order <= *within_first
            }
            Self::StreakDays { days } => ctx.current_streak >= *days,
            Self::ReadCount { count } => ctx.read_count >= *count,
            Self::CommentCount { count } => ctx.comment_count >= *count,
            Self::ReadInCategory { slug, count } => {
                ctx.reads_by_category.get(slug).copied().unwrap_or(0) >= *count
            }
            Self::ReachLevel { level } => ctx.level >= *level,
            Self::WeeklyTopRank { category, rank } => {
                let position = match category {
                    RankCategory::Xp => ctx.weekly_xp_rank,
                    RankCategory::Streak => ctx.weekly_streak_rank,
                };
                matches!(position, Some(p) if p <= *rank)
            }
        }
    }
}
