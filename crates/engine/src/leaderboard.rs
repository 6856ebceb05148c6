//! Ranked leaderboard snapshots.

use serde::{Deserialize, Serialize};
use viblog_core::types::{DbId, Timestamp};
use viblog_db::models::leaderboard::LeaderboardRow;
use viblog_db::repositories::LeaderboardRepo;

use crate::{EngineResult, GamificationEngine};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Time window a ranking is computed over.
///
/// Weekly and monthly are rolling windows (7 / 30 days back from now)
/// over ledger timestamps; all-time reads the materialized totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Weekly,
    Monthly,
    Alltime,
}

impl Period {
    /// Start of the window, or `None` for all-time.
    pub fn start(self, now: Timestamp) -> Option<Timestamp> {
        match self {
            Self::Weekly => Some(now - chrono::Duration::days(7)),
            Self::Monthly => Some(now - chrono::Duration::days(30)),
            Self::Alltime => None,
        }
    }
}

/// Scoring category of a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Xp,
    Streak,
}

/// Default and maximum window sizes.
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// A leaderboard snapshot.
///
/// `viewer_rank` is populated only when a viewer was supplied, appears on
/// the board, and falls outside the returned window.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResult {
    pub period: Period,
    pub category: Category,
    pub entries: Vec<LeaderboardRow>,
    pub viewer_rank: Option<LeaderboardRow>,
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

impl GamificationEngine {
    /// Compute a ranking snapshot.
    ///
    /// Ordering is value descending with visitor id ascending as the
    /// tie-break, so a fixed snapshot yields a strict total order and
    /// reproducible ranks 1..n. Read-only; staleness against concurrent
    /// writes is acceptable.
    pub async fn leaderboard(
        &self,
        period: Period,
        category: Category,
        limit: Option<i64>,
        viewer: Option<DbId>,
    ) -> EngineResult<LeaderboardResult> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let now = chrono::Utc::now();

        let entries = match (category, period.start(now)) {
            (Category::Xp, None) => LeaderboardRepo::top_by_total_xp(self.pool(), limit).await?,
            (Category::Xp, Some(since)) => {
                LeaderboardRepo::top_by_xp_since(self.pool(), since, limit).await?
            }
            // A streak is already a per-day quantity; the current value is
            // the ranking for every period.
            (Category::Streak, _) => LeaderboardRepo::top_by_streak(self.pool(), limit).await?,
        };

        let viewer_rank = match viewer {
            Some(visitor_id) if !entries.iter().any(|e| e.visitor_id == visitor_id) => {
                match (category, period.start(now)) {
                    (Category::Xp, None) => {
                        LeaderboardRepo::rank_by_total_xp(self.pool(), visitor_id).await?
                    }
                    (Category::Xp, Some(since)) => {
                        LeaderboardRepo::rank_by_xp_since(self.pool(), visitor_id, since).await?
                    }
                    (Category::Streak, _) => {
                        LeaderboardRepo::rank_by_streak(self.pool(), visitor_id).await?
                    }
                }
            }
            _ => None,
        };

        Ok(LeaderboardResult {
            period,
            category,
            entries,
            viewer_rank,
        })
    }
}
