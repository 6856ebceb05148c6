//! Leaderboard read models.

use serde::Serialize;
use sqlx::FromRow;
use viblog_core::types::DbId;

/// One ranked row of a leaderboard snapshot.
///
/// `rank` is a dense 1-based position; ties are already broken by the
/// query's secondary sort key (visitor id), so ranks are unique.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardRow {
    pub rank: i64,
    pub visitor_id: DbId,
    pub username: String,
    pub value: i64,
}
