//! Read-only ranking queries over profiles, the ledger, and streaks.
//!
//! Every ranking orders by value descending with visitor id ascending as
//! the deterministic tie-break, then numbers rows with `ROW_NUMBER()`.
//! Snapshots are "as of read time"; no locks are taken.

use sqlx::PgPool;
use viblog_core::types::{DbId, Timestamp};

use crate::models::leaderboard::LeaderboardRow;

/// Shared ranking expression over a `(visitor_id, username, value)` source.
const RANKED: &str = "ROW_NUMBER() OVER (ORDER BY value DESC, visitor_id ASC) AS rank, \
    visitor_id, username, value";

/// Provides leaderboard snapshots and single-visitor rank lookups.
pub struct LeaderboardRepo;

impl LeaderboardRepo {
    /// Top visitors by all-time XP.
    pub async fn top_by_total_xp(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        let query = format!(
            "SELECT {RANKED} FROM \
                (SELECT id AS visitor_id, username, total_xp AS value \
                 FROM visitor_profiles) src \
             ORDER BY rank \
             LIMIT $1"
        );
        sqlx::query_as::<_, LeaderboardRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Top visitors by XP earned since `since` (ledger sums).
    pub async fn top_by_xp_since(
        pool: &PgPool,
        since: Timestamp,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        let query = format!(
            "SELECT {RANKED} FROM \
                (SELECT p.id AS visitor_id, p.username, SUM(t.points) AS value \
                 FROM visitor_profiles p \
                 JOIN point_transactions t ON t.visitor_id = p.id \
                 WHERE t.created_at >= $1 \
                 GROUP BY p.id, p.username) src \
             ORDER BY rank \
             LIMIT $2"
        );
        sqlx::query_as::<_, LeaderboardRow>(&query)
            .bind(since)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Top visitors by current streak length.
    pub async fn top_by_streak(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        let query = format!(
            "SELECT {RANKED} FROM \
                (SELECT p.id AS visitor_id, p.username, s.current_streak::BIGINT AS value \
                 FROM visitor_profiles p \
                 JOIN streaks s ON s.visitor_id = p.id) src \
             ORDER BY rank \
             LIMIT $1"
        );
        sqlx::query_as::<_, LeaderboardRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// One visitor's rank and value by all-time XP.
    pub async fn rank_by_total_xp(
        pool: &PgPool,
        visitor_id: DbId,
    ) -> Result<Option<LeaderboardRow>, sqlx::Error> {
        let query = format!(
            "SELECT * FROM \
                (SELECT {RANKED} FROM \
                    (SELECT id AS visitor_id, username, total_xp AS value \
                     FROM visitor_profiles) src) ranked \
             WHERE visitor_id = $1"
        );
        sqlx::query_as::<_, LeaderboardRow>(&query)
            .bind(visitor_id)
            .fetch_optional(pool)
            .await
    }

    /// One visitor's rank and value by XP earned since `since`.
    ///
    /// `None` when the visitor earned nothing in the window (they are not
    /// on the board at all, rather than ranked last).
    pub async fn rank_by_xp_since(
        pool: &PgPool,
        visitor_id: DbId,
        since: Timestamp,
    ) -> Result<Option<LeaderboardRow>, sqlx::Error> {
        let query = format!(
            "SELECT * FROM \
                (SELECT {RANKED} FROM \
                    (SELECT p.id AS visitor_id, p.username, SUM(t.points) AS value \
                     FROM visitor_profiles p \
                     JOIN point_transactions t ON t.visitor_id = p.id \
                     WHERE t.created_at >= $2 \
                     GROUP BY p.id, p.username) src) ranked \
             WHERE visitor_id = $1"
        );
        sqlx::query_as::<_, LeaderboardRow>(&query)
            .bind(visitor_id)
            .bind(since)
            .fetch_optional(pool)
            .await
    }

    /// One visitor's rank and value by current streak.
    pub async fn rank_by_streak(
        pool: &PgPool,
        visitor_id: DbId,
    ) -> Result<Option<LeaderboardRow>, sqlx::Error> {
        let query = format!(
            "SELECT * FROM \
                (SELECT {RANKED} FROM \
                    (SELECT p.id AS visitor_id, p.username, s.current_streak::BIGINT AS value \
                     FROM visitor_profiles p \
                     JOIN streaks s ON s.visitor_id = p.id) src) ranked \
             WHERE visitor_id = $1"
        );
        sqlx::query_as::<_, LeaderboardRow>(&query)
            .bind(visitor_id)
            .fetch_optional(pool)
            .await
    }
}
