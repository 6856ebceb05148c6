//! Repository for the `streaks` table.

use sqlx::{PgConnection, PgPool};
use viblog_core::types::{DbId, Timestamp};

use crate::models::streak::Streak;

/// Column list for `streaks` queries.
const COLUMNS: &str = "id, visitor_id, current_streak, longest_streak, \
    last_check_in, freezes_available, freezes_used";

/// Provides access to per-visitor streak state.
///
/// All mutation paths go through `find_for_update` first: the row lock is
/// the check-and-set that makes check-in idempotent per calendar day
/// across concurrent requests and processes.
pub struct StreakRepo;

impl StreakRepo {
    /// Insert the initial streak row for a visitor, or do nothing if one
    /// already exists (a concurrent first check-in won the race).
    ///
    /// Returns the created row, or `None` on conflict.
    pub async fn insert_if_absent(
        conn: &mut PgConnection,
        visitor_id: DbId,
        now: Timestamp,
        freezes: i32,
    ) -> Result<Option<Streak>, sqlx::Error> {
        let query = format!(
            "INSERT INTO streaks \
                (visitor_id, current_streak, longest_streak, last_check_in, freezes_available) \
             VALUES ($1, 1, 1, $2, $3) \
             ON CONFLICT (visitor_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Streak>(&query)
            .bind(visitor_id)
            .bind(now)
            .bind(freezes)
            .fetch_optional(conn)
            .await
    }

    /// Select a visitor's streak row with a row lock (`FOR UPDATE`),
    /// serializing concurrent check-ins for the same visitor.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        visitor_id: DbId,
    ) -> Result<Option<Streak>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM streaks WHERE visitor_id = $1 FOR UPDATE");
        sqlx::query_as::<_, Streak>(&query)
            .bind(visitor_id)
            .fetch_optional(conn)
            .await
    }

    /// Plain read of a visitor's streak row.
    pub async fn find_by_visitor(
        pool: &PgPool,
        visitor_id: DbId,
    ) -> Result<Option<Streak>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM streaks WHERE visitor_id = $1");
        sqlx::query_as::<_, Streak>(&query)
            .bind(visitor_id)
            .fetch_optional(pool)
            .await
    }

    /// Write the outcome of a check-in transition.
    ///
    /// `longest_streak` is maintained store-side with `GREATEST` so it can
    /// never fall behind the current streak.
    pub async fn apply_check_in(
        conn: &mut PgConnection,
        id: DbId,
        current_streak: i32,
        last_check_in: Timestamp,
        freezes_available: i32,
        freezes_used: i32,
    ) -> Result<Streak, sqlx::Error> {
        let query = format!(
            "UPDATE streaks \
             SET current_streak = $1, \
                 longest_streak = GREATEST(longest_streak, $1), \
                 last_check_in = $2, \
                 freezes_available = $3, \
                 freezes_used = $4 \
             WHERE id = $5 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Streak>(&query)
            .bind(current_streak)
            .bind(last_check_in)
            .bind(freezes_available)
            .bind(freezes_used)
            .bind(id)
            .fetch_one(conn)
            .await
    }
}
