//! Repository for the `visitor_profiles` table.

use sqlx::{PgConnection, PgPool};
use viblog_core::types::DbId;

use crate::models::visitor::VisitorProfile;

/// Column list for `visitor_profiles` queries.
const COLUMNS: &str = "id, username, total_xp, level, created_at, last_active_at";

/// Provides access to visitor profiles and their materialized XP total.
pub struct VisitorRepo;

impl VisitorRepo {
    /// Insert a new profile, returning the created row.
    ///
    /// A duplicate username surfaces as a unique violation on
    /// `uq_visitor_profiles_username`.
    pub async fn create(
        conn: &mut PgConnection,
        username: &str,
    ) -> Result<VisitorProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO visitor_profiles (username) \
             VALUES ($1) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VisitorProfile>(&query)
            .bind(username)
            .fetch_one(conn)
            .await
    }

    /// Find a profile by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VisitorProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM visitor_profiles WHERE id = $1");
        sqlx::query_as::<_, VisitorProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically add points to the materialized total and touch
    /// `last_active_at`, returning the new total and the stored level.
    ///
    /// The increment happens store-side (`total_xp = total_xp + $1`), never
    /// as an application read-modify-write, so concurrent awards for the
    /// same visitor cannot lose updates. Returns `None` when the visitor
    /// does not exist.
    pub async fn increment_xp(
        conn: &mut PgConnection,
        visitor_id: DbId,
        points: i32,
    ) -> Result<Option<(i64, i32)>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE visitor_profiles \
             SET total_xp = total_xp + $1, last_active_at = NOW() \
             WHERE id = $2 \
             RETURNING total_xp, level",
        )
        .bind(points)
        .bind(visitor_id)
        .fetch_optional(conn)
        .await
    }

    /// Raise the stored level to `level` if it is higher than the current
    /// value. `GREATEST` keeps the level monotone even when awards commit
    /// out of arrival order.
    pub async fn raise_level(
        conn: &mut PgConnection,
        visitor_id: DbId,
        level: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE visitor_profiles \
             SET level = GREATEST(level, $1) \
             WHERE id = $2",
        )
        .bind(level)
        .bind(visitor_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Take the profile row lock without reading the row.
    ///
    /// Badge grants acquire this before inserting into `user_badges`,
    /// keeping one profile-then-grants lock order across every operation
    /// that touches both tables.
    pub async fn lock_row(conn: &mut PgConnection, visitor_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT id FROM visitor_profiles WHERE id = $1 FOR UPDATE")
            .bind(visitor_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// 1-based signup position of a visitor (BIGSERIAL ids are assigned in
    /// registration order).
    pub async fn signup_order(
        conn: &mut PgConnection,
        visitor_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM visitor_profiles WHERE id <= $1")
                .bind(visitor_id)
                .fetch_one(conn)
                .await?;
        Ok(row.0)
    }
}
