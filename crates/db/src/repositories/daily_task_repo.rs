//! Repository for the `daily_tasks` catalog, `user_daily_tasks` progress
//! rows, and the once-per-day `daily_bonuses` guard.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use viblog_core::types::DbId;

use crate::models::daily_task::{DailyTask, UserDailyTask};

/// Column list for `daily_tasks` queries.
const TASK_COLUMNS: &str = "id, task_type, title, requirement, xp_reward, sort_order";

/// Column list for `user_daily_tasks` queries.
const PROGRESS_COLUMNS: &str = "id, visitor_id, task_id, day, progress, completed, completed_at";

/// Provides access to daily task progress, keyed by calendar day.
///
/// Daily reset is implicit: rows are scoped by the `day` column and a
/// missing row reads as zero progress, so there is no cleanup job.
pub struct DailyTaskRepo;

impl DailyTaskRepo {
    /// Load the task catalog in display order.
    pub async fn list_catalog(conn: &mut PgConnection) -> Result<Vec<DailyTask>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM daily_tasks ORDER BY sort_order, id");
        sqlx::query_as::<_, DailyTask>(&query).fetch_all(conn).await
    }

    /// Find a catalog task by its type key.
    pub async fn find_by_type(
        conn: &mut PgConnection,
        task_type: &str,
    ) -> Result<Option<DailyTask>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM daily_tasks WHERE task_type = $1");
        sqlx::query_as::<_, DailyTask>(&query)
            .bind(task_type)
            .fetch_optional(conn)
            .await
    }

    /// Add `increment` to a visitor's progress for one task and day,
    /// clamped store-side to the task requirement. Creates the row on
    /// first touch; the unique (visitor, task, day) key makes the upsert
    /// race-free.
    pub async fn upsert_progress(
        conn: &mut PgConnection,
        visitor_id: DbId,
        task_id: DbId,
        day: NaiveDate,
        increment: i32,
        requirement: i32,
    ) -> Result<UserDailyTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_daily_tasks (visitor_id, task_id, day, progress) \
             VALUES ($1, $2, $3, LEAST($4, $5)) \
             ON CONFLICT (visitor_id, task_id, day) \
             DO UPDATE SET progress = LEAST(user_daily_tasks.progress + $4, $5) \
             RETURNING {PROGRESS_COLUMNS}"
        );
        sqlx::query_as::<_, UserDailyTask>(&query)
            .bind(visitor_id)
            .bind(task_id)
            .bind(day)
            .bind(increment)
            .bind(requirement)
            .fetch_one(conn)
            .await
    }

    /// Flip a progress row to completed, exactly once.
    ///
    /// The `AND completed = false` guard means only one caller observes
    /// `true`; everyone else sees a no-op and must not award task XP.
    pub async fn mark_completed(
        conn: &mut PgConnection,
        visitor_id: DbId,
        task_id: DbId,
        day: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_daily_tasks \
             SET completed = true, completed_at = NOW() \
             WHERE visitor_id = $1 AND task_id = $2 AND day = $3 \
               AND progress >= (SELECT requirement FROM daily_tasks WHERE id = $2) \
               AND completed = false",
        )
        .bind(visitor_id)
        .bind(task_id)
        .bind(day)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of tasks the visitor has completed on `day`.
    pub async fn completed_count(
        conn: &mut PgConnection,
        visitor_id: DbId,
        day: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_daily_tasks \
             WHERE visitor_id = $1 AND day = $2 AND completed = true",
        )
        .bind(visitor_id)
        .bind(day)
        .fetch_one(conn)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Size of the task catalog.
    pub async fn catalog_count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar("SELECT COUNT(*) FROM daily_tasks")
            .fetch_one(conn)
            .await?;
        Ok(count.unwrap_or(0))
    }

    /// Insert the all-tasks bonus guard row for (visitor, day).
    ///
    /// Returns `false` when the bonus was already claimed for that day.
    pub async fn claim_daily_bonus(
        conn: &mut PgConnection,
        visitor_id: DbId,
        day: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO daily_bonuses (visitor_id, day) \
             VALUES ($1, $2) \
             ON CONFLICT (visitor_id, day) DO NOTHING",
        )
        .bind(visitor_id)
        .bind(day)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All progress rows for a visitor on one day.
    pub async fn progress_for_day(
        pool: &PgPool,
        visitor_id: DbId,
        day: NaiveDate,
    ) -> Result<Vec<UserDailyTask>, sqlx::Error> {
        let query = format!(
            "SELECT {PROGRESS_COLUMNS} FROM user_daily_tasks \
             WHERE visitor_id = $1 AND day = $2 \
             ORDER BY task_id"
        );
        sqlx::query_as::<_, UserDailyTask>(&query)
            .bind(visitor_id)
            .bind(day)
            .fetch_all(pool)
            .await
    }
}
