//! Repository for the `notifications` table.
//!
//! Notifications are a best-effort secondary effect: the engine writes
//! them after its primary transaction commits and only logs failures.

use sqlx::PgPool;
use viblog_core::types::DbId;

use crate::models::notification::Notification;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, visitor_id, kind, title, body, is_read, read_at, created_at";

/// Provides appends and reads for user-visible notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a notification, returning the generated ID.
    pub async fn create(
        pool: &PgPool,
        visitor_id: DbId,
        kind: &str,
        title: &str,
        body: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications (visitor_id, kind, title, body) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(visitor_id)
        .bind(kind)
        .bind(title)
        .bind(body)
        .fetch_one(pool)
        .await
    }

    /// List a visitor's notifications, newest first.
    pub async fn list_for_visitor(
        pool: &PgPool,
        visitor_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE visitor_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(visitor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Number of unread notifications for a visitor.
    pub async fn unread_count(pool: &PgPool, visitor_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE visitor_id = $1 AND is_read = false",
        )
        .bind(visitor_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
