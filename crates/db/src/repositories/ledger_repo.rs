//! Repository for the append-only `point_transactions` ledger.

use sqlx::{PgConnection, PgPool};
use viblog_core::types::DbId;

use crate::models::point_transaction::PointTransaction;

/// Provides appends and aggregate reads over the XP ledger.
pub struct LedgerRepo;

impl LedgerRepo {
    /// Append a ledger row, returning the generated ID.
    ///
    /// Always called inside the same transaction as the matching
    /// `visitor_profiles.total_xp` increment.
    pub async fn append(
        conn: &mut PgConnection,
        visitor_id: DbId,
        points: i32,
        action: &str,
        post_id: Option<DbId>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO point_transactions (visitor_id, points, action, post_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(visitor_id)
        .bind(points)
        .bind(action)
        .bind(post_id)
        .fetch_one(conn)
        .await
    }

    /// Most recent ledger entries for a visitor, newest first.
    pub async fn recent_for_visitor(
        pool: &PgPool,
        visitor_id: DbId,
        limit: i64,
    ) -> Result<Vec<PointTransaction>, sqlx::Error> {
        sqlx::query_as::<_, PointTransaction>(
            "SELECT id, visitor_id, points, action, post_id, created_at \
             FROM point_transactions \
             WHERE visitor_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2",
        )
        .bind(visitor_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Number of transactions for one visitor and action.
    pub async fn count_by_action(
        conn: &mut PgConnection,
        visitor_id: DbId,
        action: &str,
    ) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM point_transactions WHERE visitor_id = $1 AND action = $2",
        )
        .bind(visitor_id)
        .bind(action)
        .fetch_one(conn)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Visitors whose materialized `total_xp` disagrees with the ledger sum.
    ///
    /// Reconciliation probe for the invariant `total_xp == Σ points`; an
    /// empty result is the healthy state. Offline use only, not part of any
    /// request path.
    pub async fn find_divergent_totals(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT p.id FROM visitor_profiles p \
             LEFT JOIN point_transactions t ON t.visitor_id = p.id \
             GROUP BY p.id, p.total_xp \
             HAVING p.total_xp <> COALESCE(SUM(t.points), 0) \
             ORDER BY p.id",
        )
        .fetch_all(pool)
        .await
    }
}
