//! Repository for the `badges` catalog and `user_badges` grants.

use sqlx::{PgConnection, PgPool};
use viblog_core::types::DbId;

use crate::models::badge::{Badge, EarnedBadge};

/// Column list for `badges` queries.
const BADGE_COLUMNS: &str = "id, slug, name, description, requirement, rarity, xp_reward";

/// Provides access to the badge catalog and idempotent grant inserts.
pub struct BadgeRepo;

impl BadgeRepo {
    /// Load the full badge catalog.
    pub async fn list_catalog(conn: &mut PgConnection) -> Result<Vec<Badge>, sqlx::Error> {
        let query = format!("SELECT {BADGE_COLUMNS} FROM badges ORDER BY id");
        sqlx::query_as::<_, Badge>(&query).fetch_all(conn).await
    }

    /// Find a badge by its slug.
    pub async fn find_by_slug(
        conn: &mut PgConnection,
        slug: &str,
    ) -> Result<Option<Badge>, sqlx::Error> {
        let query = format!("SELECT {BADGE_COLUMNS} FROM badges WHERE slug = $1");
        sqlx::query_as::<_, Badge>(&query)
            .bind(slug)
            .fetch_optional(conn)
            .await
    }

    /// IDs of all badges a visitor already owns.
    pub async fn owned_badge_ids(
        conn: &mut PgConnection,
        visitor_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT badge_id FROM user_badges WHERE visitor_id = $1")
            .bind(visitor_id)
            .fetch_all(conn)
            .await
    }

    /// Insert a grant row unless one already exists.
    ///
    /// Idempotency rides on `uq_user_badges_pair`: a concurrent duplicate
    /// insert hits `ON CONFLICT DO NOTHING` and reports `false`, which the
    /// engine treats as "already granted", never as an error.
    pub async fn grant_if_absent(
        conn: &mut PgConnection,
        visitor_id: DbId,
        badge_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_badges (visitor_id, badge_id) \
             VALUES ($1, $2) \
             ON CONFLICT (visitor_id, badge_id) DO NOTHING",
        )
        .bind(visitor_id)
        .bind(badge_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a visitor's earned badges with their catalog entries, most
    /// recent first.
    pub async fn list_for_visitor(
        pool: &PgPool,
        visitor_id: DbId,
    ) -> Result<Vec<EarnedBadge>, sqlx::Error> {
        sqlx::query_as::<_, EarnedBadge>(
            "SELECT ub.badge_id, b.slug, b.name, b.description, b.rarity, b.xp_reward, \
                    ub.earned_at, ub.is_featured \
             FROM user_badges ub \
             JOIN badges b ON b.id = ub.badge_id \
             WHERE ub.visitor_id = $1 \
             ORDER BY ub.earned_at DESC",
        )
        .bind(visitor_id)
        .fetch_all(pool)
        .await
    }
}
