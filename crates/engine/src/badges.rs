//! Badge evaluation and idempotent grants.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgConnection;
use viblog_core::actions::PointAction;
use viblog_core::badge_rules::RuleContext;
use viblog_core::error::CoreError;
use viblog_core::types::DbId;
use viblog_db::models::badge::Badge;
use viblog_db::repositories::{
    BadgeRepo, LeaderboardRepo, LedgerRepo, NotificationRepo, StreakRepo, VisitorRepo,
};
use viblog_events::GamificationEvent;

use crate::{EngineResult, GamificationEngine, Period};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A badge the current operation newly granted.
#[derive(Debug, Clone, Serialize)]
pub struct GrantedBadge {
    pub badge_id: DbId,
    pub slug: String,
    pub name: String,
    pub rarity: String,
    pub xp_reward: i32,
}

/// Caller-supplied facts the engine cannot derive from the ledger.
///
/// Per-category read counts live with the content layer (the ledger only
/// records post ids), and weekly ranks may be precomputed by the caller;
/// when absent the engine queries them itself.
#[derive(Debug, Clone, Default)]
pub struct EvaluateContext {
    pub reads_by_category: HashMap<String, i64>,
    pub weekly_xp_rank: Option<i64>,
    pub weekly_streak_rank: Option<i64>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl GamificationEngine {
    /// Evaluate the whole badge catalog for a visitor and grant every
    /// badge whose rule holds and which the visitor does not own yet.
    ///
    /// Grants are idempotent under concurrency: the unique
    /// `(visitor_id, badge_id)` constraint decides the winner and the
    /// loser's attempt degrades to "already granted" with no XP, reported
    /// as an absent entry rather than an error.
    pub async fn evaluate_badges(
        &self,
        visitor_id: DbId,
        ctx: EvaluateContext,
    ) -> EngineResult<Vec<GrantedBadge>> {
        // Snapshot reads that do not need the grant transaction.
        let profile = VisitorRepo::find_by_id(self.pool(), visitor_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Visitor",
                id: visitor_id,
            })?;
        let streak = StreakRepo::find_by_visitor(self.pool(), visitor_id).await?;

        let weekly_xp_rank = match ctx.weekly_xp_rank {
            Some(rank) => Some(rank),
            None => match Period::Weekly.start(chrono::Utc::now()) {
                Some(since) => LeaderboardRepo::rank_by_xp_since(self.pool(), visitor_id, since)
                    .await?
                    .map(|row| row.rank),
                None => None,
            },
        };
        let weekly_streak_rank = match ctx.weekly_streak_rank {
            Some(rank) => Some(rank),
            None => LeaderboardRepo::rank_by_streak(self.pool(), visitor_id)
                .await?
                .map(|row| row.rank),
        };

        let mut tx = self.pool().begin().await?;

        let rule_ctx = RuleContext {
            visitor_id,
            read_count: LedgerRepo::count_by_action(&mut *tx, visitor_id, "read").await?,
            comment_count: LedgerRepo::count_by_action(&mut *tx, visitor_id, "comment").await?,
            react_count: LedgerRepo::count_by_action(&mut *tx, visitor_id, "react").await?,
            reads_by_category: ctx.reads_by_category,
            current_streak: streak.map(|s| s.current_streak).unwrap_or(0),
            level: profile.level,
            signup_order: VisitorRepo::signup_order(&mut *tx, visitor_id).await?,
            weekly_xp_rank,
            weekly_streak_rank,
        };

        let granted = self
            .grant_matching_in_tx(&mut *tx, visitor_id, &rule_ctx)
            .await?;

        tx.commit().await?;

        for badge in &granted {
            self.emit_badge_effects(visitor_id, badge).await;
        }
        Ok(granted)
    }

    // -----------------------------------------------------------------------
    // Transaction bodies and side effects
    // -----------------------------------------------------------------------

    /// Grant every unowned catalog badge whose rule holds, on the caller's
    /// transaction, awarding each badge's XP reward as part of the unit.
    pub(crate) async fn grant_matching_in_tx(
        &self,
        conn: &mut PgConnection,
        visitor_id: DbId,
        ctx: &RuleContext,
    ) -> EngineResult<Vec<GrantedBadge>> {
        let catalog = BadgeRepo::list_catalog(conn).await?;
        let owned = BadgeRepo::owned_badge_ids(conn, visitor_id).await?;

        let mut granted = Vec::new();
        for badge in catalog {
            if owned.contains(&badge.id) || !badge.requirement.0.holds(ctx) {
                continue;
            }
            if let Some(grant) = self.grant_badge_in_tx(conn, visitor_id, &badge).await? {
                granted.push(grant);
            }
        }
        Ok(granted)
    }

    /// Grant a badge known by slug (streak milestones), on the caller's
    /// transaction. `None` when the visitor already owns it.
    pub(crate) async fn grant_by_slug_in_tx(
        &self,
        conn: &mut PgConnection,
        visitor_id: DbId,
        slug: &str,
    ) -> EngineResult<Option<GrantedBadge>> {
        let badge = BadgeRepo::find_by_slug(conn, slug)
            .await?
            .ok_or_else(|| CoreError::Validation(format!("Unknown badge slug: {slug}")))?;
        self.grant_badge_in_tx(conn, visitor_id, &badge).await
    }

    /// The idempotent grant unit: lock the profile row, insert the grant
    /// row, and only when the insert took effect award the badge's XP. A
    /// lost race returns `None` and awards nothing (the winner already
    /// did).
    async fn grant_badge_in_tx(
        &self,
        conn: &mut PgConnection,
        visitor_id: DbId,
        badge: &Badge,
    ) -> EngineResult<Option<GrantedBadge>> {
        // Profile lock before the grant insert: check-in holds the profile
        // lock (login XP) when it grants milestone badges, so every grant
        // path must take these two locks in the same order.
        VisitorRepo::lock_row(conn, visitor_id).await?;
        let inserted = BadgeRepo::grant_if_absent(conn, visitor_id, badge.id).await?;
        if !inserted {
            return Ok(None);
        }

        if badge.xp_reward > 0 {
            self.award_in_tx(
                conn,
                visitor_id,
                PointAction::BadgeEarned,
                badge.xp_reward,
                None,
            )
            .await?;
        }

        Ok(Some(GrantedBadge {
            badge_id: badge.id,
            slug: badge.slug.clone(),
            name: badge.name.clone(),
            rarity: badge.rarity.clone(),
            xp_reward: badge.xp_reward,
        }))
    }

    /// Post-commit effects of a grant: bus event plus a user-visible
    /// notification. Never fails the operation.
    pub(crate) async fn emit_badge_effects(&self, visitor_id: DbId, badge: &GrantedBadge) {
        self.events().publish(GamificationEvent::BadgeEarned {
            visitor_id,
            badge_slug: badge.slug.clone(),
        });

        let title = format!("Huy hiệu mới: {}", badge.name);
        let body = format!("Bạn nhận được {} XP thưởng", badge.xp_reward);
        if let Err(err) =
            NotificationRepo::create(self.pool(), visitor_id, "badge_earned", &title, &body).await
        {
            tracing::warn!(%visitor_id, badge = %badge.slug, error = %err,
                "Failed to write badge notification");
        }
    }
}
