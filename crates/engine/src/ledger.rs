//! XP ledger: awards, the materialized total, and registration.

use serde::Serialize;
use sqlx::PgConnection;
use viblog_core::actions::PointAction;
use viblog_core::error::CoreError;
use viblog_core::level::level_from_xp;
use viblog_core::types::DbId;
use viblog_db::models::visitor::VisitorProfile;
use viblog_db::repositories::{LedgerRepo, NotificationRepo, StreakRepo, VisitorRepo};
use viblog_events::GamificationEvent;

use crate::badges::GrantedBadge;
use crate::{EngineError, EngineResult, GamificationEngine};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of one XP award.
#[derive(Debug, Clone, Serialize)]
pub struct AwardResult {
    pub points_awarded: i32,
    pub new_total_xp: i64,
    pub new_level: i32,
    pub leveled_up: bool,
}

/// Outcome of registering a new visitor.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResult {
    pub visitor: VisitorProfile,
    pub award: AwardResult,
    pub badges: Vec<GrantedBadge>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl GamificationEngine {
    /// Award points to a visitor for an action.
    ///
    /// `points_override` substitutes the fixed reward table; it is
    /// required for actions whose value is computed by the caller
    /// (bonuses, badge rewards) and rejected as a validation error when
    /// neither source yields a value. The ledger append, total increment,
    /// and level recompute commit atomically; level-up notification and
    /// bus events are best-effort afterwards.
    pub async fn award(
        &self,
        visitor_id: DbId,
        action: PointAction,
        points_override: Option<i32>,
        post_id: Option<DbId>,
    ) -> EngineResult<AwardResult> {
        let points = resolve_points(action, points_override)?;

        let mut tx = self.pool().begin().await?;
        let result = self
            .award_in_tx(&mut *tx, visitor_id, action, points, post_id)
            .await?;
        tx.commit().await?;

        self.emit_award_effects(visitor_id, action, points, &result)
            .await;
        Ok(result)
    }

    /// Register a new visitor: create the profile, award the first-action
    /// XP, and grant the registration badges, all in one transaction.
    pub async fn register(&self, username: &str) -> EngineResult<RegistrationResult> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CoreError::Validation("Username must not be empty".into()).into());
        }

        let mut tx = self.pool().begin().await?;

        let visitor = match VisitorRepo::create(&mut *tx, username).await {
            Ok(v) => v,
            Err(err) => {
                let err = EngineError::from(err);
                if err.is_unique_violation("uq_visitor_profiles_username") {
                    return Err(
                        CoreError::Conflict(format!("Username already taken: {username}")).into(),
                    );
                }
                return Err(err);
            }
        };

        let points = resolve_points(PointAction::FirstAction, None)?;
        let award = self
            .award_in_tx(&mut *tx, visitor.id, PointAction::FirstAction, points, None)
            .await?;

        // The streak record exists from day one; the first explicit
        // check-in on the registration day is then a same-day no-op.
        StreakRepo::insert_if_absent(
            &mut *tx,
            visitor.id,
            chrono::Utc::now(),
            viblog_core::actions::NEW_VISITOR_FREEZES,
        )
        .await?;

        // Registration-time badges. The context deliberately leaves
        // signup_order unknown (0): order-based badges wait for the first
        // full evaluation so registration awards exactly the first-action
        // XP.
        let ctx = viblog_core::badge_rules::RuleContext {
            visitor_id: visitor.id,
            level: award.new_level,
            ..Default::default()
        };
        let badges = self.grant_matching_in_tx(&mut *tx, visitor.id, &ctx).await?;

        tx.commit().await?;

        self.emit_award_effects(visitor.id, PointAction::FirstAction, points, &award)
            .await;
        for badge in &badges {
            self.emit_badge_effects(visitor.id, badge).await;
        }

        let visitor = VisitorRepo::find_by_id(self.pool(), visitor.id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Visitor",
                id: visitor.id,
            })?;

        Ok(RegistrationResult {
            visitor,
            award,
            badges,
        })
    }

    /// Visitors whose materialized total disagrees with the ledger sum.
    ///
    /// Reconciliation probe; healthy deployments return an empty list.
    pub async fn reconcile_totals(&self) -> EngineResult<Vec<DbId>> {
        Ok(LedgerRepo::find_divergent_totals(self.pool()).await?)
    }

    // -----------------------------------------------------------------------
    // Transaction bodies and side effects
    // -----------------------------------------------------------------------

    /// The atomic award unit: ledger append + store-side total increment +
    /// level recompute, on the caller's transaction.
    ///
    /// The profile UPDATE takes a row lock, so concurrent awards for the
    /// same visitor serialize here and neither increment is lost.
    pub(crate) async fn award_in_tx(
        &self,
        conn: &mut PgConnection,
        visitor_id: DbId,
        action: PointAction,
        points: i32,
        post_id: Option<DbId>,
    ) -> EngineResult<AwardResult> {
        let (new_total, stored_level) = VisitorRepo::increment_xp(conn, visitor_id, points)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Visitor",
                id: visitor_id,
            })?;

        LedgerRepo::append(conn, visitor_id, points, action.as_str(), post_id).await?;

        let new_level = level_from_xp(new_total);
        let leveled_up = new_level > stored_level;
        if leveled_up {
            VisitorRepo::raise_level(conn, visitor_id, new_level).await?;
        }

        Ok(AwardResult {
            points_awarded: points,
            new_total_xp: new_total,
            new_level: new_level.max(stored_level),
            leveled_up,
        })
    }

    /// Post-commit effects of an award: bus events and, on a level-up, a
    /// user-visible notification. Never fails the operation.
    pub(crate) async fn emit_award_effects(
        &self,
        visitor_id: DbId,
        action: PointAction,
        points: i32,
        result: &AwardResult,
    ) {
        self.events().publish(GamificationEvent::XpAwarded {
            visitor_id,
            action,
            points,
            new_total: result.new_total_xp,
        });

        if result.leveled_up {
            self.events().publish(GamificationEvent::LevelUp {
                visitor_id,
                level: result.new_level,
            });

            let info = viblog_core::level::level_info(result.new_level);
            let title = format!("Lên cấp {}!", result.new_level);
            let body = format!("Bạn đã đạt danh hiệu {} {}", info.name, info.icon);
            if let Err(err) =
                NotificationRepo::create(self.pool(), visitor_id, "level_up", &title, &body).await
            {
                tracing::warn!(%visitor_id, error = %err, "Failed to write level-up notification");
            }
        }
    }
}

/// Resolve award points from the override or the fixed table.
fn resolve_points(action: PointAction, points_override: Option<i32>) -> EngineResult<i32> {
    points_override
        .or_else(|| action.fixed_reward())
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Action '{action}' has no fixed reward and no explicit points were given"
            ))
            .into()
        })
}
