//! Daily check-in: streak transitions, freeze mechanics, milestones.

use serde::Serialize;
use viblog_core::actions::{PointAction, NEW_VISITOR_FREEZES, STREAK_BONUS_PER_DAY};
use viblog_core::error::CoreError;
use viblog_core::streak::{
    evaluate_transition, milestone_badge_slug, milestone_for, StreakTransition,
};
use viblog_core::types::DbId;
use viblog_db::repositories::{StreakRepo, VisitorRepo};
use viblog_events::GamificationEvent;

use crate::badges::GrantedBadge;
use crate::{EngineResult, GamificationEngine};

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Outcome of a daily check-in.
///
/// A same-day repeat yields `is_new_day: false` with zero XP and no other
/// changes, regardless of how calls interleave.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInResult {
    pub is_new_day: bool,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub xp_awarded: i32,
    pub streak_broken: bool,
    pub freeze_consumed: bool,
    pub milestone_badge: Option<GrantedBadge>,
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

impl GamificationEngine {
    /// Record a daily check-in for a visitor.
    ///
    /// The streak row is read `FOR UPDATE` inside the same transaction as
    /// the streak update and every XP award, so the calendar-day
    /// idempotency check is a store-level check-and-set: two same-day
    /// calls racing each other serialize on the row lock and the second
    /// one observes the already-moved `last_check_in`.
    pub async fn check_in(&self, visitor_id: DbId) -> EngineResult<CheckInResult> {
        let now = chrono::Utc::now();
        let mut tx = self.pool().begin().await?;

        // The profile must exist before any streak state is created.
        if VisitorRepo::find_by_id(self.pool(), visitor_id)
            .await?
            .is_none()
        {
            return Err(CoreError::NotFound {
                entity: "Visitor",
                id: visitor_id,
            }
            .into());
        }

        let existing = match StreakRepo::find_for_update(&mut *tx, visitor_id).await? {
            Some(row) => Some(row),
            None => {
                // First check-in ever. The insert races other first
                // check-ins; the loser falls through to the locked re-read
                // and is handled as a same-day repeat.
                match StreakRepo::insert_if_absent(
                    &mut *tx,
                    visitor_id,
                    now,
                    NEW_VISITOR_FREEZES,
                )
                .await?
                {
                    Some(created) => {
                        let login = self
                            .award_in_tx(&mut *tx, visitor_id, PointAction::Login, login_xp(), None)
                            .await?;
                        tx.commit().await?;

                        self.emit_award_effects(
                            visitor_id,
                            PointAction::Login,
                            login.points_awarded,
                            &login,
                        )
                        .await;

                        return Ok(CheckInResult {
                            is_new_day: true,
                            current_streak: created.current_streak,
                            longest_streak: created.longest_streak,
                            xp_awarded: login.points_awarded,
                            streak_broken: false,
                            freeze_consumed: false,
                            milestone_badge: None,
                        });
                    }
                    None => StreakRepo::find_for_update(&mut *tx, visitor_id).await?,
                }
            }
        };

        let streak = existing.ok_or(CoreError::Internal(format!(
            "Streak row vanished for visitor {visitor_id}"
        )))?;

        let gap = self.day_boundary().days_between(streak.last_check_in, now);
        let transition = evaluate_transition(gap, streak.freezes_available);

        if transition == StreakTransition::SameDay {
            tx.commit().await?;
            return Ok(CheckInResult {
                is_new_day: false,
                current_streak: streak.current_streak,
                longest_streak: streak.longest_streak,
                xp_awarded: 0,
                streak_broken: false,
                freeze_consumed: false,
                milestone_badge: None,
            });
        }

        let next_streak = transition.next_streak(streak.current_streak);
        let (freezes_available, freezes_used) = match transition {
            StreakTransition::FreezeConsumed => {
                (streak.freezes_available - 1, streak.freezes_used + 1)
            }
            _ => (streak.freezes_available, streak.freezes_used),
        };

        let updated = StreakRepo::apply_check_in(
            &mut *tx,
            streak.id,
            next_streak,
            now,
            freezes_available,
            freezes_used,
        )
        .await?;

        // Daily login XP, plus the streak bonus on a continued streak.
        let mut xp_awarded = 0;
        let login = self
            .award_in_tx(&mut *tx, visitor_id, PointAction::Login, login_xp(), None)
            .await?;
        xp_awarded += login.points_awarded;

        let mut bonus = None;
        if transition == StreakTransition::Continued {
            let bonus_points = STREAK_BONUS_PER_DAY * next_streak;
            let awarded = self
                .award_in_tx(
                    &mut *tx,
                    visitor_id,
                    PointAction::StreakBonus,
                    bonus_points,
                    None,
                )
                .await?;
            xp_awarded += awarded.points_awarded;
            bonus = Some(awarded);
        }

        // Milestone badge, granted at most once ever; its XP reward counts
        // toward this check-in.
        let mut milestone_badge = None;
        if let Some(days) = milestone_for(next_streak) {
            if let Some(slug) = milestone_badge_slug(days) {
                if let Some(granted) = self.grant_by_slug_in_tx(&mut *tx, visitor_id, slug).await? {
                    xp_awarded += granted.xp_reward;
                    milestone_badge = Some(granted);
                }
            }
        }

        tx.commit().await?;

        // Post-commit effects.
        self.emit_award_effects(visitor_id, PointAction::Login, login.points_awarded, &login)
            .await;
        if let Some(awarded) = &bonus {
            self.emit_award_effects(
                visitor_id,
                PointAction::StreakBonus,
                awarded.points_awarded,
                awarded,
            )
            .await;
        }
        if let Some(badge) = &milestone_badge {
            self.events().publish(GamificationEvent::StreakMilestone {
                visitor_id,
                days: next_streak,
            });
            self.emit_badge_effects(visitor_id, badge).await;
        }

        Ok(CheckInResult {
            is_new_day: true,
            current_streak: updated.current_streak,
            longest_streak: updated.longest_streak,
            xp_awarded,
            streak_broken: transition == StreakTransition::Broken,
            freeze_consumed: transition == StreakTransition::FreezeConsumed,
            milestone_badge,
        })
    }
}

/// Daily login reward from the fixed table.
fn login_xp() -> i32 {
    PointAction::Login.fixed_reward().unwrap_or(0)
}
