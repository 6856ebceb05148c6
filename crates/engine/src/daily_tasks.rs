//! Daily task progress tracking and the all-tasks completion bonus.

use serde::Serialize;
use viblog_core::actions::{PointAction, ALL_TASKS_BONUS_XP};
use viblog_core::error::CoreError;
use viblog_core::types::DbId;
use viblog_db::repositories::{DailyTaskRepo, VisitorRepo};
use viblog_events::GamificationEvent;

use crate::{EngineResult, GamificationEngine};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Progress of one task after a track call.
#[derive(Debug, Clone, Serialize)]
pub struct TaskProgress {
    pub task_type: String,
    pub title: String,
    pub progress: i32,
    pub requirement: i32,
    pub completed: bool,
}

/// Outcome of tracking progress against one daily task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskTrackResult {
    pub task: TaskProgress,
    /// Whether this call is the one that completed the task.
    pub completed_now: bool,
    /// Whether every catalog task is completed for today.
    pub all_completed: bool,
    /// Whether this call claimed the once-per-day all-tasks bonus.
    pub bonus_awarded: bool,
    /// Task XP plus bonus XP awarded by this call.
    pub xp_awarded: i32,
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

impl GamificationEngine {
    /// Add `increment` to a visitor's progress on today's instance of a
    /// task.
    ///
    /// Progress clamps at the task requirement; the completion flip and
    /// its XP happen exactly once per day (guarded update), and the
    /// all-tasks bonus at most once per day (unique guard row). Repeat
    /// calls after completion report current state without re-awarding;
    /// the only write they may still make is claiming a bonus no earlier
    /// call managed to claim.
    pub async fn track_daily_task(
        &self,
        visitor_id: DbId,
        task_type: &str,
        increment: i32,
    ) -> EngineResult<TaskTrackResult> {
        if increment <= 0 {
            return Err(
                CoreError::Validation(format!("Increment must be positive, got {increment}"))
                    .into(),
            );
        }

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

        let today = self.day_boundary().day_of(chrono::Utc::now());
        let mut tx = self.pool().begin().await?;

        let task = DailyTaskRepo::find_by_type(&mut *tx, task_type)
            .await?
            .ok_or_else(|| CoreError::Validation(format!("Unknown daily task type: {task_type}")))?;

        let row = DailyTaskRepo::upsert_progress(
            &mut *tx,
            visitor_id,
            task.id,
            today,
            increment,
            task.requirement,
        )
        .await?;

        let mut xp_awarded = 0;
        let mut completed_now = false;
        let mut task_award = None;
        if row.progress >= task.requirement && !row.completed {
            // Only one caller wins the guarded flip; everyone else is a
            // no-op and must not award the task XP again.
            completed_now = DailyTaskRepo::mark_completed(&mut *tx, visitor_id, task.id, today)
                .await?;
            if completed_now && task.xp_reward > 0 {
                let awarded = self
                    .award_in_tx(
                        &mut *tx,
                        visitor_id,
                        PointAction::DailyTask,
                        task.xp_reward,
                        None,
                    )
                    .await?;
                xp_awarded += awarded.points_awarded;
                task_award = Some(awarded);
            }
        }

        let completed_count = DailyTaskRepo::completed_count(&mut *tx, visitor_id, today).await?;
        let catalog_count = DailyTaskRepo::catalog_count(&mut *tx).await?;
        let all_completed = catalog_count > 0 && completed_count >= catalog_count;

        // Claim the bonus whenever the full set is observed complete, not
        // just on the completing call: two concurrent calls finishing the
        // last two distinct tasks can each miss the other's uncommitted
        // completion, and a later repeat call must still be able to claim.
        // The unique guard row keeps the claim at-most-once.
        let mut bonus_awarded = false;
        let mut bonus_award = None;
        if all_completed {
            bonus_awarded = DailyTaskRepo::claim_daily_bonus(&mut *tx, visitor_id, today).await?;
            if bonus_awarded {
                let awarded = self
                    .award_in_tx(
                        &mut *tx,
                        visitor_id,
                        PointAction::DailyTask,
                        ALL_TASKS_BONUS_XP,
                        None,
                    )
                    .await?;
                xp_awarded += awarded.points_awarded;
                bonus_award = Some(awarded);
            }
        }

        tx.commit().await?;

        // Post-commit effects.
        if let Some(awarded) = &task_award {
            self.emit_award_effects(
                visitor_id,
                PointAction::DailyTask,
                awarded.points_awarded,
                awarded,
            )
            .await;
        }
        if let Some(awarded) = &bonus_award {
            self.emit_award_effects(
                visitor_id,
                PointAction::DailyTask,
                awarded.points_awarded,
                awarded,
            )
            .await;
            self.events().publish(GamificationEvent::DailyTasksCompleted {
                visitor_id,
                day: today,
            });
        }

        let completed = row.completed || completed_now;
        Ok(TaskTrackResult {
            task: TaskProgress {
                task_type: task.task_type,
                title: task.title,
                progress: row.progress,
                requirement: task.requirement,
                completed,
            },
            completed_now,
            all_completed,
            bonus_awarded,
            xp_awarded,
        })
    }
}
