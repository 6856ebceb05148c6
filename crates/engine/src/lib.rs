//! The gamification engine.
//!
//! [`GamificationEngine`] turns user actions into XP, levels, streaks,
//! badges, and daily-task progress, and serves ranked leaderboards. It is
//! a library-level contract: route handlers call it, it calls the store.
//!
//! Correctness rests on two rules, enforced everywhere:
//!
//! - Primary effects (ledger append + materialized total + level, streak
//!   transition, badge grant row, task progress row) commit in a single
//!   transaction per operation. Idempotency comes from store-level guards
//!   (unique constraints, row locks, guarded updates), never from
//!   in-process state, because multiple processes may serve one visitor.
//! - Secondary effects (notifications, bus events) run after commit and
//!   are best-effort: failures are logged and never rolled back onto the
//!   primary effect.

use std::sync::Arc;

use sqlx::PgPool;
use viblog_core::day::DayBoundary;
use viblog_core::error::CoreError;
use viblog_events::EventBus;

pub mod badges;
pub mod daily_tasks;
pub mod leaderboard;
pub mod ledger;
pub mod streak;

pub use badges::{EvaluateContext, GrantedBadge};
pub use daily_tasks::{TaskProgress, TaskTrackResult};
pub use leaderboard::{Category, LeaderboardResult, Period};
pub use ledger::{AwardResult, RegistrationResult};
pub use streak::CheckInResult;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Engine-level error type.
///
/// Wraps the domain taxonomy plus database failures. Races the store
/// resolves in our favor (duplicate grant, same-day check-in, repeated
/// task completion) are not errors at all; they surface as no-op fields in
/// the result structs.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error from `viblog_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Whether this error is a Postgres unique violation on the named
    /// constraint. Used to translate registration races into conflicts.
    pub(crate) fn is_unique_violation(&self, constraint: &str) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("23505")
                    && db_err.constraint() == Some(constraint)
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The gamification engine facade.
///
/// Cheap to clone; holds the pool, the event bus, and the calendar-day
/// policy. Per-concern operations live in the submodules (`ledger`,
/// `streak`, `badges`, `daily_tasks`, `leaderboard`), all as methods on
/// this type.
#[derive(Clone)]
pub struct GamificationEngine {
    pool: PgPool,
    events: Arc<EventBus>,
    day: DayBoundary,
}

impl GamificationEngine {
    /// Create an engine over a pool and event bus with the given
    /// day-boundary policy.
    pub fn new(pool: PgPool, events: Arc<EventBus>, day: DayBoundary) -> Self {
        Self { pool, events, day }
    }

    /// The configured day-boundary policy.
    pub fn day_boundary(&self) -> DayBoundary {
        self.day
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.events
    }
}
