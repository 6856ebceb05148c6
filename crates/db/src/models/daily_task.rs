//! Daily task catalog and per-day progress entities.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use viblog_core::types::{DbId, Timestamp};

/// A row from the `daily_tasks` catalog.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyTask {
    pub id: DbId,
    pub task_type: String,
    pub title: String,
    pub requirement: i32,
    pub xp_reward: i32,
    pub sort_order: i32,
}

/// A row from `user_daily_tasks`, scoped to one visitor/task/day.
///
/// Absence of a row means zero progress; rows never carry state across
/// days because `day` is part of the unique key.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserDailyTask {
    pub id: DbId,
    pub visitor_id: DbId,
    pub task_id: DbId,
    pub day: NaiveDate,
    pub progress: i32,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
}
