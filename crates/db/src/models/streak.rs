//! Streak entity.

use serde::Serialize;
use sqlx::FromRow;
use viblog_core::types::{DbId, Timestamp};

/// A row from the `streaks` table (one per visitor).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Streak {
    pub id: DbId,
    pub visitor_id: DbId,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_check_in: Timestamp,
    pub freezes_available: i32,
    pub freezes_used: i32,
}
