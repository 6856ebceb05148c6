//! Visitor profile entity.

use serde::Serialize;
use sqlx::FromRow;
use viblog_core::types::{DbId, Timestamp};

/// A row from the `visitor_profiles` table.
///
/// `total_xp` and `level` are materialized from the point transaction
/// ledger; they are only ever written inside the same transaction as a
/// ledger append.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VisitorProfile {
    pub id: DbId,
    pub username: String,
    pub total_xp: i64,
    pub level: i32,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
}
