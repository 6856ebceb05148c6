//! Point transaction ledger entity.

use serde::Serialize;
use sqlx::FromRow;
use viblog_core::types::{DbId, Timestamp};

/// A row from the append-only `point_transactions` ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PointTransaction {
    pub id: DbId,
    pub visitor_id: DbId,
    pub points: i32,
    pub action: String,
    pub post_id: Option<DbId>,
    pub created_at: Timestamp,
}
