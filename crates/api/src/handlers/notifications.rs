//! Handler for the `/visitors/{id}/notifications` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use viblog_core::types::DbId;
use viblog_db::repositories::NotificationRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// Query parameters for `GET /visitors/{id}/notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Maximum page size for notification listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for notification listing.
const DEFAULT_LIMIT: i64 = 50;

/// GET /api/v1/visitors/{id}/notifications
///
/// List a visitor's notifications, newest first, with the unread count.
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(visitor_id): Path<DbId>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);

    let notifications =
        NotificationRepo::list_for_visitor(&state.pool, visitor_id, limit, offset).await?;
    let unread = NotificationRepo::unread_count(&state.pool, visitor_id).await?;

    Ok(Json(serde_json::json!({
        "data": notifications,
        "unread_count": unread,
    })))
}
