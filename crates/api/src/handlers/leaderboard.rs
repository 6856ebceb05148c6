//! Handler for the `/leaderboard` resource.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use viblog_core::types::DbId;
use viblog_engine::{Category, Period};

use crate::error::AppResult;
use crate::state::AppState;

/// Query parameters for `GET /leaderboard`.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Time window. Defaults to `alltime`.
    pub period: Option<Period>,
    /// Scoring category. Defaults to `xp`.
    pub category: Option<Category>,
    /// Window size. Defaults to 10, capped at 100.
    pub limit: Option<i64>,
    /// When supplied and outside the window, the response carries this
    /// visitor's own rank.
    pub visitor_id: Option<DbId>,
}

/// GET /api/v1/leaderboard
///
/// Ranked snapshot for a period and category.
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let result = state
        .engine
        .leaderboard(
            params.period.unwrap_or(Period::Alltime),
            params.category.unwrap_or(Category::Xp),
            params.limit,
            params.visitor_id,
        )
        .await?;
    Ok(Json(serde_json::json!({ "data": result })))
}
