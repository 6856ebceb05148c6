//! Handlers for visitor-scoped gamification operations: registration,
//! XP awards, daily check-in, badge evaluation, and task tracking.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use viblog_core::actions::PointAction;
use viblog_core::error::CoreError;
use viblog_core::types::DbId;
use viblog_db::repositories::{BadgeRepo, DailyTaskRepo, LedgerRepo, StreakRepo, VisitorRepo};
use viblog_engine::{EngineError, EvaluateContext};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /visitors`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
}

/// Body for `POST /visitors/{id}/award`.
#[derive(Debug, Deserialize)]
pub struct AwardRequest {
    pub action: PointAction,
    /// Explicit point value; required for actions with no fixed reward.
    pub points: Option<i32>,
    pub post_id: Option<DbId>,
}

/// Body for `POST /visitors/{id}/badges/evaluate`.
///
/// All fields optional; facts the engine can derive itself are computed
/// when absent.
#[derive(Debug, Default, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub reads_by_category: HashMap<String, i64>,
    pub weekly_xp_rank: Option<i64>,
    pub weekly_streak_rank: Option<i64>,
}

/// Body for `POST /visitors/{id}/tasks/track`.
#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub task_type: String,
    /// Progress to add. Defaults to 1.
    pub increment: Option<i32>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/visitors
///
/// Register a new visitor. Returns 201 with the profile, the first-action
/// award, and any registration badges; 409 when the username is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let result = state.engine.register(&body.username).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": result })),
    ))
}

/// GET /api/v1/visitors/{id}
///
/// Full gamification overview: profile with level metadata, streak state,
/// earned badges, and today's task progress.
pub async fn get_visitor(
    State(state): State<AppState>,
    Path(visitor_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let visitor = VisitorRepo::find_by_id(&state.pool, visitor_id)
        .await?
        .ok_or(AppError::Engine(EngineError::Core(CoreError::NotFound {
            entity: "Visitor",
            id: visitor_id,
        })))?;

    let level = viblog_core::level::level_info(visitor.level);
    let streak = StreakRepo::find_by_visitor(&state.pool, visitor_id).await?;
    let badges = BadgeRepo::list_for_visitor(&state.pool, visitor_id).await?;
    let recent_xp = LedgerRepo::recent_for_visitor(&state.pool, visitor_id, 20).await?;

    let today = state.engine.day_boundary().day_of(chrono::Utc::now());
    let mut conn = state.pool.acquire().await?;
    let catalog = DailyTaskRepo::list_catalog(&mut *conn).await?;
    let progress = DailyTaskRepo::progress_for_day(&state.pool, visitor_id, today).await?;

    let tasks: Vec<serde_json::Value> = catalog
        .into_iter()
        .map(|task| {
            let row = progress.iter().find(|p| p.task_id == task.id);
            serde_json::json!({
                "task_type": task.task_type,
                "title": task.title,
                "requirement": task.requirement,
                "xp_reward": task.xp_reward,
                "progress": row.map(|p| p.progress).unwrap_or(0),
                "completed": row.map(|p| p.completed).unwrap_or(false),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "data": {
            "visitor": visitor,
            "level": level,
            "streak": streak,
            "badges": badges,
            "tasks": tasks,
            "recent_xp": recent_xp,
        }
    })))
}

/// POST /api/v1/visitors/{id}/award
///
/// Award XP for an action. 400 when the action has no fixed reward and no
/// explicit points; 404 for an unknown visitor.
pub async fn award(
    State(state): State<AppState>,
    Path(visitor_id): Path<DbId>,
    Json(body): Json<AwardRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let result = state
        .engine
        .award(visitor_id, body.action, body.points, body.post_id)
        .await?;
    Ok(Json(serde_json::json!({ "data": result })))
}

/// POST /api/v1/visitors/{id}/check-in
///
/// Record the daily check-in. Same-day repeats return `is_new_day: false`
/// with zero XP.
pub async fn check_in(
    State(state): State<AppState>,
    Path(visitor_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let result = state.engine.check_in(visitor_id).await?;
    Ok(Json(serde_json::json!({ "data": result })))
}

/// POST /api/v1/visitors/{id}/badges/evaluate
///
/// Re-evaluate the badge catalog for a visitor, returning newly granted
/// badges (an empty list when nothing new applies).
pub async fn evaluate_badges(
    State(state): State<AppState>,
    Path(visitor_id): Path<DbId>,
    body: Option<Json<EvaluateRequest>>,
) -> AppResult<Json<serde_json::Value>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let ctx = EvaluateContext {
        reads_by_category: body.reads_by_category,
        weekly_xp_rank: body.weekly_xp_rank,
        weekly_streak_rank: body.weekly_streak_rank,
    };
    let granted = state.engine.evaluate_badges(visitor_id, ctx).await?;
    Ok(Json(serde_json::json!({ "data": granted })))
}

/// POST /api/v1/visitors/{id}/tasks/track
///
/// Add progress toward a daily task.
pub async fn track_task(
    State(state): State<AppState>,
    Path(visitor_id): Path<DbId>,
    Json(body): Json<TrackRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let result = state
        .engine
        .track_daily_task(visitor_id, &body.task_type, body.increment.unwrap_or(1))
        .await?;
    Ok(Json(serde_json::json!({ "data": result })))
}
