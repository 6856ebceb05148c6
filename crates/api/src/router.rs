//! Route table.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{health, leaderboard, notifications, visitors};
use crate::state::AppState;

/// Root-level routes (outside `/api/v1`).
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/visitors", post(visitors::register))
        .route("/visitors/{id}", get(visitors::get_visitor))
        .route("/visitors/{id}/award", post(visitors::award))
        .route("/visitors/{id}/check-in", post(visitors::check_in))
        .route(
            "/visitors/{id}/badges/evaluate",
            post(visitors::evaluate_badges),
        )
        .route("/visitors/{id}/tasks/track", post(visitors::track_task))
        .route(
            "/visitors/{id}/notifications",
            get(notifications::list_notifications),
        )
        .route("/leaderboard", get(leaderboard::get_leaderboard))
}
