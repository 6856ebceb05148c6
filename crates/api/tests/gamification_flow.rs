//! End-to-end API tests for the gamification routes:
//! - Registration with validation and conflict handling
//! - XP awards and error mapping (400 / 404)
//! - Daily check-in idempotency over HTTP
//! - Task tracking and the leaderboard snapshot

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_empty, post_json};
use serde_json::json;
use sqlx::PgPool;

async fn register(pool: &PgPool, username: &str) -> i64 {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/visitors",
        json!({ "username": username }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["visitor"]["id"]
        .as_i64()
        .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn registration_returns_created_profile(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/visitors",
        json!({ "username": "thuy-linh" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["visitor"]["username"], "thuy-linh");
    assert_eq!(data["visitor"]["total_xp"], 25);
    assert_eq!(data["visitor"]["level"], 1);
    assert_eq!(data["award"]["points_awarded"], 25);
    assert_eq!(data["badges"][0]["slug"], "nguoi-moi");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn visitor_overview_includes_level_streak_and_tasks(pool: PgPool) {
    let visitor = register(&pool, "diem-my").await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/visitors/{visitor}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["visitor"]["total_xp"], 25);
    assert_eq!(data["level"]["level"], 1);
    assert_eq!(data["level"]["name"], "Người Mới");
    assert_eq!(data["streak"]["current_streak"], 1);
    assert_eq!(data["badges"][0]["slug"], "nguoi-moi");
    // All four catalog tasks appear with zero progress.
    let tasks = data["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 4);
    assert!(tasks.iter().all(|t| t["progress"] == 0));
    // Registration's first-action award is the only ledger entry.
    assert_eq!(data["recent_xp"][0]["action"], "first_action");
    assert_eq!(data["recent_xp"][0]["points"], 25);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_visitor_overview_is_not_found(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/visitors/555").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn short_username_is_rejected(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/visitors",
        json!({ "username": "ab" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_username_conflicts(pool: PgPool) {
    register(&pool, "trung").await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/visitors",
        json!({ "username": "trung" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn award_applies_the_fixed_reward(pool: PgPool) {
    let visitor = register(&pool, "oanh").await;

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/visitors/{visitor}/award"),
        json!({ "action": "read", "post_id": 7 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["points_awarded"], 10);
    assert_eq!(json["data"]["new_total_xp"], 35);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn award_without_points_for_computed_action_is_bad_request(pool: PgPool) {
    let visitor = register(&pool, "tam").await;

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/visitors/{visitor}/award"),
        json!({ "action": "streak_bonus" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn award_to_unknown_visitor_is_not_found(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/visitors/9999/award",
        json!({ "action": "read" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn same_day_check_in_reports_no_new_day(pool: PgPool) {
    let visitor = register(&pool, "yen").await;

    // Registration created today's streak row already.
    let response = post_empty(
        common::build_test_app(pool),
        &format!("/api/v1/visitors/{visitor}/check-in"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["is_new_day"], false);
    assert_eq!(json["data"]["xp_awarded"], 0);
    assert_eq!(json["data"]["current_streak"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn badge_evaluation_accepts_an_empty_body(pool: PgPool) {
    let visitor = register(&pool, "xuan").await;

    let response = post_empty(
        common::build_test_app(pool),
        &format!("/api/v1/visitors/{visitor}/badges/evaluate"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn task_tracking_reports_progress(pool: PgPool) {
    let visitor = register(&pool, "son").await;

    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/visitors/{visitor}/tasks/track"),
        json!({ "task_type": "read_posts", "increment": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["task"]["progress"], 2);
    assert_eq!(json["data"]["task"]["completed"], false);
    assert_eq!(json["data"]["completed_now"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn leaderboard_defaults_to_alltime_xp(pool: PgPool) {
    let first = register(&pool, "hang").await;
    register(&pool, "tien").await;

    let response = get(common::build_test_app(pool), "/api/v1/leaderboard").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let entries = json["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["rank"], 1);
    // Equal totals tie-break toward the earlier id.
    assert_eq!(entries[0]["visitor_id"], first);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn notifications_start_empty(pool: PgPool) {
    let visitor = register(&pool, "phong").await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/visitors/{visitor}/notifications"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
    assert_eq!(json["unread_count"], 0);
}