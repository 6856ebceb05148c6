//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use sqlx::PgPool;
use viblog_core::day::DayBoundary;
use viblog_core::types::DbId;
use viblog_engine::GamificationEngine;
use viblog_events::EventBus;

/// Build an engine over the test pool with the default UTC day boundary.
pub fn engine(pool: &PgPool) -> GamificationEngine {
    GamificationEngine::new(pool.clone(), Arc::new(EventBus::default()), DayBoundary::Utc)
}

/// Register a visitor and return their id.
pub async fn register(engine: &GamificationEngine, username: &str) -> DbId {
    engine
        .register(username)
        .await
        .expect("registration should succeed")
        .visitor
        .id
}

/// Move a visitor's last check-in back by whole days, simulating the
/// passage of calendar time.
pub async fn rewind_last_check_in(pool: &PgPool, visitor_id: DbId, days: i32) {
    sqlx::query(
        "UPDATE streaks SET last_check_in = last_check_in - ($1 * INTERVAL '1 day') \
         WHERE visitor_id = $2",
    )
    .bind(days)
    .bind(visitor_id)
    .execute(pool)
    .await
    .expect("rewind last_check_in");
}

/// Pin a visitor's streak counters directly.
pub async fn set_streak(pool: &PgPool, visitor_id: DbId, current: i32, freezes_available: i32) {
    sqlx::query(
        "UPDATE streaks SET current_streak = $1, \
             longest_streak = GREATEST(longest_streak, $1), \
             freezes_available = $2 \
         WHERE visitor_id = $3",
    )
    .bind(current)
    .bind(freezes_available)
    .bind(visitor_id)
    .execute(pool)
    .await
    .expect("set streak state");
}

/// Read a visitor's materialized XP total.
pub async fn total_xp(pool: &PgPool, visitor_id: DbId) -> i64 {
    sqlx::query_scalar("SELECT total_xp FROM visitor_profiles WHERE id = $1")
        .bind(visitor_id)
        .fetch_one(pool)
        .await
        .expect("read total_xp")
}

/// Sum a visitor's ledger entries.
pub async fn ledger_sum(pool: &PgPool, visitor_id: DbId) -> i64 {
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(points), 0)::BIGINT FROM point_transactions WHERE visitor_id = $1",
    )
    .bind(visitor_id)
    .fetch_one(pool)
    .await
    .expect("sum ledger")
}
