//! Integration tests for daily check-ins:
//! - Same-day idempotency, including under concurrency
//! - Next-day continuation with the streak bonus
//! - Freeze consumption on a missed day
//! - Streak breaks when no freeze is left
//! - Milestone badges granted once, with their XP folded in

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;
use viblog_core::error::CoreError;
use viblog_engine::EngineError;

#[sqlx::test(migrations = "../db/migrations")]
async fn same_day_check_in_is_a_noop(pool: PgPool) {
    let engine = common::engine(&pool);
    let visitor = common::register(&engine, "minh").await;

    // Registration already created today's streak row.
    let result = engine.check_in(visitor).await.unwrap();
    assert!(!result.is_new_day);
    assert_eq!(result.current_streak, 1);
    assert_eq!(result.xp_awarded, 0);
    assert!(!result.streak_broken);
    assert!(!result.freeze_consumed);
    assert!(result.milestone_badge.is_none());

    assert_eq!(common::total_xp(&pool, visitor).await, 25);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn next_day_continues_the_streak(pool: PgPool) {
    let engine = common::engine(&pool);
    let visitor = common::register(&engine, "thu").await;
    common::rewind_last_check_in(&pool, visitor, 1).await;

    let result = engine.check_in(visitor).await.unwrap();
    assert!(result.is_new_day);
    assert_eq!(result.current_streak, 2);
    assert_eq!(result.longest_streak, 2);
    // 10 login + 2 * 2 streak bonus.
    assert_eq!(result.xp_awarded, 14);
    assert!(!result.streak_broken);
    assert!(!result.freeze_consumed);

    assert_eq!(common::total_xp(&pool, visitor).await, 25 + 14);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn concurrent_check_ins_award_once(pool: PgPool) {
    let engine = common::engine(&pool);
    let visitor = common::register(&engine, "quang").await;
    common::rewind_last_check_in(&pool, visitor, 1).await;

    let (a, b) = tokio::join!(engine.check_in(visitor), engine.check_in(visitor));
    let (a, b) = (a.unwrap(), b.unwrap());

    // The row lock serializes the pair: exactly one sees the new day.
    assert_eq!(
        [a.is_new_day, b.is_new_day].iter().filter(|d| **d).count(),
        1
    );
    assert_eq!(common::total_xp(&pool, visitor).await, 25 + 14);
    assert_eq!(common::ledger_sum(&pool, visitor).await, 25 + 14);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missed_day_consumes_a_freeze(pool: PgPool) {
    let engine = common::engine(&pool);
    let visitor = common::register(&engine, "vy").await;
    common::set_streak(&pool, visitor, 5, 2).await;
    common::rewind_last_check_in(&pool, visitor, 3).await;

    let result = engine.check_in(visitor).await.unwrap();
    assert!(result.is_new_day);
    assert!(result.freeze_consumed);
    assert!(!result.streak_broken);
    // The freeze preserves the streak; no continuation bonus is paid.
    assert_eq!(result.current_streak, 5);
    assert_eq!(result.xp_awarded, 10);

    let (available, used) = sqlx::query_as::<_, (i32, i32)>(
        "SELECT freezes_available, freezes_used FROM streaks WHERE visitor_id = $1",
    )
    .bind(visitor)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!((available, used), (1, 1));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missed_day_without_freezes_breaks_the_streak(pool: PgPool) {
    let engine = common::engine(&pool);
    let visitor = common::register(&engine, "dat").await;
    common::set_streak(&pool, visitor, 5, 0).await;
    common::rewind_last_check_in(&pool, visitor, 3).await;

    let result = engine.check_in(visitor).await.unwrap();
    assert!(result.is_new_day);
    assert!(result.streak_broken);
    assert_eq!(result.current_streak, 1);
    assert_eq!(result.xp_awarded, 10);
    // The best run survives the reset.
    assert_eq!(result.longest_streak, 5);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reaching_a_milestone_grants_its_badge_once(pool: PgPool) {
    let engine = common::engine(&pool);
    let visitor = common::register(&engine, "ngoc").await;
    common::set_streak(&pool, visitor, 6, 2).await;
    common::rewind_last_check_in(&pool, visitor, 1).await;

    let result = engine.check_in(visitor).await.unwrap();
    assert_eq!(result.current_streak, 7);
    let badge = result.milestone_badge.expect("seven-day milestone badge");
    assert_eq!(badge.slug, "mot-tuan-khong-nghi");
    assert_eq!(badge.rarity, "rare");
    // 10 login + 2 * 7 bonus + 75 badge reward.
    assert_eq!(result.xp_awarded, 10 + 14 + 75);

    // Re-reaching the same length never re-grants the badge.
    common::set_streak(&pool, visitor, 6, 2).await;
    common::rewind_last_check_in(&pool, visitor, 1).await;
    let again = engine.check_in(visitor).await.unwrap();
    assert_eq!(again.current_streak, 7);
    assert!(again.milestone_badge.is_none());
    assert_eq!(again.xp_awarded, 10 + 14);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn check_in_for_a_missing_visitor_is_not_found(pool: PgPool) {
    let engine = common::engine(&pool);

    let err = engine.check_in(4242).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::NotFound { .. }));
}
