use sqlx::PgPool;

/// All `id` columns must be bigint.
#[sqlx::test(migrations = "./migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        assert_eq!(
            data_type, "bigint",
            "Table {table}.id should be bigint, got {data_type}"
        );
    }
}

/// No character varying columns should exist — TEXT is preferred.
#[sqlx::test(migrations = "./migrations")]
async fn test_no_varchar_columns(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, column_name
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND data_type = 'character varying'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name, column_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(
        rows.is_empty(),
        "varchar columns found, use TEXT instead: {rows:?}"
    );
}

/// Every idempotency guarantee the engine relies on must exist as a
/// unique constraint with the `uq_` prefix the error classifier expects.
#[sqlx::test(migrations = "./migrations")]
async fn test_unique_guards_exist(pool: PgPool) {
    for constraint in [
        "uq_visitor_profiles_username",
        "uq_streaks_visitor",
        "uq_badges_slug",
        "uq_user_badges_pair",
        "uq_daily_tasks_type",
        "uq_user_daily_tasks_scope",
        "uq_daily_bonuses_scope",
    ] {
        let found: Option<(String,)> = sqlx::query_as(
            "SELECT constraint_name
             FROM information_schema.table_constraints
             WHERE table_schema = 'public'
               AND constraint_type = 'UNIQUE'
               AND constraint_name = $1",
        )
        .bind(constraint)
        .fetch_optional(&pool)
        .await
        .unwrap();
        assert!(found.is_some(), "missing unique constraint {constraint}");
    }
}
