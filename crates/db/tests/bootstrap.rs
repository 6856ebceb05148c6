use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify the seeded catalogs.
#[sqlx::test(migrations = "./migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    viblog_db::health_check(&pool).await.unwrap();

    // Both catalogs must carry seed data.
    for table in ["badges", "daily_tasks"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert!(count.0 > 0, "{table} should have seed data, got 0 rows");
    }

    // Every streak milestone badge the engine can grant must be seeded.
    for slug in [
        "chuoi-3-ngay",
        "mot-tuan-khong-nghi",
        "hai-tuan-lien-tiep",
        "mot-thang-tron-ven",
        "hai-thang-ben-bi",
        "mot-tram-ngay",
        "mot-nam-doc-gia",
    ] {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM badges WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&pool)
            .await
            .unwrap();
        assert!(found.is_some(), "milestone badge {slug} missing from seed");
    }
}

/// Every seeded badge requirement must deserialize into a known rule shape.
#[sqlx::test(migrations = "./migrations")]
async fn test_seeded_requirements_parse(pool: PgPool) {
    let rows: Vec<(String, serde_json::Value)> =
        sqlx::query_as("SELECT slug, requirement FROM badges ORDER BY slug")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert!(!rows.is_empty());
    for (slug, raw) in rows {
        serde_json::from_value::<viblog_core::badge_rules::BadgeRule>(raw)
            .unwrap_or_else(|e| panic!("badge {slug} has an unparseable requirement: {e}"));
    }
}
