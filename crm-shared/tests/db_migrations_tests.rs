/// Integration tests for database migrations
///
/// These tests require a running PostgreSQL database and are skipped when
/// DATABASE_URL is not set.

use crm_shared::db::migrations::{ensure_database_exists, get_migration_status, run_migrations};
use crm_shared::db::pool::{close_pool, create_pool, DatabaseConfig};

#[tokio::test]
async fn test_run_migrations_is_idempotent() {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        return;
    };

    ensure_database_exists(&url)
        .await
        .expect("Failed to create database");

    let pool = create_pool(DatabaseConfig {
        url,
        ..Default::default()
    })
    .await
    .expect("Failed to create pool");

    run_migrations(&pool).await.expect("First run failed");
    run_migrations(&pool).await.expect("Second run failed");

    let status = get_migration_status(&pool)
        .await
        .expect("Failed to get migration status");
    assert!(status.is_up_to_date);
    assert_eq!(status.applied_migrations, 4);
    assert!(status.latest_version.is_some());

    for table in ["users", "customers", "tags", "customer_tags", "notes", "problems"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "table {table} missing");
    }

    close_pool(pool).await;
}
