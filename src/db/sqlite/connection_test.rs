//! Tests for SQLite database connection and migrations.

use crate::db::{Database, SqliteDatabase};

#[tokio::test(flavor = "multi_thread")]
async fn migrate_creates_all_tables() {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");

    db.migrate().await.expect("Migration should succeed");

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(db.pool())
            .await
            .expect("Query should succeed");

    // _sqlx_migrations is created by sqlx for migration tracking.
    let expected = vec![
        "_sqlx_migrations",
        "project_steps",
        "projects",
        "scripts",
        "users",
    ];

    for table in &expected {
        assert!(
            tables.iter().any(|t| t == table),
            "Missing table: {}. Found tables: {:?}",
            table,
            tables
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn migrate_is_idempotent() {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");

    db.migrate().await.expect("First migration should succeed");
    db.migrate().await.expect("Second migration should succeed");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(db.pool())
        .await
        .expect("Query should succeed");

    assert_eq!(count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn foreign_keys_are_enforced() {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();

    let result = sqlx::query(
        "INSERT INTO projects (id, user_id, title, status, source_type, created_at, updated_at) \
         VALUES ('p1', 'ghost', 'Orphan', 'draft', 'custom', '2025-01-01', '2025-01-01')",
    )
    .execute(db.pool())
    .await;

    assert!(result.is_err(), "Project without an owner must be rejected");
}

#[tokio::test(flavor = "multi_thread")]
async fn open_creates_database_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("conveyor.db");

    let db = SqliteDatabase::open(&path)
        .await
        .expect("Open should create the file");
    db.migrate().await.expect("Migration should succeed");
    db.close().await;

    assert!(path.exists());
}
