//! Tests for database creation, schema and migrations

use cxperia_common::api::auth::{load_shared_secret, store_shared_secret};
use cxperia_common::db::init::init_database;
use cxperia_common::db::migrations::{column_exists, get_schema_version, CURRENT_SCHEMA_VERSION};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("cxperia.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("cxperia.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("cxperia.db")).await.unwrap();

    for table in [
        "brands",
        "profiles",
        "sessions",
        "products",
        "experiences",
        "digital_instructions",
        "ingredients",
        "experience_features",
        "tutorials",
        "customer_feedback",
        "scan_events",
        "platform_feedback",
        "uploads",
        "settings",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "table {} missing", table);
    }
}

#[tokio::test]
async fn test_migrations_reach_current_version() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("cxperia.db")).await.unwrap();

    assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);
    assert!(column_exists(&pool, "experiences", "support_url").await.unwrap());
    assert!(!column_exists(&pool, "experiences", "no_such_column").await.unwrap());
}

#[tokio::test]
async fn test_foreign_keys_cascade_on_brand_delete() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("cxperia.db")).await.unwrap();
    let now = chrono::Utc::now();

    sqlx::query(
        "INSERT INTO brands (id, name, slug, created_at, updated_at) VALUES ('b1', 'B', 'b', ?, ?)",
    )
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO products (id, brand_id, name, created_at, updated_at) VALUES ('p1', 'b1', 'P', ?, ?)",
    )
    .bind(now)
    .bind(now)
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM brands WHERE id = 'b1'")
        .execute(&pool)
        .await
        .unwrap();

    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(products, 0);
}

#[tokio::test]
async fn test_shared_secret_generated_once() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("cxperia.db")).await.unwrap();

    let first = load_shared_secret(&pool).await.unwrap();
    let second = load_shared_secret(&pool).await.unwrap();
    assert_ne!(first, 0);
    assert_eq!(first, second);

    store_shared_secret(&pool, 0).await.unwrap();
    assert_eq!(load_shared_secret(&pool).await.unwrap(), 0);
}
