//! Database initialization
//!
//! Opens (or creates) the SQLite database, enables foreign keys and WAL, and
//! creates every table idempotently. Safe to call on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .min_connections(1)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                // Per-connection pragma: cascades must fire on every pooled connection
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    create_schema(&pool).await?;
    crate::db::migrations::run_migrations(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_settings_table(pool).await?;
    create_brands_table(pool).await?;
    create_profiles_table(pool).await?;
    create_sessions_table(pool).await?;
    create_products_table(pool).await?;
    create_experiences_table(pool).await?;
    create_digital_instructions_table(pool).await?;
    create_ingredients_table(pool).await?;
    create_experience_features_table(pool).await?;
    create_tutorials_table(pool).await?;
    create_customer_feedback_table(pool).await?;
    create_scan_events_table(pool).await?;
    create_platform_feedback_table(pool).await?;
    create_uploads_table(pool).await?;
    Ok(())
}

async fn execute(pool: &SqlitePool, sql: &str) -> Result<()> {
    sqlx::query(sql).execute(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await
}

/// Application key-value settings (holds `api_shared_secret`)
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await
}

async fn create_brands_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS brands (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            logo_url TEXT,
            primary_color TEXT,
            plan TEXT NOT NULL DEFAULT 'free'
                CHECK (plan IN ('free', 'starter', 'pro', 'enterprise')),
            contact_email TEXT,
            contact_phone TEXT,
            website TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_profiles_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            full_name TEXT,
            role TEXT NOT NULL DEFAULT 'brand_admin'
                CHECK (role IN ('brand_admin', 'super_admin', 'sales_admin')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token_hash TEXT PRIMARY KEY,
            profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_products_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            category TEXT,
            image_urls TEXT NOT NULL DEFAULT '[]',
            price REAL,
            currency TEXT NOT NULL DEFAULT 'USD',
            usage_duration_days INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_experiences_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS experiences (
            id TEXT PRIMARY KEY,
            brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            slug TEXT UNIQUE,
            is_published INTEGER NOT NULL DEFAULT 0,
            theme TEXT NOT NULL DEFAULT 'light',
            primary_color TEXT,
            public_url TEXT,
            qr_code_url TEXT,
            tutorial_video_url TEXT,
            support_email TEXT,
            support_phone TEXT,
            scan_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_digital_instructions_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS digital_instructions (
            id TEXT PRIMARY KEY,
            experience_id TEXT NOT NULL REFERENCES experiences(id) ON DELETE CASCADE,
            step_number INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            media_url TEXT
        )
        "#,
    )
    .await
}

async fn create_ingredients_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS ingredients (
            id TEXT PRIMARY KEY,
            brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            experience_id TEXT NOT NULL REFERENCES experiences(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            is_allergen INTEGER NOT NULL DEFAULT 0,
            position INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .await
}

async fn create_experience_features_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS experience_features (
            experience_id TEXT NOT NULL REFERENCES experiences(id) ON DELETE CASCADE,
            feature_name TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (experience_id, feature_name)
        )
        "#,
    )
    .await
}

async fn create_tutorials_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS tutorials (
            id TEXT PRIMARY KEY,
            brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            experience_id TEXT REFERENCES experiences(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            description TEXT,
            video_url TEXT,
            thumbnail_url TEXT,
            is_published INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_customer_feedback_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS customer_feedback (
            id TEXT PRIMARY KEY,
            brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            experience_id TEXT NOT NULL REFERENCES experiences(id) ON DELETE CASCADE,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment TEXT,
            customer_name TEXT,
            customer_email TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_scan_events_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS scan_events (
            id TEXT PRIMARY KEY,
            brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            experience_id TEXT NOT NULL REFERENCES experiences(id) ON DELETE CASCADE,
            user_agent TEXT,
            referrer TEXT,
            scanned_at TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_platform_feedback_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS platform_feedback (
            id TEXT PRIMARY KEY,
            brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            profile_id TEXT REFERENCES profiles(id) ON DELETE SET NULL,
            category TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await
}

async fn create_uploads_table(pool: &SqlitePool) -> Result<()> {
    execute(
        pool,
        r#"
        CREATE TABLE IF NOT EXISTS uploads (
            id TEXT PRIMARY KEY,
            brand_id TEXT NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            url TEXT NOT NULL,
            public_id TEXT,
            resource_type TEXT NOT NULL CHECK (resource_type IN ('image', 'video')),
            bytes INTEGER,
            format TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await
}
