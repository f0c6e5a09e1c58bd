//! Database schema migrations
//!
//! Versioned, idempotent migrations tracked in `schema_version`. Tables are
//! created by `init::create_schema`; migrations carry every change made after
//! the initial layout.
//!
//! Never modify an existing migration. Add a new `migrate_vN` and bump
//! `CURRENT_SCHEMA_VERSION`.

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Get current schema version from database (0 when none recorded)
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    if current_version < 3 {
        migrate_v3(pool).await?;
        set_schema_version(pool, 3).await?;
        info!("✓ Migration v3 completed");
    }

    Ok(())
}

/// Migration v1: baseline layout from `create_schema`, nothing to change
async fn migrate_v1(_pool: &SqlitePool) -> Result<()> {
    Ok(())
}

/// Migration v2: customer-support link on experiences
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    if !column_exists(pool, "experiences", "support_url").await? {
        sqlx::query("ALTER TABLE experiences ADD COLUMN support_url TEXT")
            .execute(pool)
            .await?;
        info!("Migration v2: Added support_url to experiences table");
    }
    Ok(())
}

/// Migration v3: lookup indexes for brand-scoped listings and analytics
async fn migrate_v3(pool: &SqlitePool) -> Result<()> {
    const INDEXES: &[&str] = &[
        "CREATE INDEX IF NOT EXISTS idx_profiles_brand ON profiles(brand_id)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_profile ON sessions(profile_id)",
        "CREATE INDEX IF NOT EXISTS idx_products_brand ON products(brand_id)",
        "CREATE INDEX IF NOT EXISTS idx_experiences_brand ON experiences(brand_id)",
        "CREATE INDEX IF NOT EXISTS idx_instructions_experience ON digital_instructions(experience_id, step_number)",
        "CREATE INDEX IF NOT EXISTS idx_ingredients_experience ON ingredients(experience_id, position)",
        "CREATE INDEX IF NOT EXISTS idx_tutorials_brand ON tutorials(brand_id)",
        "CREATE INDEX IF NOT EXISTS idx_feedback_brand ON customer_feedback(brand_id, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_scans_experience ON scan_events(experience_id, scanned_at)",
        "CREATE INDEX IF NOT EXISTS idx_uploads_brand ON uploads(brand_id)",
    ];

    for sql in INDEXES {
        sqlx::query(sql).execute(pool).await?;
    }
    info!("Migration v3: Created {} indexes", INDEXES.len());
    Ok(())
}

/// True when `table` has a column named `column`
pub async fn column_exists(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}
