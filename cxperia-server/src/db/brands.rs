//! Brand (tenant) persistence

use cxperia_common::db::{Brand, Plan};
use cxperia_common::{Error, Result};
use serde::Serialize;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::info;

use super::like_pattern;

/// Insert a brand row
pub async fn insert_brand<'e, E: SqliteExecutor<'e>>(executor: E, brand: &Brand) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO brands (id, name, slug, logo_url, primary_color, plan,
                            contact_email, contact_phone, website, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&brand.id)
    .bind(&brand.name)
    .bind(&brand.slug)
    .bind(&brand.logo_url)
    .bind(&brand.primary_color)
    .bind(brand.plan)
    .bind(&brand.contact_email)
    .bind(&brand.contact_phone)
    .bind(&brand.website)
    .bind(brand.created_at)
    .bind(brand.updated_at)
    .execute(executor)
    .await
    .map_err(|e| Error::from_write(e, "Brand"))?;
    Ok(())
}

pub async fn get_brand(pool: &SqlitePool, id: &str) -> Result<Option<Brand>> {
    let brand = sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(brand)
}

/// Write back every editable column
pub async fn update_brand(pool: &SqlitePool, brand: &Brand) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE brands
        SET name = ?, logo_url = ?, primary_color = ?, plan = ?,
            contact_email = ?, contact_phone = ?, website = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&brand.name)
    .bind(&brand.logo_url)
    .bind(&brand.primary_color)
    .bind(brand.plan)
    .bind(&brand.contact_email)
    .bind(&brand.contact_phone)
    .bind(&brand.website)
    .bind(brand.updated_at)
    .bind(&brand.id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_plan(pool: &SqlitePool, id: &str, plan: Plan) -> Result<()> {
    let result = sqlx::query("UPDATE brands SET plan = ?, updated_at = ? WHERE id = ?")
        .bind(plan)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Brand not found".to_string()));
    }
    Ok(())
}

pub async fn slug_taken(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM brands WHERE slug = ?)")
        .bind(slug)
        .fetch_one(pool)
        .await?;
    Ok(taken)
}

/// Delete a brand and everything it owns in one transaction
///
/// Child tables are cleared explicitly (leaf first) rather than relying on
/// cascades alone, so the deleted row counts can be reported. Returns the
/// total number of rows removed; `NotFound` if the brand does not exist.
pub async fn delete_brand(pool: &SqlitePool, id: &str) -> Result<u64> {
    const CHILD_TABLES: &[(&str, &str)] = &[
        (
            "digital_instructions",
            "DELETE FROM digital_instructions WHERE experience_id IN (SELECT id FROM experiences WHERE brand_id = ?)",
        ),
        (
            "experience_features",
            "DELETE FROM experience_features WHERE experience_id IN (SELECT id FROM experiences WHERE brand_id = ?)",
        ),
        ("ingredients", "DELETE FROM ingredients WHERE brand_id = ?"),
        ("customer_feedback", "DELETE FROM customer_feedback WHERE brand_id = ?"),
        ("scan_events", "DELETE FROM scan_events WHERE brand_id = ?"),
        ("tutorials", "DELETE FROM tutorials WHERE brand_id = ?"),
        ("experiences", "DELETE FROM experiences WHERE brand_id = ?"),
        ("products", "DELETE FROM products WHERE brand_id = ?"),
        ("uploads", "DELETE FROM uploads WHERE brand_id = ?"),
        ("platform_feedback", "DELETE FROM platform_feedback WHERE brand_id = ?"),
        (
            "sessions",
            "DELETE FROM sessions WHERE profile_id IN (SELECT id FROM profiles WHERE brand_id = ?)",
        ),
        ("profiles", "DELETE FROM profiles WHERE brand_id = ?"),
    ];

    let mut tx = pool.begin().await?;
    let mut removed = 0u64;

    for (table, sql) in CHILD_TABLES {
        let result = sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        if result.rows_affected() > 0 {
            info!("Brand {}: removed {} rows from {}", id, result.rows_affected(), table);
        }
        removed += result.rows_affected();
    }

    let result = sqlx::query("DELETE FROM brands WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        // Dropping the transaction rolls it back
        return Err(Error::NotFound("Brand not found".to_string()));
    }
    removed += result.rows_affected();

    tx.commit().await?;
    Ok(removed)
}

/// Brands matching an optional name/slug search, newest first
pub async fn list_brands(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Brand>> {
    let pattern = search.map(like_pattern);
    let brands = sqlx::query_as::<_, Brand>(
        r#"
        SELECT * FROM brands
        WHERE ?1 IS NULL OR name LIKE ?1 ESCAPE '\' OR slug LIKE ?1 ESCAPE '\'
        ORDER BY created_at DESC
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(brands)
}

pub async fn count_brands(pool: &SqlitePool, search: Option<&str>) -> Result<i64> {
    let pattern = search.map(like_pattern);
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM brands
        WHERE ?1 IS NULL OR name LIKE ?1 ESCAPE '\' OR slug LIKE ?1 ESCAPE '\'
        "#,
    )
    .bind(pattern)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Per-brand counters shown in the admin panel
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct BrandCounts {
    pub users: i64,
    pub products: i64,
    pub experiences: i64,
    pub published_experiences: i64,
    pub scans: i64,
    pub feedback: i64,
}

pub async fn brand_counts(pool: &SqlitePool, id: &str) -> Result<BrandCounts> {
    let counts = sqlx::query_as::<_, BrandCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM profiles WHERE brand_id = ?1) AS users,
            (SELECT COUNT(*) FROM products WHERE brand_id = ?1) AS products,
            (SELECT COUNT(*) FROM experiences WHERE brand_id = ?1) AS experiences,
            (SELECT COUNT(*) FROM experiences WHERE brand_id = ?1 AND is_published = 1) AS published_experiences,
            (SELECT COUNT(*) FROM scan_events WHERE brand_id = ?1) AS scans,
            (SELECT COUNT(*) FROM customer_feedback WHERE brand_id = ?1) AS feedback
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(counts)
}

#[cfg(test)]
pub(crate) fn sample_brand(name: &str) -> Brand {
    let now = chrono::Utc::now();
    Brand {
        id: super::new_id(),
        name: name.to_string(),
        slug: cxperia_common::slug::unique_slug(name),
        logo_url: None,
        primary_color: None,
        plan: Plan::Free,
        contact_email: None,
        contact_phone: None,
        website: None,
        created_at: now,
        updated_at: now,
    }
}
