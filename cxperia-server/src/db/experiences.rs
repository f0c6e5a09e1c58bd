//! Experience (QR landing page) persistence

use cxperia_common::db::Experience;
use cxperia_common::{Error, Result};
use sqlx::SqlitePool;

use super::found;

pub async fn insert_experience(pool: &SqlitePool, experience: &Experience) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO experiences (id, brand_id, product_id, slug, is_published, theme, primary_color,
                                 public_url, qr_code_url, tutorial_video_url, support_email,
                                 support_phone, support_url, scan_count, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&experience.id)
    .bind(&experience.brand_id)
    .bind(&experience.product_id)
    .bind(&experience.slug)
    .bind(experience.is_published)
    .bind(&experience.theme)
    .bind(&experience.primary_color)
    .bind(&experience.public_url)
    .bind(&experience.qr_code_url)
    .bind(&experience.tutorial_video_url)
    .bind(&experience.support_email)
    .bind(&experience.support_phone)
    .bind(&experience.support_url)
    .bind(experience.scan_count)
    .bind(experience.created_at)
    .bind(experience.updated_at)
    .execute(pool)
    .await
    .map_err(|e| Error::from_write(e, "Experience slug"))?;
    Ok(())
}

/// Experience owned by `brand_id`
pub async fn get_experience(pool: &SqlitePool, brand_id: &str, id: &str) -> Result<Experience> {
    let experience =
        sqlx::query_as::<_, Experience>("SELECT * FROM experiences WHERE id = ? AND brand_id = ?")
            .bind(id)
            .bind(brand_id)
            .fetch_optional(pool)
            .await?;
    found(experience, "Experience")
}

/// Published experience by public slug
pub async fn get_published_by_slug(pool: &SqlitePool, slug: &str) -> Result<Experience> {
    let experience = sqlx::query_as::<_, Experience>(
        "SELECT * FROM experiences WHERE slug = ? AND is_published = 1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    found(experience, "Experience")
}

pub async fn list_experiences(pool: &SqlitePool, brand_id: &str) -> Result<Vec<Experience>> {
    let experiences = sqlx::query_as::<_, Experience>(
        "SELECT * FROM experiences WHERE brand_id = ? ORDER BY created_at DESC",
    )
    .bind(brand_id)
    .fetch_all(pool)
    .await?;
    Ok(experiences)
}

pub async fn slug_taken(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM experiences WHERE slug = ?)")
        .bind(slug)
        .fetch_one(pool)
        .await?;
    Ok(taken)
}

/// Slugs issued for a brand (cache purge targets)
pub async fn slugs_for_brand(pool: &SqlitePool, brand_id: &str) -> Result<Vec<String>> {
    let slugs: Vec<String> = sqlx::query_scalar(
        "SELECT slug FROM experiences WHERE brand_id = ? AND slug IS NOT NULL ORDER BY slug",
    )
    .bind(brand_id)
    .fetch_all(pool)
    .await?;
    Ok(slugs)
}

/// Full overwrite of the editable columns (slug, QR and counters untouched)
pub async fn update_experience(pool: &SqlitePool, experience: &Experience) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE experiences
        SET is_published = ?, theme = ?, primary_color = ?, tutorial_video_url = ?,
            support_email = ?, support_phone = ?, support_url = ?, updated_at = ?
        WHERE id = ? AND brand_id = ?
        "#,
    )
    .bind(experience.is_published)
    .bind(&experience.theme)
    .bind(&experience.primary_color)
    .bind(&experience.tutorial_video_url)
    .bind(&experience.support_email)
    .bind(&experience.support_phone)
    .bind(&experience.support_url)
    .bind(experience.updated_at)
    .bind(&experience.id)
    .bind(&experience.brand_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Store an issued QR code and publish the experience
///
/// Only fills `qr_code_url` when it is still NULL, so two concurrent issuers
/// cannot overwrite each other; the caller re-reads to get the winner.
pub async fn store_qr_code(
    pool: &SqlitePool,
    id: &str,
    slug: &str,
    public_url: &str,
    qr_code_url: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE experiences
        SET slug = COALESCE(slug, ?), public_url = ?, qr_code_url = ?, is_published = 1, updated_at = ?
        WHERE id = ? AND qr_code_url IS NULL
        "#,
    )
    .bind(slug)
    .bind(public_url)
    .bind(qr_code_url)
    .bind(chrono::Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| Error::from_write(e, "Experience slug"))?;
    Ok(())
}

/// Bump the scan counter, returning the new value
pub async fn increment_scan_count(pool: &SqlitePool, id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "UPDATE experiences SET scan_count = scan_count + 1 WHERE id = ? RETURNING scan_count",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn delete_experience(pool: &SqlitePool, brand_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM experiences WHERE id = ? AND brand_id = ?")
        .bind(id)
        .bind(brand_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
pub(crate) fn sample_experience(brand_id: &str, product_id: &str) -> Experience {
    let now = chrono::Utc::now();
    Experience {
        id: super::new_id(),
        brand_id: brand_id.to_string(),
        product_id: product_id.to_string(),
        slug: None,
        is_published: false,
        theme: "light".to_string(),
        primary_color: None,
        public_url: None,
        qr_code_url: None,
        tutorial_video_url: None,
        support_email: None,
        support_phone: None,
        support_url: None,
        scan_count: 0,
        created_at: now,
        updated_at: now,
    }
}
