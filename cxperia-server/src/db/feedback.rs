//! Append-only logs (customer feedback, scan events, platform feedback)
//! and the analytics read over them

use chrono::Utc;
use cxperia_common::db::{CustomerFeedback, PlatformFeedback};
use cxperia_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use super::new_id;

pub async fn insert_customer_feedback(pool: &SqlitePool, feedback: &CustomerFeedback) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO customer_feedback (id, brand_id, experience_id, rating, comment,
                                       customer_name, customer_email, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&feedback.id)
    .bind(&feedback.brand_id)
    .bind(&feedback.experience_id)
    .bind(feedback.rating)
    .bind(&feedback.comment)
    .bind(&feedback.customer_name)
    .bind(&feedback.customer_email)
    .bind(feedback.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_customer_feedback(
    pool: &SqlitePool,
    brand_id: &str,
    experience_id: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<CustomerFeedback>> {
    let rows = sqlx::query_as::<_, CustomerFeedback>(
        r#"
        SELECT * FROM customer_feedback
        WHERE brand_id = ?1 AND (?2 IS NULL OR experience_id = ?2)
        ORDER BY created_at DESC
        LIMIT ?3 OFFSET ?4
        "#,
    )
    .bind(brand_id)
    .bind(experience_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_customer_feedback(
    pool: &SqlitePool,
    brand_id: &str,
    experience_id: Option<&str>,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM customer_feedback WHERE brand_id = ?1 AND (?2 IS NULL OR experience_id = ?2)",
    )
    .bind(brand_id)
    .bind(experience_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn insert_scan_event(
    pool: &SqlitePool,
    brand_id: &str,
    experience_id: &str,
    user_agent: Option<&str>,
    referrer: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO scan_events (id, brand_id, experience_id, user_agent, referrer, scanned_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new_id())
    .bind(brand_id)
    .bind(experience_id)
    .bind(user_agent)
    .bind(referrer)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_platform_feedback(pool: &SqlitePool, feedback: &PlatformFeedback) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO platform_feedback (id, brand_id, profile_id, category, message, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&feedback.id)
    .bind(&feedback.brand_id)
    .bind(&feedback.profile_id)
    .bind(&feedback.category)
    .bind(&feedback.message)
    .bind(feedback.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_platform_feedback(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<PlatformFeedback>> {
    let rows = sqlx::query_as::<_, PlatformFeedback>(
        "SELECT * FROM platform_feedback ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_platform_feedback(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM platform_feedback")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Brand dashboard totals
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AnalyticsTotals {
    pub experiences: i64,
    pub published_experiences: i64,
    pub scans: i64,
    pub feedback: i64,
    pub average_rating: Option<f64>,
}

/// Scan and feedback figures for one experience
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExperienceStats {
    pub experience_id: String,
    pub product_name: String,
    pub slug: Option<String>,
    pub scan_count: i64,
    pub feedback_count: i64,
    pub average_rating: Option<f64>,
}

pub async fn analytics_totals(pool: &SqlitePool, brand_id: &str) -> Result<AnalyticsTotals> {
    let totals = sqlx::query_as::<_, AnalyticsTotals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM experiences WHERE brand_id = ?1) AS experiences,
            (SELECT COUNT(*) FROM experiences WHERE brand_id = ?1 AND is_published = 1) AS published_experiences,
            (SELECT COUNT(*) FROM scan_events WHERE brand_id = ?1) AS scans,
            (SELECT COUNT(*) FROM customer_feedback WHERE brand_id = ?1) AS feedback,
            (SELECT AVG(rating) FROM customer_feedback WHERE brand_id = ?1) AS average_rating
        "#,
    )
    .bind(brand_id)
    .fetch_one(pool)
    .await?;
    Ok(totals)
}

pub async fn experience_stats(pool: &SqlitePool, brand_id: &str) -> Result<Vec<ExperienceStats>> {
    let rows = sqlx::query_as::<_, ExperienceStats>(
        r#"
        SELECT
            e.id AS experience_id,
            p.name AS product_name,
            e.slug AS slug,
            e.scan_count AS scan_count,
            COUNT(f.id) AS feedback_count,
            AVG(f.rating) AS average_rating
        FROM experiences e
        JOIN products p ON p.id = e.product_id
        LEFT JOIN customer_feedback f ON f.experience_id = e.id
        WHERE e.brand_id = ?
        GROUP BY e.id
        ORDER BY e.scan_count DESC, p.name ASC
        "#,
    )
    .bind(brand_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Platform-wide totals for operators
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlatformStats {
    pub brands: i64,
    pub users: i64,
    pub products: i64,
    pub experiences: i64,
    pub published_experiences: i64,
    pub scans: i64,
    pub feedback: i64,
}

pub async fn platform_stats(pool: &SqlitePool) -> Result<PlatformStats> {
    let stats = sqlx::query_as::<_, PlatformStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM brands) AS brands,
            (SELECT COUNT(*) FROM profiles) AS users,
            (SELECT COUNT(*) FROM products) AS products,
            (SELECT COUNT(*) FROM experiences) AS experiences,
            (SELECT COUNT(*) FROM experiences WHERE is_published = 1) AS published_experiences,
            (SELECT COUNT(*) FROM scan_events) AS scans,
            (SELECT COUNT(*) FROM customer_feedback) AS feedback
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(stats)
}
