//! User profiles (one brand each)

use cxperia_common::db::{Profile, Role};
use cxperia_common::{Error, Result};
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn insert_profile<'e, E: SqliteExecutor<'e>>(executor: E, profile: &Profile) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, brand_id, email, password_hash, full_name, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.brand_id)
    .bind(&profile.email)
    .bind(&profile.password_hash)
    .bind(&profile.full_name)
    .bind(profile.role)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(executor)
    .await
    .map_err(|e| Error::from_write(e, "An account with this email"))?;
    Ok(())
}

pub async fn get_profile(pool: &SqlitePool, id: &str) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

/// Lookup by email (stored lowercase)
pub async fn get_profile_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn update_password_hash(pool: &SqlitePool, id: &str, password_hash: &str) -> Result<()> {
    sqlx::query("UPDATE profiles SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_role(pool: &SqlitePool, id: &str, role: Role) -> Result<()> {
    sqlx::query("UPDATE profiles SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Users of a brand, oldest first
pub async fn list_profiles_for_brand(pool: &SqlitePool, brand_id: &str) -> Result<Vec<Profile>> {
    let profiles = sqlx::query_as::<_, Profile>(
        "SELECT * FROM profiles WHERE brand_id = ? ORDER BY created_at ASC",
    )
    .bind(brand_id)
    .fetch_all(pool)
    .await?;
    Ok(profiles)
}
