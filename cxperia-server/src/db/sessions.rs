//! Login sessions
//!
//! Only the SHA-256 digest of a session token is stored.

use chrono::{DateTime, Utc};
use cxperia_common::Result;
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn insert_session<'e, E: SqliteExecutor<'e>>(
    executor: E,
    token_hash: &str,
    profile_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO sessions (token_hash, profile_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(token_hash)
    .bind(profile_id)
    .bind(expires_at)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}

/// Profile id and expiry of a session
pub async fn find_session(
    pool: &SqlitePool,
    token_hash: &str,
) -> Result<Option<(String, DateTime<Utc>)>> {
    let row: Option<(String, DateTime<Utc>)> =
        sqlx::query_as("SELECT profile_id, expires_at FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

pub async fn delete_session(pool: &SqlitePool, token_hash: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Revoke every session of a profile except `keep_hash`
pub async fn delete_other_sessions(pool: &SqlitePool, profile_id: &str, keep_hash: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE profile_id = ? AND token_hash != ?")
        .bind(profile_id)
        .bind(keep_hash)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Remove sessions past their expiry
pub async fn delete_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
