//! Session tokens
//!
//! A token is 32 random bytes, URL-safe base64 encoded, handed to the client
//! once. The database stores only its SHA-256 digest.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqliteExecutor;

use crate::db;
use cxperia_common::Result;

/// Generate a fresh random token
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 of a token, as stored in `sessions.token_hash`
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Create a session for `profile_id`, returning the raw token
pub async fn start_session<'e, E: SqliteExecutor<'e>>(
    executor: E,
    profile_id: &str,
    ttl_hours: i64,
) -> Result<String> {
    let token = generate_token();
    let expires_at = cxperia_common::time::hours_from_now(ttl_hours);
    db::sessions::insert_session(executor, &hash_token(&token), profile_id, expires_at).await?;
    Ok(token)
}
