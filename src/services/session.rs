//! Bearer-token session management.
//!
//! ARCHITECTURE
//! ============
//! Login and registration mint an opaque 32-byte hex token that the client
//! persists and sends back as `Authorization: Bearer <token>`. Only the
//! SHA-256 of the token is stored, so a leaked sessions table cannot be
//! replayed. Expired rows are treated as absent; validation never extends
//! a session's lifetime.

use std::fmt::Write;

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex bearer token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// SHA-256 of a bearer token, hex encoded. This is what the sessions table
/// stores.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

/// Create a session for the given user, returning the raw bearer token.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn create_session(pool: &PgPool, user_id: Uuid, ttl_hours: u64) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query(
        r"INSERT INTO sessions (token_hash, user_id, expires_at)
          VALUES ($1, $2, now() + make_interval(hours => $3))",
    )
    .bind(hash_token(&token))
    .bind(user_id)
    .bind(i32::try_from(ttl_hours).unwrap_or(24))
    .execute(pool)
    .await?;
    Ok(token)
}

/// Validate a bearer token and return the associated user id.
///
/// # Errors
///
/// Returns an error if the lookup fails; an unknown or expired token is
/// `Ok(None)`.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT user_id FROM sessions
          WHERE token_hash = $1 AND expires_at > now()",
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.get("user_id")))
}

/// Delete a session by its bearer token.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(hash_token(token))
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
