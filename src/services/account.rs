//! Account lifecycle: registration, login, the one-time username claim,
//! and profile reads/updates.
//!
//! DESIGN
//! ======
//! Username uniqueness is enforced by the database (unique index), not by a
//! check-then-insert race. The claim flow additionally guards `username IS
//! NULL` in the UPDATE so a handle can be bound at most once per account,
//! no matter how many requests race.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::username::{UsernameError, validate_username_with_max};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account disabled")]
    AccountDisabled,
    #[error("{0}")]
    InvalidUsername(UsernameError),
    #[error("username already taken")]
    UsernameTaken,
    #[error("username already set for this account")]
    UsernameAlreadySet,
    #[error("user not found")]
    NotFound,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Publicly visible user record. Never carries the password hash.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub full_name: String,
    pub bio: String,
    pub avatar_url: String,
    pub saldo: i64,
    pub level: String,
    pub created_at: String,
    pub is_active: bool,
}

impl PublicProfile {
    #[must_use]
    pub fn needs_username(&self) -> bool {
        self.username.as_deref().unwrap_or("").is_empty()
    }
}

const PROFILE_COLUMNS: &str = r#"id, email, username, full_name, bio, avatar_url, saldo, level,
    to_char(created_at, 'YYYY-MM-DD"T"HH24:MI:SS') AS created_at, is_active"#;

fn profile_from_row(row: &PgRow) -> PublicProfile {
    PublicProfile {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        bio: row.get("bio"),
        avatar_url: row.get("avatar_url"),
        saldo: row.get("saldo"),
        level: row.get("level"),
        created_at: row.get("created_at"),
        is_active: row.get("is_active"),
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `AccountError::Hash` if the hasher fails.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AccountError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC-format hash. A malformed stored
/// hash verifies as false rather than erroring; the caller only cares
/// whether login may proceed.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Register a new account. The username stays unset until the claim flow.
///
/// # Errors
///
/// `InvalidEmail`/`WeakPassword` on syntactic rejection, `EmailTaken` on a
/// duplicate email, `Db` on other database failures.
pub async fn register(
    pool: &PgPool,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<PublicProfile, AccountError> {
    let email = normalize_email(email).ok_or(AccountError::InvalidEmail)?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AccountError::WeakPassword);
    }
    let password_hash = hash_password(password)?;

    let query = format!(
        r"INSERT INTO users (email, password_hash, full_name)
          VALUES ($1, $2, $3)
          RETURNING {PROFILE_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(&email)
        .bind(&password_hash)
        .bind(full_name.trim())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AccountError::EmailTaken
            } else {
                AccountError::Db(e)
            }
        })?;

    Ok(profile_from_row(&row))
}

/// Verify credentials and return the profile.
///
/// # Errors
///
/// `InvalidCredentials` for an unknown email or wrong password (the two are
/// indistinguishable on purpose), `AccountDisabled` for deactivated
/// accounts.
pub async fn login(pool: &PgPool, email: &str, password: &str) -> Result<PublicProfile, AccountError> {
    let email = normalize_email(email).ok_or(AccountError::InvalidCredentials)?;

    let query = format!("SELECT {PROFILE_COLUMNS}, password_hash FROM users WHERE email = $1");
    let row = sqlx::query(&query)
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(AccountError::InvalidCredentials)?;

    let stored_hash: String = row.get("password_hash");
    if !verify_password(password, &stored_hash) {
        return Err(AccountError::InvalidCredentials);
    }

    let profile = profile_from_row(&row);
    if !profile.is_active {
        return Err(AccountError::AccountDisabled);
    }
    Ok(profile)
}

/// Bind a username to an account. Fires at most once per account.
///
/// # Errors
///
/// `InvalidUsername` on syntactic rejection, `UsernameAlreadySet` when the
/// account already claimed a handle, `UsernameTaken` when another account
/// holds the name.
pub async fn select_username(
    pool: &PgPool,
    user_id: Uuid,
    username: &str,
    max_len: usize,
) -> Result<PublicProfile, AccountError> {
    validate_username_with_max(username, max_len).map_err(AccountError::InvalidUsername)?;

    let query = format!(
        r"UPDATE users
          SET username = $1, updated_at = now()
          WHERE id = $2 AND username IS NULL
          RETURNING {PROFILE_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(username)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AccountError::UsernameTaken
            } else {
                AccountError::Db(e)
            }
        })?;

    match row {
        Some(row) => Ok(profile_from_row(&row)),
        // Updated zero rows: either the account already has a username or
        // the user id is unknown.
        None => {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
            if exists {
                Err(AccountError::UsernameAlreadySet)
            } else {
                Err(AccountError::NotFound)
            }
        }
    }
}

/// Whether a username is unclaimed. Syntactically invalid names report
/// unavailable without touching the database.
///
/// # Errors
///
/// Returns `Db` on lookup failure, which the caller must surface distinctly
/// from "taken".
pub async fn username_available(pool: &PgPool, username: &str, max_len: usize) -> Result<bool, AccountError> {
    if validate_username_with_max(username, max_len).is_err() {
        return Ok(false);
    }
    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(!taken)
}

/// Fetch a profile by user id.
///
/// # Errors
///
/// `NotFound` when no such user exists.
pub async fn profile_by_id(pool: &PgPool, user_id: Uuid) -> Result<PublicProfile, AccountError> {
    let query = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1");
    let row = sqlx::query(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AccountError::NotFound)?;
    Ok(profile_from_row(&row))
}

/// Fetch a profile by username.
///
/// # Errors
///
/// `NotFound` when no account holds the name.
pub async fn profile_by_username(pool: &PgPool, username: &str) -> Result<PublicProfile, AccountError> {
    let query = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE username = $1");
    let row = sqlx::query(&query)
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or(AccountError::NotFound)?;
    Ok(profile_from_row(&row))
}

/// Fields the owning user may change after signup. Username is deliberately
/// absent; it is immutable once claimed.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Apply a partial profile update and return the fresh profile.
///
/// # Errors
///
/// `NotFound` when the user id is unknown.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    update: &ProfileUpdate,
) -> Result<PublicProfile, AccountError> {
    let query = format!(
        r"UPDATE users
          SET full_name  = COALESCE($1, full_name),
              bio        = COALESCE($2, bio),
              avatar_url = COALESCE($3, avatar_url),
              updated_at = now()
          WHERE id = $4
          RETURNING {PROFILE_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(update.full_name.as_deref())
        .bind(update.bio.as_deref())
        .bind(update.avatar_url.as_deref())
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AccountError::NotFound)?;
    Ok(profile_from_row(&row))
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
