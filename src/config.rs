//! Application configuration parsed from environment variables.

use crate::services::username::USERNAME_MAX_LEN;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_HOURS: u64 = 24;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Maximum username length accepted by the claim flow. The hosted
    /// deployment used 20; the REST backend defaults to 30.
    pub username_max_len: usize,
    pub session_ttl_hours: u64,
    /// Seed the demo user and showcase projects on startup.
    pub seed_sample_data: bool,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `USERNAME_MAX_LEN`: default 30
    /// - `SESSION_TTL_HOURS`: default 24
    /// - `SEED_SAMPLE_DATA`: default false
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is absent or a numeric var fails
    /// to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;
        let port = env_parse("PORT", DEFAULT_PORT)?;
        let username_max_len = env_parse("USERNAME_MAX_LEN", USERNAME_MAX_LEN)?;
        let session_ttl_hours = env_parse("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        let seed_sample_data = env_bool("SEED_SAMPLE_DATA").unwrap_or(false);

        Ok(Self { port, database_url, username_max_len, session_ttl_hours, seed_sample_data })
    }
}

fn env_parse<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        Err(_) => Ok(default),
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
