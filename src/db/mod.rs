//! Postgres pool construction for the API server.
//!
//! Migrations under `src/db/migrations` are compiled into the binary and
//! applied before the first request, so a fresh database and an upgraded
//! one go through the same path. Pool sizing is an env knob because the
//! showcase deployment and local development want different limits.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connect to Postgres, size the pool from `DB_MAX_CONNECTIONS`, and bring
/// the schema up to date.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let max_connections = std::env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_MAX_CONNECTIONS);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
