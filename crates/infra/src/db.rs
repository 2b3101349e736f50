//! Connection pool and schema bootstrap.
//!
//! The schema is created once at startup; every store call afterwards borrows
//! a pooled connection for the duration of its statement and hands it back.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

const CREATE_INVENTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS inventory (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    item         TEXT    NOT NULL UNIQUE,
    quantity     INTEGER NOT NULL,
    notes        TEXT    NOT NULL DEFAULT '',
    last_updated TEXT    NOT NULL
)
"#;

/// Open a pool for `database_url`, creating the database file if needed.
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that is never reaped.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid database url {database_url:?}"))?
        .create_if_missing(true);

    let pool_options = if is_in_memory(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections.max(1))
    };

    pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open SQLite database at {database_url:?}"))
}

/// Create the `inventory` table if it is not there yet. Safe to run repeatedly.
pub async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(CREATE_INVENTORY_TABLE)
        .execute(pool)
        .await
        .context("failed to create inventory table")?;

    tracing::info!("inventory schema ready");
    Ok(())
}

/// [`connect`] followed by [`init_schema`].
pub async fn connect_and_init(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let pool = connect(database_url, max_connections).await?;
    init_schema(&pool).await?;
    Ok(pool)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
