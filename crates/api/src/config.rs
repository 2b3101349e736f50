//! Runtime configuration, read from the environment at startup.

use std::net::SocketAddr;

use anyhow::Context;

pub const BIND_ADDR_VAR: &str = "STOCKROOM_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "STOCKROOM_DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "STOCKROOM_DB_MAX_CONNECTIONS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_DATABASE_URL: &str = "sqlite://inventory.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub max_connections: u32,
}

impl ApiConfig {
    /// Load from `STOCKROOM_*` environment variables, falling back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| {
            tracing::info!("{BIND_ADDR_VAR} not set; using {DEFAULT_BIND_ADDR}");
            DEFAULT_BIND_ADDR.to_string()
        });
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .with_context(|| format!("{BIND_ADDR_VAR} must be a socket address, got {bind_addr:?}"))?;

        let database_url = lookup(DATABASE_URL_VAR).unwrap_or_else(|| {
            tracing::info!("{DATABASE_URL_VAR} not set; using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });

        let max_connections = match lookup(MAX_CONNECTIONS_VAR) {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("{MAX_CONNECTIONS_VAR} must be a positive integer, got {raw:?}"))?,
            None => {
                tracing::info!("{MAX_CONNECTIONS_VAR} not set; using {DEFAULT_MAX_CONNECTIONS}");
                DEFAULT_MAX_CONNECTIONS
            }
        };

        Ok(Self {
            bind_addr,
            database_url,
            max_connections,
        })
    }

    /// Configuration for a throwaway in-memory database on an ephemeral port.
    pub fn in_memory() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}
