//! Configuration management for the store.

use std::env;
use std::path::PathBuf;

/// Store configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection URL for the hosted database. Absent means no remote
    /// credentials are configured and the store runs local-only.
    pub database_url: Option<String>,
    /// Directory holding the local snapshot files.
    pub cache_dir: PathBuf,
    /// Maximum remote database connections.
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("PRODIR_DATABASE_URL").ok();

        let cache_dir = env::var("PRODIR_CACHE_DIR")
            .unwrap_or_else(|_| ".prodir-cache".to_string())
            .into();

        let max_connections = env::var("PRODIR_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidMaxConnections)?;

        Ok(Self {
            database_url,
            cache_dir,
            max_connections,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PRODIR_MAX_CONNECTIONS value")]
    InvalidMaxConnections,
}
