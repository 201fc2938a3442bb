//! Unified error handling for the store.

use thiserror::Error;

/// Application error type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("engine error: {0}")]
    Engine(#[from] prodir_engine::Error),

    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("remote store is not available")]
    RemoteUnavailable,
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
