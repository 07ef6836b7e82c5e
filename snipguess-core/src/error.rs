//! Error types for snipguess-core
//!
//! Defines the crate-wide error type using thiserror for clear error
//! propagation. Every failure is recoverable at the game-start boundary;
//! nothing here is fatal to the embedding process.

use thiserror::Error;

/// Main error type for snipguess-core
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP failure talking to the song catalog
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// No album group is enabled in the current filter
    #[error("No album group enabled")]
    EmptyFilter,

    /// Cache exhausted and a refill still yields nothing matching the filter
    #[error("No songs match the current album filter")]
    NoMatchingSong,

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration or stored-settings errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using snipguess-core Error
pub type Result<T> = std::result::Result<T, Error>;
