//! Error types for smartcrop-core

use thiserror::Error;

/// Result type alias using smartcrop-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in smartcrop-core storage and validation
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The operation needs a signed-in user
    #[error("Sign in to save to history.")]
    AuthRequired,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
