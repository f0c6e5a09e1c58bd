//! Common error types for Cxperia

use thiserror::Error;

/// Common result type for Cxperia operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised below the HTTP layer (storage, config, validation)
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested row does not exist, or belongs to another brand
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unique constraint hit (duplicate email, slug, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map a sqlx error to `Conflict` when it is a UNIQUE violation
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Error::Conflict(format!("{} already exists", what));
            }
        }
        Error::Database(err)
    }
}
