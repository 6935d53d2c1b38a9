//! Error types for the storage layer

use thiserror::Error;

/// Errors that can occur when working with a repository
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The slot-uniqueness constraint (or another unique index) was violated.
    ///
    /// Callers creating or rescheduling appointments translate this into a
    /// booking conflict rather than a generic server error.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The targeted record does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Error with the storage configuration
    #[error("Storage configuration error: {0}")]
    Config(String),

    /// A stored value could not be decoded into its domain type
    #[error("Stored data could not be decoded: {0}")]
    Decode(String),
}
