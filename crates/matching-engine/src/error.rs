//! Matching engine error types

use thiserror::Error;

/// Errors that can occur in the Matching Engine
#[derive(Error, Debug)]
pub enum MatchingError {
    /// Invalid listing or request data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller does not own the entity
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Listing or request not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for matching operations
pub type Result<T> = std::result::Result<T, MatchingError>;
