//! Negotiation error types

use thiserror::Error;

/// Errors that can occur in the Negotiation Channel
#[derive(Error, Debug)]
pub enum NegotiationError {
    /// Invalid input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller is not a participant
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Negotiation or counterparty not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation invalid for the current status
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for negotiation operations
pub type Result<T> = std::result::Result<T, NegotiationError>;
