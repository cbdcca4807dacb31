//! Escrow error types

use thiserror::Error;

/// Errors that can occur in the Escrow Payment State Machine
#[derive(Error, Debug)]
pub enum EscrowError {
    /// Invalid input; rejected with zero side effects
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller is not allowed to perform the operation
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Payment or contract not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A live payment already exists for the contract
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Gateway signature did not match; the payment was marked failed
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Payment gateway call failed; nothing was persisted
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// Operation invalid for the current payment status
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A contract transition driven by this payment failed
    #[error("Contract error: {0}")]
    Contract(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for escrow operations
pub type Result<T> = std::result::Result<T, EscrowError>;
