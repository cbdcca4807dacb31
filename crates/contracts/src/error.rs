//! Contract error types

use thiserror::Error;

/// Errors that can occur in the Contract Lifecycle Manager
#[derive(Error, Debug)]
pub enum ContractError {
    /// Invalid terms or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller is not a party to the contract
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Contract, negotiation, or party not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate signature or sequence collision
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Ledger call failed; the record is unchanged and the operation can
    /// be retried
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Operation invalid for the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for contract operations
pub type Result<T> = std::result::Result<T, ContractError>;
