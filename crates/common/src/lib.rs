//! Shared types and utilities for WasteX
//!
//! This crate provides the fundamental domain types used throughout the
//! deal lifecycle engine: entity identifiers, party roles, the
//! acting-user type carried by every operation, and the party directory
//! used to resolve counterparties and company codes. Each engine crate
//! defines its own error taxonomy on top of these types.

pub mod directory;
pub mod types;

pub use directory::{InMemoryPartyDirectory, Party, PartyDirectory};
pub use types::{
    Actor, ContractId, ListingId, NegotiationId, PartyRole, PaymentId, RequestId, UserId,
};
