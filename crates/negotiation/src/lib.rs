//! Negotiation Channel for WasteX
//!
//! This crate implements structured bilateral messaging between a buyer
//! and a seller ahead of a contract.
//!
//! # Features
//!
//! - Fixed-role participants assigned from the originating entity
//! - Append-only ordered message log with typed messages
//! - Advisory current offer (never authoritative for contract terms)
//! - Per-participant read tracking
//!
//! # Feature Flags
//!
//! - `api` - Enable the HTTP API

pub mod error;
pub mod service;
pub mod store;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

// Re-export commonly used types
pub use error::{NegotiationError, Result};
pub use service::NegotiationService;
pub use store::memory::InMemoryNegotiationStore;
pub use store::traits::NegotiationStore;
pub use types::{
    Message, MessageType, Negotiation, NegotiationOrigin, NegotiationStatus, OfferPayload,
};
