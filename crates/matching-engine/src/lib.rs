//! Matching Engine for WasteX
//!
//! This crate ranks active waste listings against a material request.
//!
//! # Features
//!
//! - Deterministic filter-then-score candidate ranking
//! - Category synonym normalization across listings and requests
//! - Request-side cached match lists, fully replaced on recomputation
//!
//! # Feature Flags
//!
//! - `api` - Enable the HTTP API

pub mod domain;
pub mod engine;
pub mod error;
pub mod result;
pub mod service;
pub mod store;

#[cfg(feature = "api")]
pub mod api;

// Re-export commonly used types
pub use domain::{category_group, Frequency, MaterialRequest, Urgency, WasteListing};
pub use engine::{MatchingEngine, ScoringConfig};
pub use error::{MatchingError, Result};
pub use result::MatchCandidate;
pub use service::MatchingService;
pub use store::memory::InMemoryMatchingStore;
pub use store::traits::MatchingStore;
