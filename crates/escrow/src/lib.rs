//! Escrow Payment State Machine for WasteX
//!
//! This crate holds buyer funds against a signed contract and releases
//! them to the seller on confirmation or timeout.
//!
//! # Features
//!
//! - Tiered platform fee, frozen at order creation
//! - Keyed-hash verification of gateway payment callbacks
//! - Conditional release (delivery + quality) with shipment override
//! - Idempotent release and an explicit auto-release sweep
//! - Payment-driven contract transitions (executed, completed)
//!
//! # Feature Flags
//!
//! - `postgres` - Enable PostgreSQL storage
//! - `client` - Enable the HTTP payment gateway client
//! - `api` - Enable the HTTP API

pub mod clients;
pub mod error;
pub mod fee;
pub mod manager;
pub mod signature;
pub mod store;
pub mod sweep;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

// Re-export commonly used types
pub use clients::gateway::{MockPaymentGatewayClient, PaymentGatewayClient};
pub use clients::shipment::{MockShipmentClient, ShipmentClient, ShipmentStatus};
pub use error::{EscrowError, Result};
pub use fee::{default_fee_tiers, platform_fee, split_amount, FeeTier};
pub use manager::{EscrowManager, EscrowSettings};
pub use store::memory::InMemoryPaymentStore;
pub use store::traits::PaymentStore;
pub use sweep::EscrowSweeper;
pub use types::{
    EscrowRecord, GatewayOrder, Payment, PaymentAmount, PaymentStatus, ReleaseConditions,
    TimelineEntry,
};

#[cfg(feature = "postgres")]
pub use store::postgres::PostgresPaymentStore;

#[cfg(feature = "client")]
pub use clients::gateway::http::HttpPaymentGatewayClient;
