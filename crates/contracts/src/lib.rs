//! Contract Lifecycle Manager for WasteX
//!
//! This crate builds dual-signed contracts from completed negotiations,
//! coordinated against an external ledger.
//!
//! # Features
//!
//! - Per-company-pair contract numbering with atomic sequence assignment
//! - Ledger deployment as a saga step with an explicit
//!   pending/confirmed/failed sub-state and a retry path
//! - Exactly-once signing per role, confirmed against the ledger's
//!   fully-signed flag before the contract advances
//! - Payment-driven executed/completed transitions
//!
//! # Feature Flags
//!
//! - `postgres` - Enable PostgreSQL storage
//! - `client` - Enable the HTTP ledger client
//! - `api` - Enable the HTTP API

pub mod clients;
pub mod error;
pub mod manager;
pub mod store;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

// Re-export commonly used types
pub use clients::ledger::{LedgerClient, LedgerDeployment, LedgerTx, MockLedgerClient};
pub use error::{ContractError, Result};
pub use manager::ContractManager;
pub use store::memory::InMemoryContractStore;
pub use store::traits::ContractStore;
pub use types::{
    AuditEntry, Contract, ContractParty, ContractStatus, ContractTerms, DeploymentState,
    LedgerRecord, SignaturePayload, SignatureRecord,
};

#[cfg(feature = "postgres")]
pub use store::postgres::PostgresContractStore;

#[cfg(feature = "client")]
pub use clients::ledger::http::HttpLedgerClient;
