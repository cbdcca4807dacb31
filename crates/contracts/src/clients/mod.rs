//! External service clients

pub mod ledger;

pub use ledger::{LedgerClient, MockLedgerClient};
