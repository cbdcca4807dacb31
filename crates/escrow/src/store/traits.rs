//! PaymentStore trait definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::{ContractId, PaymentId};

use crate::error::Result;
use crate::types::Payment;

/// PaymentStore trait - defines the interface for payment storage
///
/// This trait allows different storage implementations (in-memory,
/// PostgreSQL, etc.) to be swapped without changing the business logic.
/// `create` is the concurrency-sensitive operation: at most one live
/// payment may exist per contract, checked atomically.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Create a new payment.
    ///
    /// Fails with a conflict if the contract already has a payment that
    /// blocks a new order (anything but a failed one). The check and the
    /// insert are atomic.
    async fn create(&self, payment: Payment) -> Result<Payment>;

    /// Get a payment by ID
    async fn get(&self, payment_id: PaymentId) -> Result<Option<Payment>>;

    /// Get the live (non-failed) payment for a contract, if any
    async fn get_live_by_contract(&self, contract_id: ContractId) -> Result<Option<Payment>>;

    /// Update an existing payment
    async fn update(&self, payment: &Payment) -> Result<()>;

    /// Payments held in escrow whose auto-release date has passed
    async fn due_for_release(&self, now: DateTime<Utc>) -> Result<Vec<Payment>>;
}
