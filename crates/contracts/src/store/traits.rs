//! ContractStore trait definition

use async_trait::async_trait;

use common::{ContractId, PartyRole, UserId};

use crate::error::Result;
use crate::types::{Contract, SignatureRecord};

/// ContractStore trait - defines the interface for contract storage
///
/// This trait allows different storage implementations (in-memory,
/// PostgreSQL, etc.) to be swapped without changing the business logic.
/// The sequence and signature operations are the concurrency-sensitive
/// ones; implementations must make them atomic.
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Create a new contract
    async fn create(&self, contract: Contract) -> Result<Contract>;

    /// Get a contract by ID
    async fn get(&self, contract_id: ContractId) -> Result<Option<Contract>>;

    /// Update an existing contract
    async fn update(&self, contract: &Contract) -> Result<()>;

    /// Allocate the next contract-number sequence for a company pair.
    ///
    /// Starts at 1001 per exact (seller, buyer) pair and must be atomic:
    /// two simultaneous allocations never return the same value.
    async fn next_sequence(&self, seller_code: &str, buyer_code: &str) -> Result<u32>;

    /// Record a signature for a role, exactly once.
    ///
    /// The update is conditional: if the role already has a signature the
    /// call fails with a conflict and nothing changes.
    async fn record_signature(
        &self,
        contract_id: ContractId,
        role: PartyRole,
        record: SignatureRecord,
    ) -> Result<Contract>;

    /// List contracts a user is party to, most recent first
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Contract>>;
}
