//! NegotiationStore trait definition

use async_trait::async_trait;

use common::{NegotiationId, UserId};

use crate::error::Result;
use crate::types::Negotiation;

/// NegotiationStore trait - defines the interface for negotiation storage
///
/// This trait allows different storage implementations (in-memory,
/// PostgreSQL, etc.) to be swapped without changing the business logic.
#[async_trait]
pub trait NegotiationStore: Send + Sync {
    /// Create a new negotiation
    async fn create(&self, negotiation: Negotiation) -> Result<Negotiation>;

    /// Get a negotiation by ID
    async fn get(&self, negotiation_id: NegotiationId) -> Result<Option<Negotiation>>;

    /// Update an existing negotiation
    async fn update(&self, negotiation: &Negotiation) -> Result<()>;

    /// List negotiations a user participates in, most recent activity first
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Negotiation>>;
}
