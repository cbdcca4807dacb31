//! In-memory negotiation store implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use common::{NegotiationId, UserId};

use crate::error::{NegotiationError, Result};
use crate::store::traits::NegotiationStore;
use crate::types::Negotiation;

/// In-memory negotiation store for testing and development
#[derive(Default)]
pub struct InMemoryNegotiationStore {
    negotiations: RwLock<HashMap<NegotiationId, Negotiation>>,
}

impl InMemoryNegotiationStore {
    /// Create a new in-memory negotiation store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NegotiationStore for InMemoryNegotiationStore {
    async fn create(&self, negotiation: Negotiation) -> Result<Negotiation> {
        let mut negotiations = self.negotiations.write().unwrap();
        negotiations.insert(negotiation.negotiation_id, negotiation.clone());
        Ok(negotiation)
    }

    async fn get(&self, negotiation_id: NegotiationId) -> Result<Option<Negotiation>> {
        let negotiations = self.negotiations.read().unwrap();
        Ok(negotiations.get(&negotiation_id).cloned())
    }

    async fn update(&self, negotiation: &Negotiation) -> Result<()> {
        let mut negotiations = self.negotiations.write().unwrap();
        if negotiations.contains_key(&negotiation.negotiation_id) {
            negotiations.insert(negotiation.negotiation_id, negotiation.clone());
            Ok(())
        } else {
            Err(NegotiationError::NotFound(format!(
                "negotiation {}",
                negotiation.negotiation_id
            )))
        }
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Negotiation>> {
        let negotiations = self.negotiations.read().unwrap();
        let mut result: Vec<Negotiation> = negotiations
            .values()
            .filter(|n| n.is_participant(user_id))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NegotiationOrigin;
    use common::ListingId;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryNegotiationStore::new();
        let negotiation = Negotiation::new(
            "PET flakes",
            NegotiationOrigin::Listing(ListingId::new()),
            UserId::new(),
            UserId::new(),
        );
        let id = negotiation.negotiation_id;

        store.create(negotiation).await.unwrap();
        assert!(store.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_unknown_rejected() {
        let store = InMemoryNegotiationStore::new();
        let negotiation = Negotiation::new(
            "PET flakes",
            NegotiationOrigin::Listing(ListingId::new()),
            UserId::new(),
            UserId::new(),
        );
        let result = store.update(&negotiation).await;
        assert!(matches!(result, Err(NegotiationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_for_user_filters_participants() {
        let store = InMemoryNegotiationStore::new();
        let seller = UserId::new();
        let buyer = UserId::new();

        let negotiation = Negotiation::new(
            "PET flakes",
            NegotiationOrigin::Listing(ListingId::new()),
            seller,
            buyer,
        );
        store.create(negotiation).await.unwrap();

        assert_eq!(store.list_for_user(seller).await.unwrap().len(), 1);
        assert_eq!(store.list_for_user(buyer).await.unwrap().len(), 1);
        assert!(store.list_for_user(UserId::new()).await.unwrap().is_empty());
    }
}
