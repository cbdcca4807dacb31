//! In-memory matching store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use common::{ListingId, RequestId, UserId};

use crate::domain::{MaterialRequest, WasteListing};
use crate::error::{MatchingError, Result};
use crate::result::MatchCandidate;
use crate::store::traits::MatchingStore;

/// In-memory matching store for testing and development
#[derive(Default)]
pub struct InMemoryMatchingStore {
    listings: RwLock<HashMap<ListingId, WasteListing>>,
    requests: RwLock<HashMap<RequestId, MaterialRequest>>,
}

impl InMemoryMatchingStore {
    /// Create a new in-memory matching store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchingStore for InMemoryMatchingStore {
    async fn create_listing(&self, listing: WasteListing) -> Result<WasteListing> {
        let mut listings = self.listings.write().unwrap();
        listings.insert(listing.listing_id, listing.clone());
        Ok(listing)
    }

    async fn get_listing(&self, listing_id: ListingId) -> Result<Option<WasteListing>> {
        let listings = self.listings.read().unwrap();
        Ok(listings.get(&listing_id).cloned())
    }

    async fn active_listings(&self) -> Result<Vec<WasteListing>> {
        let listings = self.listings.read().unwrap();
        Ok(listings.values().filter(|l| l.active).cloned().collect())
    }

    async fn set_listing_active(&self, listing_id: ListingId, active: bool) -> Result<()> {
        let mut listings = self.listings.write().unwrap();
        match listings.get_mut(&listing_id) {
            Some(listing) => {
                listing.active = active;
                Ok(())
            }
            None => Err(MatchingError::NotFound(format!(
                "listing {}",
                listing_id
            ))),
        }
    }

    async fn create_request(&self, request: MaterialRequest) -> Result<MaterialRequest> {
        let mut requests = self.requests.write().unwrap();
        requests.insert(request.request_id, request.clone());
        Ok(request)
    }

    async fn get_request(&self, request_id: RequestId) -> Result<Option<MaterialRequest>> {
        let requests = self.requests.read().unwrap();
        Ok(requests.get(&request_id).cloned())
    }

    async fn replace_matches(
        &self,
        request_id: RequestId,
        matches: Vec<MatchCandidate>,
        computed_at: DateTime<Utc>,
    ) -> Result<MaterialRequest> {
        let mut requests = self.requests.write().unwrap();
        match requests.get_mut(&request_id) {
            Some(request) => {
                request.matches = matches;
                request.matches_computed_at = Some(computed_at);
                Ok(request.clone())
            }
            None => Err(MatchingError::NotFound(format!(
                "request {}",
                request_id
            ))),
        }
    }

    async fn requests_for_buyer(&self, buyer_id: UserId) -> Result<Vec<MaterialRequest>> {
        let requests = self.requests.read().unwrap();
        let mut result: Vec<MaterialRequest> = requests
            .values()
            .filter(|r| r.buyer_id == buyer_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, Urgency};

    fn test_listing() -> WasteListing {
        WasteListing::new(
            UserId::new(),
            "Plastic Waste",
            1200.0,
            45_000.0,
            "Mumbai",
            Urgency::High,
            Frequency::Monthly,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_listing() {
        let store = InMemoryMatchingStore::new();
        let listing = test_listing();
        let id = listing.listing_id;

        store.create_listing(listing).await.unwrap();
        assert!(store.get_listing(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deactivated_listing_leaves_pool() {
        let store = InMemoryMatchingStore::new();
        let listing = test_listing();
        let id = listing.listing_id;
        store.create_listing(listing).await.unwrap();

        assert_eq!(store.active_listings().await.unwrap().len(), 1);
        store.set_listing_active(id, false).await.unwrap();
        assert!(store.active_listings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_matches_discards_previous() {
        let store = InMemoryMatchingStore::new();
        let request = MaterialRequest::new(
            UserId::new(),
            "Plastic Materials",
            1000.0,
            50_000.0,
            vec![],
            Urgency::High,
            Frequency::Monthly,
        );
        let id = request.request_id;
        store.create_request(request).await.unwrap();

        let listing = test_listing();
        let candidate = MatchCandidate::from_listing(&listing, 82.0, vec![]);
        let updated = store
            .replace_matches(id, vec![candidate.clone(), candidate], Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.matches.len(), 2);

        let updated = store.replace_matches(id, vec![], Utc::now()).await.unwrap();
        assert!(updated.matches.is_empty());
        assert!(updated.matches_computed_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_request_rejected() {
        let store = InMemoryMatchingStore::new();
        let result = store.replace_matches(RequestId::new(), vec![], Utc::now()).await;
        assert!(matches!(result, Err(MatchingError::NotFound(_))));
    }
}
