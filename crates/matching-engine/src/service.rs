//! Matching service - business logic over the store and engine

use std::sync::Arc;

use chrono::Utc;

use common::{Actor, ListingId, RequestId};

use crate::domain::{Frequency, MaterialRequest, Urgency, WasteListing};
use crate::engine::MatchingEngine;
use crate::error::{MatchingError, Result};
use crate::store::traits::MatchingStore;

/// Matching service - owns listing/request persistence and recomputation
pub struct MatchingService {
    store: Arc<dyn MatchingStore>,
    engine: MatchingEngine,
}

impl MatchingService {
    /// Create a new matching service
    pub fn new(store: Arc<dyn MatchingStore>, engine: MatchingEngine) -> Self {
        Self { store, engine }
    }

    /// Create a new waste listing
    #[allow(clippy::too_many_arguments)]
    pub async fn create_listing(
        &self,
        actor: Actor,
        category: String,
        quantity_kg: f64,
        price: f64,
        city: String,
        urgency: Urgency,
        frequency: Frequency,
    ) -> Result<WasteListing> {
        if category.trim().is_empty() {
            return Err(MatchingError::Validation(
                "Category is required".to_string(),
            ));
        }
        if quantity_kg <= 0.0 {
            return Err(MatchingError::Validation(
                "Quantity must be greater than 0".to_string(),
            ));
        }
        if price < 0.0 {
            return Err(MatchingError::Validation(
                "Price must not be negative".to_string(),
            ));
        }

        let listing = WasteListing::new(
            actor.user_id,
            category,
            quantity_kg,
            price,
            city,
            urgency,
            frequency,
        );

        tracing::info!(listing_id = %listing.listing_id, seller = %actor.user_id, "Creating listing");
        self.store.create_listing(listing).await
    }

    /// Create a new material request
    #[allow(clippy::too_many_arguments)]
    pub async fn create_request(
        &self,
        actor: Actor,
        category: String,
        quantity_kg: f64,
        budget: f64,
        preferred_cities: Vec<String>,
        urgency: Urgency,
        frequency: Frequency,
    ) -> Result<MaterialRequest> {
        if category.trim().is_empty() {
            return Err(MatchingError::Validation(
                "Category is required".to_string(),
            ));
        }
        if quantity_kg <= 0.0 {
            return Err(MatchingError::Validation(
                "Quantity must be greater than 0".to_string(),
            ));
        }
        if budget <= 0.0 {
            return Err(MatchingError::Validation(
                "Budget must be greater than 0".to_string(),
            ));
        }

        let request = MaterialRequest::new(
            actor.user_id,
            category,
            quantity_kg,
            budget,
            preferred_cities,
            urgency,
            frequency,
        );

        tracing::info!(request_id = %request.request_id, buyer = %actor.user_id, "Creating request");
        self.store.create_request(request).await
    }

    /// Recompute a request's match list against the active listing pool.
    ///
    /// The previous cached list is fully replaced, never merged.
    pub async fn recompute_matches(&self, request_id: RequestId) -> Result<MaterialRequest> {
        let request = self
            .store
            .get_request(request_id)
            .await?
            .ok_or_else(|| MatchingError::NotFound(format!("request {}", request_id)))?;

        let pool = self.store.active_listings().await?;
        let candidates = self.engine.matches(&request, &pool);

        tracing::info!(
            request_id = %request_id,
            candidates = candidates.len(),
            "Recomputed matches"
        );

        self.store
            .replace_matches(request_id, candidates, Utc::now())
            .await
    }

    /// Get a request by ID
    pub async fn get_request(&self, request_id: RequestId) -> Result<Option<MaterialRequest>> {
        self.store.get_request(request_id).await
    }

    /// Get a listing by ID
    pub async fn get_listing(&self, listing_id: ListingId) -> Result<Option<WasteListing>> {
        self.store.get_listing(listing_id).await
    }

    /// Withdraw a listing from matching
    pub async fn deactivate_listing(&self, actor: Actor, listing_id: ListingId) -> Result<()> {
        let listing = self
            .store
            .get_listing(listing_id)
            .await?
            .ok_or_else(|| MatchingError::NotFound(format!("listing {}", listing_id)))?;

        if listing.seller_id != actor.user_id && !actor.admin {
            return Err(MatchingError::Unauthorized(
                "only the listing's seller may deactivate it".to_string(),
            ));
        }

        self.store.set_listing_active(listing_id, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScoringConfig;
    use crate::store::memory::InMemoryMatchingStore;
    use common::UserId;

    fn service() -> MatchingService {
        MatchingService::new(
            Arc::new(InMemoryMatchingStore::new()),
            MatchingEngine::new(ScoringConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_recompute_replaces_matches() {
        let svc = service();
        let buyer = Actor::user(UserId::new());
        let seller = Actor::user(UserId::new());

        let request = svc
            .create_request(
                buyer,
                "Plastic Materials".to_string(),
                1000.0,
                50_000.0,
                vec!["Mumbai".to_string()],
                Urgency::High,
                Frequency::Monthly,
            )
            .await
            .unwrap();

        // No listings: recompute yields an empty list
        let updated = svc.recompute_matches(request.request_id).await.unwrap();
        assert!(updated.matches.is_empty());
        assert!(updated.matches_computed_at.is_some());

        let listing = svc
            .create_listing(
                seller,
                "Plastic Waste".to_string(),
                1200.0,
                45_000.0,
                "Mumbai".to_string(),
                Urgency::High,
                Frequency::Monthly,
            )
            .await
            .unwrap();

        let updated = svc.recompute_matches(request.request_id).await.unwrap();
        assert_eq!(updated.matches.len(), 1);
        assert_eq!(updated.matches[0].listing_id, listing.listing_id);
        assert!((updated.matches[0].score - 82.0).abs() < 1e-9);

        // Deactivate the listing: the next recompute drops it entirely
        svc.deactivate_listing(seller, listing.listing_id)
            .await
            .unwrap();
        let updated = svc.recompute_matches(request.request_id).await.unwrap();
        assert!(updated.matches.is_empty());
    }

    #[tokio::test]
    async fn test_create_request_validation() {
        let svc = service();
        let buyer = Actor::user(UserId::new());

        let result = svc
            .create_request(
                buyer,
                "Plastic".to_string(),
                0.0,
                50_000.0,
                vec![],
                Urgency::Low,
                Frequency::OneTime,
            )
            .await;
        assert!(matches!(result, Err(MatchingError::Validation(_))));

        let result = svc
            .create_request(
                buyer,
                "  ".to_string(),
                100.0,
                50_000.0,
                vec![],
                Urgency::Low,
                Frequency::OneTime,
            )
            .await;
        assert!(matches!(result, Err(MatchingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_deactivate_requires_owner() {
        let svc = service();
        let seller = Actor::user(UserId::new());
        let stranger = Actor::user(UserId::new());

        let listing = svc
            .create_listing(
                seller,
                "Plastic Waste".to_string(),
                1200.0,
                45_000.0,
                "Mumbai".to_string(),
                Urgency::High,
                Frequency::Monthly,
            )
            .await
            .unwrap();

        let result = svc.deactivate_listing(stranger, listing.listing_id).await;
        assert!(result.is_err());

        svc.deactivate_listing(seller, listing.listing_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_recompute_unknown_request() {
        let svc = service();
        let result = svc.recompute_matches(RequestId::new()).await;
        assert!(matches!(result, Err(MatchingError::NotFound(_))));
    }
}
