//! MatchingStore trait definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::{ListingId, RequestId, UserId};

use crate::domain::{MaterialRequest, WasteListing};
use crate::error::Result;
use crate::result::MatchCandidate;

/// MatchingStore trait - defines the interface for listing/request storage
///
/// This trait allows different storage implementations (in-memory,
/// PostgreSQL, etc.) to be swapped without changing the business logic.
#[async_trait]
pub trait MatchingStore: Send + Sync {
    /// Create a new listing
    async fn create_listing(&self, listing: WasteListing) -> Result<WasteListing>;

    /// Get a listing by ID
    async fn get_listing(&self, listing_id: ListingId) -> Result<Option<WasteListing>>;

    /// All listings currently participating in matching
    async fn active_listings(&self) -> Result<Vec<WasteListing>>;

    /// Activate or deactivate a listing
    async fn set_listing_active(&self, listing_id: ListingId, active: bool) -> Result<()>;

    /// Create a new request
    async fn create_request(&self, request: MaterialRequest) -> Result<MaterialRequest>;

    /// Get a request by ID
    async fn get_request(&self, request_id: RequestId) -> Result<Option<MaterialRequest>>;

    /// Replace a request's cached match list wholesale
    ///
    /// The previous list is discarded, never merged.
    async fn replace_matches(
        &self,
        request_id: RequestId,
        matches: Vec<MatchCandidate>,
        computed_at: DateTime<Utc>,
    ) -> Result<MaterialRequest>;

    /// List requests created by a buyer
    async fn requests_for_buyer(&self, buyer_id: UserId) -> Result<Vec<MaterialRequest>>;
}
