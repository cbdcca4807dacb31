//! Match result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::{ListingId, UserId};

use crate::domain::WasteListing;

/// A scored candidate listing for a material request
///
/// Carries enough of the listing to render a result without another
/// lookup, the 0-100 score, and the human-readable reasons behind it.
/// The reasons are informative, not exhaustive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// The matched listing
    pub listing_id: ListingId,
    /// Seller behind the listing
    pub seller_id: UserId,
    /// Listing category as entered
    pub category: String,
    /// Listed quantity in kilograms
    pub quantity_kg: f64,
    /// Listing price
    pub price: f64,
    /// Listing city
    pub city: String,
    /// Match score in [0, 100]
    pub score: f64,
    /// Human-readable match reasons
    pub reasons: Vec<String>,
    /// When this candidate was scored
    pub scored_at: DateTime<Utc>,
}

impl MatchCandidate {
    /// Build a candidate from a listing plus its computed score and reasons
    pub fn from_listing(listing: &WasteListing, score: f64, reasons: Vec<String>) -> Self {
        Self {
            listing_id: listing.listing_id,
            seller_id: listing.seller_id,
            category: listing.category.clone(),
            quantity_kg: listing.quantity_kg,
            price: listing.price,
            city: listing.city.clone(),
            score,
            reasons,
            scored_at: Utc::now(),
        }
    }
}
