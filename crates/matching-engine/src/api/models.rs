//! API models for matching HTTP endpoints

use serde::{Deserialize, Serialize};

use common::UserId;

use crate::domain::{Frequency, MaterialRequest, Urgency, WasteListing};
use crate::result::MatchCandidate;

/// Request to create a new listing
///
/// Authentication is an external concern; callers supply the resolved
/// seller id.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateListingRequest {
    pub seller_id: UserId,
    pub category: String,
    pub quantity_kg: f64,
    pub price: f64,
    pub city: String,
    pub urgency: Urgency,
    pub frequency: Frequency,
}

/// Request to create a new material request
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRequestRequest {
    pub buyer_id: UserId,
    pub category: String,
    pub quantity_kg: f64,
    pub budget: f64,
    #[serde(default)]
    pub preferred_cities: Vec<String>,
    pub urgency: Urgency,
    pub frequency: Frequency,
}

/// Listing in API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
    pub success: bool,
    pub listing: WasteListing,
}

/// Material request (with cached matches) in API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestResponse {
    pub success: bool,
    pub request: MaterialRequest,
}

/// Match recomputation result
#[derive(Debug, Serialize, Deserialize)]
pub struct RecomputeResponse {
    pub success: bool,
    pub match_count: usize,
    pub matches: Vec<MatchCandidate>,
}

/// Error payload shared by all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}
