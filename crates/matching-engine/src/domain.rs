//! Domain types for the Matching Engine
//!
//! This module defines the listing and request types the engine scores,
//! along with the category normalization shared by both sides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::{ListingId, RequestId, UserId};

use crate::result::MatchCandidate;

// ============================================================================
// Urgency
// ============================================================================

/// How quickly the material needs to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Low => write!(f, "low"),
            Urgency::Medium => write!(f, "medium"),
            Urgency::High => write!(f, "high"),
        }
    }
}

// ============================================================================
// Frequency
// ============================================================================

/// Supply/demand cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    OneTime,
    Weekly,
    Monthly,
    Quarterly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::OneTime => write!(f, "one_time"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Quarterly => write!(f, "quarterly"),
        }
    }
}

// ============================================================================
// Category normalization
// ============================================================================

/// Normalize a raw category string to its canonical group.
///
/// Listings and requests come in with free-text categories ("Plastic
/// Materials", "Plastic Waste"); both normalize to the same group so they
/// can match. Unknown categories fall back to their lowercased trimmed
/// form, so two parties using the same novel category still match.
pub fn category_group(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase();

    match normalized.as_str() {
        "plastic" | "plastics" | "plastic waste" | "plastic materials" | "plastic scrap" => {
            "plastic".to_string()
        }
        "metal" | "metals" | "metal scrap" | "scrap metal" | "metal waste" => "metal".to_string(),
        "paper" | "paper waste" | "paper materials" | "cardboard" => "paper".to_string(),
        "chemical" | "chemicals" | "chemical waste" | "solvents" => "chemical".to_string(),
        "textile" | "textiles" | "textile waste" | "fabric scrap" => "textile".to_string(),
        "rubber" | "rubber waste" | "tyre scrap" | "tire scrap" => "rubber".to_string(),
        "glass" | "glass waste" | "cullet" => "glass".to_string(),
        "e-waste" | "ewaste" | "electronic waste" => "e-waste".to_string(),
        "organic" | "organic waste" | "biomass" => "organic".to_string(),
        _ => normalized,
    }
}

// ============================================================================
// Waste Listing
// ============================================================================

/// A seller-side listing of available waste material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteListing {
    /// Unique listing identifier
    pub listing_id: ListingId,
    /// Seller offering the material
    pub seller_id: UserId,
    /// Raw category as entered by the seller
    pub category: String,
    /// Available quantity in kilograms
    pub quantity_kg: f64,
    /// Asking price for the listed quantity
    pub price: f64,
    /// City the material ships from
    pub city: String,
    /// How quickly the seller wants it gone
    pub urgency: Urgency,
    /// Supply cadence
    pub frequency: Frequency,
    /// Whether the listing participates in matching
    pub active: bool,
    /// Listing creation timestamp
    pub created_at: DateTime<Utc>,
}

impl WasteListing {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seller_id: UserId,
        category: impl Into<String>,
        quantity_kg: f64,
        price: f64,
        city: impl Into<String>,
        urgency: Urgency,
        frequency: Frequency,
    ) -> Self {
        Self {
            listing_id: ListingId::new(),
            seller_id,
            category: category.into(),
            quantity_kg,
            price,
            city: city.into(),
            urgency,
            frequency,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Canonical category group for matching
    pub fn category_group(&self) -> String {
        category_group(&self.category)
    }
}

// ============================================================================
// Material Request
// ============================================================================

/// A buyer-side request for waste material
///
/// The `matches` list is derived data: recomputation replaces it wholesale,
/// and nothing downstream (negotiation, contracts) reads it as
/// authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRequest {
    /// Unique request identifier
    pub request_id: RequestId,
    /// Buyer behind the request
    pub buyer_id: UserId,
    /// Raw category as entered by the buyer
    pub category: String,
    /// Requested quantity in kilograms
    pub quantity_kg: f64,
    /// Budget for the requested quantity
    pub budget: f64,
    /// Preferred source cities; empty means no preference
    #[serde(default)]
    pub preferred_cities: Vec<String>,
    /// How quickly the material is needed
    pub urgency: Urgency,
    /// Demand cadence
    pub frequency: Frequency,
    /// Cached match candidates, replaced on every recomputation
    #[serde(default)]
    pub matches: Vec<MatchCandidate>,
    /// When the cached matches were last computed
    pub matches_computed_at: Option<DateTime<Utc>>,
    /// Request creation timestamp
    pub created_at: DateTime<Utc>,
}

impl MaterialRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        buyer_id: UserId,
        category: impl Into<String>,
        quantity_kg: f64,
        budget: f64,
        preferred_cities: Vec<String>,
        urgency: Urgency,
        frequency: Frequency,
    ) -> Self {
        Self {
            request_id: RequestId::new(),
            buyer_id,
            category: category.into(),
            quantity_kg,
            budget,
            preferred_cities,
            urgency,
            frequency,
            matches: Vec::new(),
            matches_computed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Canonical category group for matching
    pub fn category_group(&self) -> String {
        category_group(&self.category)
    }

    /// Whether a city is in the preferred list (case-insensitive)
    pub fn prefers_city(&self, city: &str) -> bool {
        self.preferred_cities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(city))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_group_synonyms() {
        assert_eq!(category_group("Plastic Materials"), "plastic");
        assert_eq!(category_group("Plastic Waste"), "plastic");
        assert_eq!(category_group("  scrap metal "), "metal");
        assert_eq!(category_group("Cardboard"), "paper");
    }

    #[test]
    fn test_category_group_unknown_falls_back() {
        assert_eq!(category_group("Fly Ash"), "fly ash");
        // Two parties using the same novel category still match
        assert_eq!(category_group("FLY ASH"), category_group("fly ash"));
    }

    #[test]
    fn test_prefers_city_case_insensitive() {
        let request = MaterialRequest::new(
            UserId::new(),
            "Plastic Materials",
            1000.0,
            50_000.0,
            vec!["Mumbai".to_string(), "Pune".to_string()],
            Urgency::High,
            Frequency::Monthly,
        );

        assert!(request.prefers_city("mumbai"));
        assert!(request.prefers_city("PUNE"));
        assert!(!request.prefers_city("Delhi"));
    }

    #[test]
    fn test_new_request_has_no_matches() {
        let request = MaterialRequest::new(
            UserId::new(),
            "Plastic Materials",
            1000.0,
            50_000.0,
            vec![],
            Urgency::Low,
            Frequency::OneTime,
        );
        assert!(request.matches.is_empty());
        assert!(request.matches_computed_at.is_none());
    }
}
