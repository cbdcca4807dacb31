//! Core Matching Engine
//!
//! This module implements the deterministic filter-then-score ranking of
//! active listings against a material request.
//!
//! CRITICAL PROPERTIES:
//! 1. Deterministic (same inputs → same outputs, always)
//! 2. Pure function (no external state, no side effects)
//! 3. Stable ordering (score descending, listing id ascending on ties)

use tracing::debug;

use crate::domain::{MaterialRequest, WasteListing};
use crate::result::MatchCandidate;

/// Score weights and filter thresholds
///
/// The weights sum to 100, so a perfect candidate scores exactly 100.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Maximum number of candidates returned
    pub max_results: usize,
    /// Listings must offer at least this fraction of the requested quantity
    pub min_quantity_ratio: f64,
    /// Listings priced above budget × this ratio are filtered out
    pub max_price_ratio: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            min_quantity_ratio: 0.5,
            max_price_ratio: 1.2,
        }
    }
}

/// Points for a listing in the same category group
const CATEGORY_POINTS: f64 = 40.0;
/// Maximum points for quantity sufficiency
const QUANTITY_POINTS: f64 = 20.0;
/// Maximum points for price headroom under budget
const PRICE_POINTS: f64 = 20.0;
/// Points for a preferred-city hit
const CITY_POINTS: f64 = 10.0;
/// Points for matching urgency
const URGENCY_POINTS: f64 = 5.0;
/// Points for matching frequency
const FREQUENCY_POINTS: f64 = 5.0;

/// The matching engine
///
/// Stateless besides its configuration; every call re-scores from scratch.
pub struct MatchingEngine {
    config: ScoringConfig,
}

impl MatchingEngine {
    /// Create an engine with the given thresholds
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Create an engine with default thresholds
    pub fn with_defaults() -> Self {
        Self::new(ScoringConfig::default())
    }

    /// Rank the listing pool against a request.
    ///
    /// Returns the top candidates sorted by descending score; ties break
    /// by ascending listing id so identical inputs always produce the
    /// same ordering.
    pub fn matches(&self, request: &MaterialRequest, listings: &[WasteListing]) -> Vec<MatchCandidate> {
        let request_group = request.category_group();

        let mut candidates: Vec<MatchCandidate> = listings
            .iter()
            .filter(|listing| self.passes_filter(request, &request_group, listing))
            .map(|listing| self.score(request, listing))
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.listing_id.cmp(&b.listing_id))
        });
        candidates.truncate(self.config.max_results);

        debug!(
            request_id = %request.request_id,
            pool = listings.len(),
            matched = candidates.len(),
            "Matched listings against request"
        );

        candidates
    }

    /// Hard filter applied before scoring
    fn passes_filter(
        &self,
        request: &MaterialRequest,
        request_group: &str,
        listing: &WasteListing,
    ) -> bool {
        if !listing.active {
            return false;
        }

        if listing.category_group() != request_group {
            return false;
        }

        if listing.quantity_kg < request.quantity_kg * self.config.min_quantity_ratio {
            return false;
        }

        if listing.price > request.budget * self.config.max_price_ratio {
            return false;
        }

        if !request.preferred_cities.is_empty() && !request.prefers_city(&listing.city) {
            return false;
        }

        true
    }

    /// Additive 0-100 score for a listing that passed the filter
    fn score(&self, request: &MaterialRequest, listing: &WasteListing) -> MatchCandidate {
        let mut score = 0.0;
        let mut reasons = Vec::new();

        // Category group (always matched post-filter)
        score += CATEGORY_POINTS;
        reasons.push(format!(
            "Category '{}' matches requested '{}'",
            listing.category, request.category
        ));

        // Quantity sufficiency, capped at full coverage
        let quantity_ratio = (listing.quantity_kg / request.quantity_kg).min(1.0);
        score += quantity_ratio * QUANTITY_POINTS;
        reasons.push(format!(
            "Covers {:.0}% of the requested quantity",
            quantity_ratio * 100.0
        ));

        // Price headroom, only under budget
        if listing.price <= request.budget {
            let headroom = (request.budget - listing.price) / request.budget;
            score += headroom * PRICE_POINTS;
            reasons.push(format!(
                "Priced {:.0} under the budget of {:.0}",
                request.budget - listing.price,
                request.budget
            ));
        }

        // Preferred city
        if request.prefers_city(&listing.city) {
            score += CITY_POINTS;
            reasons.push(format!("Located in preferred city {}", listing.city));
        }

        // Urgency alignment
        if listing.urgency == request.urgency {
            score += URGENCY_POINTS;
            reasons.push("Urgency aligned".to_string());
        }

        // Frequency alignment
        if listing.frequency == request.frequency {
            score += FREQUENCY_POINTS;
            reasons.push("Supply frequency aligned".to_string());
        }

        MatchCandidate::from_listing(listing, score, reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, Urgency};
    use common::UserId;

    fn base_request() -> MaterialRequest {
        MaterialRequest::new(
            UserId::new(),
            "Plastic Materials",
            1000.0,
            50_000.0,
            vec!["Mumbai".to_string()],
            Urgency::High,
            Frequency::Monthly,
        )
    }

    fn base_listing() -> WasteListing {
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

    #[test]
    fn test_worked_example_scores_82() {
        // 40 (category) + 20 (quantity capped) + 2 (price headroom)
        // + 10 (city) + 5 (urgency) + 5 (frequency) = 82
        let engine = MatchingEngine::with_defaults();
        let request = base_request();
        let listing = base_listing();

        let results = engine.matches(&request, &[listing]);
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 82.0).abs() < 1e-9);
        assert!(results[0].reasons.len() >= 5);
    }

    #[test]
    fn test_score_bounds() {
        let engine = MatchingEngine::with_defaults();
        let request = base_request();

        // Perfect candidate: free material, everything aligned
        let mut perfect = base_listing();
        perfect.price = 0.0;
        let results = engine.matches(&request, &[perfect]);
        assert!((results[0].score - 100.0).abs() < 1e-9);

        // Weak but surviving candidate stays non-negative
        let mut weak = base_listing();
        weak.quantity_kg = 500.0; // exactly the 50% floor
        weak.price = 60_000.0; // exactly the 120% ceiling, over budget
        weak.city = "Mumbai".to_string();
        weak.urgency = Urgency::Low;
        weak.frequency = Frequency::Weekly;
        let results = engine.matches(&request, &[weak]);
        assert_eq!(results.len(), 1);
        assert!(results[0].score >= 0.0 && results[0].score <= 100.0);
        // 40 + 10 (quantity half) + 0 (over budget) + 10 (city) = 60
        assert!((results[0].score - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_monotone_in_quantity_and_price() {
        let engine = MatchingEngine::with_defaults();
        let request = base_request();

        let mut less_quantity = base_listing();
        less_quantity.quantity_kg = 600.0;
        let mut more_quantity = base_listing();
        more_quantity.quantity_kg = 900.0;

        let low = engine.matches(&request, &[less_quantity])[0].score;
        let high = engine.matches(&request, &[more_quantity])[0].score;
        assert!(high > low);

        let mut expensive = base_listing();
        expensive.price = 49_000.0;
        let mut cheap = base_listing();
        cheap.price = 30_000.0;

        let low = engine.matches(&request, &[expensive])[0].score;
        let high = engine.matches(&request, &[cheap])[0].score;
        assert!(high > low);
    }

    #[test]
    fn test_filter_category_group() {
        let engine = MatchingEngine::with_defaults();
        let request = base_request();

        let mut metal = base_listing();
        metal.category = "Scrap Metal".to_string();

        assert!(engine.matches(&request, &[metal]).is_empty());
    }

    #[test]
    fn test_filter_quantity_floor() {
        let engine = MatchingEngine::with_defaults();
        let request = base_request();

        let mut too_small = base_listing();
        too_small.quantity_kg = 499.0;
        assert!(engine.matches(&request, &[too_small]).is_empty());

        let mut at_floor = base_listing();
        at_floor.quantity_kg = 500.0;
        assert_eq!(engine.matches(&request, &[at_floor]).len(), 1);
    }

    #[test]
    fn test_filter_price_ceiling() {
        let engine = MatchingEngine::with_defaults();
        let request = base_request();

        let mut too_expensive = base_listing();
        too_expensive.price = 60_001.0;
        assert!(engine.matches(&request, &[too_expensive]).is_empty());

        let mut at_ceiling = base_listing();
        at_ceiling.price = 60_000.0;
        assert_eq!(engine.matches(&request, &[at_ceiling]).len(), 1);
    }

    #[test]
    fn test_filter_preferred_cities() {
        let engine = MatchingEngine::with_defaults();
        let request = base_request();

        let mut elsewhere = base_listing();
        elsewhere.city = "Delhi".to_string();
        assert!(engine.matches(&request, &[elsewhere]).is_empty());

        // No preference set: any city passes
        let mut no_preference = base_request();
        no_preference.preferred_cities.clear();
        let mut listing = base_listing();
        listing.city = "Delhi".to_string();
        let results = engine.matches(&no_preference, &[listing]);
        assert_eq!(results.len(), 1);
        // No city points without a preference hit
        assert!((results[0].score - 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_inactive_listings_excluded() {
        let engine = MatchingEngine::with_defaults();
        let request = base_request();

        let mut inactive = base_listing();
        inactive.active = false;
        assert!(engine.matches(&request, &[inactive]).is_empty());
    }

    #[test]
    fn test_top_ten_cap_and_ordering() {
        let engine = MatchingEngine::with_defaults();
        let request = base_request();

        // 15 candidates with strictly increasing price = decreasing score
        let listings: Vec<WasteListing> = (0..15)
            .map(|i| {
                let mut l = base_listing();
                l.price = 30_000.0 + (i as f64) * 1_000.0;
                l
            })
            .collect();

        let results = engine.matches(&request, &listings);
        assert_eq!(results.len(), 10);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_tie_break_by_listing_id() {
        let engine = MatchingEngine::with_defaults();
        let request = base_request();

        // Identical listings → identical scores; order must be id-ascending
        let a = base_listing();
        let b = base_listing();
        let expected_first = a.listing_id.min(b.listing_id);

        let results = engine.matches(&request, &[a, b]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].listing_id, expected_first);
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let engine = MatchingEngine::with_defaults();
        let request = base_request();
        let listings = vec![base_listing(), base_listing(), base_listing()];

        let first = engine.matches(&request, &listings);
        let second = engine.matches(&request, &listings);

        let ids1: Vec<_> = first.iter().map(|c| c.listing_id).collect();
        let ids2: Vec<_> = second.iter().map(|c| c.listing_id).collect();
        assert_eq!(ids1, ids2);

        let scores1: Vec<_> = first.iter().map(|c| c.score).collect();
        let scores2: Vec<_> = second.iter().map(|c| c.score).collect();
        assert_eq!(scores1, scores2);
    }
}
