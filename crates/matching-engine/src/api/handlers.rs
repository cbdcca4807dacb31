//! API handlers for matching HTTP endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use common::Actor;

use crate::api::models::*;
use crate::error::MatchingError;
use crate::service::MatchingService;

pub struct MatchingApiState {
    pub service: Arc<MatchingService>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn map_error(e: MatchingError) -> ApiError {
    let (status, code) = match &e {
        MatchingError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        MatchingError::Unauthorized(_) => (StatusCode::FORBIDDEN, "NOT_AUTHORIZED"),
        MatchingError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        MatchingError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (status, Json(ErrorResponse::new(code, e.to_string())))
}

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "INVALID_ID",
                format!("Invalid {} id format", what),
            )),
        )
    })
}

/// Create listing handler
pub async fn create_listing(
    State(state): State<Arc<MatchingApiState>>,
    Json(req): Json<CreateListingRequest>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing = state
        .service
        .create_listing(
            Actor::user(req.seller_id),
            req.category,
            req.quantity_kg,
            req.price,
            req.city,
            req.urgency,
            req.frequency,
        )
        .await
        .map_err(map_error)?;

    Ok(Json(ListingResponse {
        success: true,
        listing,
    }))
}

/// Get listing handler
pub async fn get_listing(
    State(state): State<Arc<MatchingApiState>>,
    Path(listing_id): Path<String>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing_id = parse_id(&listing_id, "listing")?;

    match state.service.get_listing(listing_id).await.map_err(map_error)? {
        Some(listing) => Ok(Json(ListingResponse {
            success: true,
            listing,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "NOT_FOUND",
                format!("Listing {} not found", listing_id),
            )),
        )),
    }
}

/// Create material request handler
pub async fn create_request(
    State(state): State<Arc<MatchingApiState>>,
    Json(req): Json<CreateRequestRequest>,
) -> Result<Json<RequestResponse>, ApiError> {
    let request = state
        .service
        .create_request(
            Actor::user(req.buyer_id),
            req.category,
            req.quantity_kg,
            req.budget,
            req.preferred_cities,
            req.urgency,
            req.frequency,
        )
        .await
        .map_err(map_error)?;

    Ok(Json(RequestResponse {
        success: true,
        request,
    }))
}

/// Get material request handler
pub async fn get_request(
    State(state): State<Arc<MatchingApiState>>,
    Path(request_id): Path<String>,
) -> Result<Json<RequestResponse>, ApiError> {
    let request_id = parse_id(&request_id, "request")?;

    match state.service.get_request(request_id).await.map_err(map_error)? {
        Some(request) => Ok(Json(RequestResponse {
            success: true,
            request,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "NOT_FOUND",
                format!("Request {} not found", request_id),
            )),
        )),
    }
}

/// Recompute matches handler
pub async fn recompute_matches(
    State(state): State<Arc<MatchingApiState>>,
    Path(request_id): Path<String>,
) -> Result<Json<RecomputeResponse>, ApiError> {
    let request_id = parse_id(&request_id, "request")?;

    let request = state
        .service
        .recompute_matches(request_id)
        .await
        .map_err(map_error)?;

    Ok(Json(RecomputeResponse {
        success: true,
        match_count: request.matches.len(),
        matches: request.matches,
    }))
}
