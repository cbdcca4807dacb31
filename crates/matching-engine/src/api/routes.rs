//! API routes for the matching engine

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::*;
use crate::api::MatchingApiState;

/// Create the matching router
///
/// Health endpoints are composed by the binary, not per engine, so the
/// monolith can merge every engine router into one.
pub fn create_router(state: MatchingApiState) -> Router {
    Router::new()
        .route("/api/v1/listings", post(create_listing))
        .route("/api/v1/listings/:listing_id", get(get_listing))
        .route("/api/v1/requests", post(create_request))
        .route("/api/v1/requests/:request_id", get(get_request))
        .route(
            "/api/v1/requests/:request_id/recompute",
            post(recompute_matches),
        )
        .with_state(Arc::new(state))
}
