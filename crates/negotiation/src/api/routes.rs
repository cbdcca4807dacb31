//! API routes for the negotiation channel

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::*;
use crate::api::NegotiationApiState;

/// Create the negotiation router
///
/// Health endpoints are composed by the binary, not per engine.
pub fn create_router(state: NegotiationApiState) -> Router {
    Router::new()
        .route("/api/v1/negotiations", post(create_negotiation))
        .route("/api/v1/negotiations/:negotiation_id", get(get_negotiation))
        .route(
            "/api/v1/negotiations/:negotiation_id/messages",
            post(post_message),
        )
        .route("/api/v1/negotiations/:negotiation_id/read", post(mark_read))
        .route(
            "/api/v1/negotiations/:negotiation_id/complete",
            post(complete_negotiation),
        )
        .route(
            "/api/v1/negotiations/:negotiation_id/cancel",
            post(cancel_negotiation),
        )
        .with_state(Arc::new(state))
}
