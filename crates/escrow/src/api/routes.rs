//! API routes for escrow payments

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::*;
use crate::api::EscrowApiState;

/// Create the escrow router
///
/// Health endpoints are composed by the binary, not per engine.
pub fn create_router(state: EscrowApiState) -> Router {
    Router::new()
        .route("/api/v1/payments", post(create_order))
        .route("/api/v1/payments/:payment_id", get(get_payment))
        .route("/api/v1/payments/:payment_id/verify", post(verify_payment))
        .route(
            "/api/v1/payments/:payment_id/confirm-delivery",
            post(confirm_delivery),
        )
        .route(
            "/api/v1/payments/:payment_id/release",
            post(release_payment),
        )
        .route("/api/v1/payments/:payment_id/refund", post(refund_payment))
        .with_state(Arc::new(state))
}
