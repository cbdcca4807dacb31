//! API routes for the contract lifecycle

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::*;
use crate::api::ContractApiState;

/// Create the contracts router
///
/// Health endpoints are composed by the binary, not per engine.
pub fn create_router(state: ContractApiState) -> Router {
    Router::new()
        .route("/api/v1/contracts", post(create_contract))
        .route("/api/v1/contracts/:contract_id", get(get_contract))
        .route("/api/v1/contracts/:contract_id/sign", post(sign_contract))
        .route(
            "/api/v1/contracts/:contract_id/retry-deployment",
            post(retry_deployment),
        )
        .route(
            "/api/v1/contracts/:contract_id/cancel",
            post(cancel_contract),
        )
        .route(
            "/api/v1/contracts/:contract_id/dispute",
            post(dispute_contract),
        )
        .with_state(Arc::new(state))
}
