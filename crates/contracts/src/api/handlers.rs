//! API handlers for contract HTTP endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use common::{Actor, ContractId};

use crate::api::models::*;
use crate::error::ContractError;
use crate::manager::ContractManager;

pub struct ContractApiState {
    pub manager: Arc<ContractManager>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn map_error(e: ContractError) -> ApiError {
    let (status, code) = match &e {
        ContractError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ContractError::Unauthorized(_) => (StatusCode::FORBIDDEN, "NOT_AUTHORIZED"),
        ContractError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ContractError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        ContractError::Ledger(_) => (StatusCode::BAD_GATEWAY, "LEDGER_ERROR"),
        ContractError::InvalidState(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
        ContractError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (status, Json(ErrorResponse::new(code, e.to_string())))
}

fn parse_id(raw: &str) -> Result<ContractId, ApiError> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "INVALID_ID",
                "Invalid contract id format",
            )),
        )
    })
}

/// Create a contract
pub async fn create_contract(
    State(state): State<Arc<ContractApiState>>,
    Json(req): Json<CreateContractRequest>,
) -> Result<Json<ContractResponse>, ApiError> {
    let contract = state
        .manager
        .create(Actor::user(req.user_id), req.negotiation_id, req.terms)
        .await
        .map_err(map_error)?;

    Ok(Json(ContractResponse {
        success: true,
        contract,
    }))
}

/// Get a contract
pub async fn get_contract(
    State(state): State<Arc<ContractApiState>>,
    Path(contract_id): Path<String>,
) -> Result<Json<ContractResponse>, ApiError> {
    let contract_id = parse_id(&contract_id)?;

    match state.manager.get(contract_id).await.map_err(map_error)? {
        Some(contract) => Ok(Json(ContractResponse {
            success: true,
            contract,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "NOT_FOUND",
                format!("Contract {} not found", contract_id),
            )),
        )),
    }
}

/// Sign a contract
pub async fn sign_contract(
    State(state): State<Arc<ContractApiState>>,
    Path(contract_id): Path<String>,
    Json(req): Json<SignContractRequest>,
) -> Result<Json<ContractResponse>, ApiError> {
    let contract_id = parse_id(&contract_id)?;

    let contract = state
        .manager
        .sign(Actor::user(req.user_id), contract_id, req.role, req.payload)
        .await
        .map_err(map_error)?;

    Ok(Json(ContractResponse {
        success: true,
        contract,
    }))
}

/// Retry a failed ledger deployment
pub async fn retry_deployment(
    State(state): State<Arc<ContractApiState>>,
    Path(contract_id): Path<String>,
    Json(req): Json<RetryDeploymentRequest>,
) -> Result<Json<ContractResponse>, ApiError> {
    let contract_id = parse_id(&contract_id)?;

    let contract = state
        .manager
        .retry_deployment(Actor::user(req.user_id), contract_id)
        .await
        .map_err(map_error)?;

    Ok(Json(ContractResponse {
        success: true,
        contract,
    }))
}

/// Cancel a contract
pub async fn cancel_contract(
    State(state): State<Arc<ContractApiState>>,
    Path(contract_id): Path<String>,
    Json(req): Json<CloseContractRequest>,
) -> Result<Json<ContractResponse>, ApiError> {
    let contract_id = parse_id(&contract_id)?;

    let contract = state
        .manager
        .cancel(Actor::user(req.user_id), contract_id)
        .await
        .map_err(map_error)?;

    Ok(Json(ContractResponse {
        success: true,
        contract,
    }))
}

/// Dispute a contract
pub async fn dispute_contract(
    State(state): State<Arc<ContractApiState>>,
    Path(contract_id): Path<String>,
    Json(req): Json<CloseContractRequest>,
) -> Result<Json<ContractResponse>, ApiError> {
    let contract_id = parse_id(&contract_id)?;

    let contract = state
        .manager
        .dispute(Actor::user(req.user_id), contract_id)
        .await
        .map_err(map_error)?;

    Ok(Json(ContractResponse {
        success: true,
        contract,
    }))
}
