//! API handlers for negotiation HTTP endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use common::{Actor, NegotiationId};

use crate::api::models::*;
use crate::error::NegotiationError;
use crate::service::NegotiationService;

pub struct NegotiationApiState {
    pub service: Arc<NegotiationService>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn map_error(e: NegotiationError) -> ApiError {
    let (status, code) = match &e {
        NegotiationError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        NegotiationError::Unauthorized(_) => (StatusCode::FORBIDDEN, "NOT_AUTHORIZED"),
        NegotiationError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        NegotiationError::InvalidState(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
        NegotiationError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (status, Json(ErrorResponse::new(code, e.to_string())))
}

fn parse_id(raw: &str) -> Result<NegotiationId, ApiError> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "INVALID_ID",
                "Invalid negotiation id format",
            )),
        )
    })
}

/// Open a negotiation
pub async fn create_negotiation(
    State(state): State<Arc<NegotiationApiState>>,
    Json(req): Json<CreateNegotiationRequest>,
) -> Result<Json<NegotiationResponse>, ApiError> {
    let negotiation = state
        .service
        .create(
            Actor::user(req.user_id),
            req.title,
            req.counterparty_id,
            req.origin,
        )
        .await
        .map_err(map_error)?;

    Ok(Json(NegotiationResponse {
        success: true,
        negotiation,
    }))
}

/// Get a negotiation
pub async fn get_negotiation(
    State(state): State<Arc<NegotiationApiState>>,
    Path(negotiation_id): Path<String>,
) -> Result<Json<NegotiationResponse>, ApiError> {
    let negotiation_id = parse_id(&negotiation_id)?;

    match state.service.get(negotiation_id).await.map_err(map_error)? {
        Some(negotiation) => Ok(Json(NegotiationResponse {
            success: true,
            negotiation,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "NOT_FOUND",
                format!("Negotiation {} not found", negotiation_id),
            )),
        )),
    }
}

/// Post a message
pub async fn post_message(
    State(state): State<Arc<NegotiationApiState>>,
    Path(negotiation_id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> Result<Json<NegotiationResponse>, ApiError> {
    let negotiation_id = parse_id(&negotiation_id)?;

    let negotiation = state
        .service
        .post_message(
            Actor::user(req.user_id),
            negotiation_id,
            req.content,
            req.message_type,
            req.offer,
        )
        .await
        .map_err(map_error)?;

    Ok(Json(NegotiationResponse {
        success: true,
        negotiation,
    }))
}

/// Mark the conversation read
pub async fn mark_read(
    State(state): State<Arc<NegotiationApiState>>,
    Path(negotiation_id): Path<String>,
    Json(req): Json<MarkReadRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let negotiation_id = parse_id(&negotiation_id)?;

    state
        .service
        .mark_read(Actor::user(req.user_id), negotiation_id)
        .await
        .map_err(map_error)?;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Complete the negotiation
pub async fn complete_negotiation(
    State(state): State<Arc<NegotiationApiState>>,
    Path(negotiation_id): Path<String>,
    Json(req): Json<CloseNegotiationRequest>,
) -> Result<Json<NegotiationResponse>, ApiError> {
    let negotiation_id = parse_id(&negotiation_id)?;

    let negotiation = state
        .service
        .complete(Actor::user(req.user_id), negotiation_id)
        .await
        .map_err(map_error)?;

    Ok(Json(NegotiationResponse {
        success: true,
        negotiation,
    }))
}

/// Cancel the negotiation
pub async fn cancel_negotiation(
    State(state): State<Arc<NegotiationApiState>>,
    Path(negotiation_id): Path<String>,
    Json(req): Json<CloseNegotiationRequest>,
) -> Result<Json<NegotiationResponse>, ApiError> {
    let negotiation_id = parse_id(&negotiation_id)?;

    let negotiation = state
        .service
        .cancel(Actor::user(req.user_id), negotiation_id)
        .await
        .map_err(map_error)?;

    Ok(Json(NegotiationResponse {
        success: true,
        negotiation,
    }))
}
