//! API handlers for escrow HTTP endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use common::{Actor, PaymentId, UserId};

use crate::api::models::*;
use crate::error::EscrowError;
use crate::manager::EscrowManager;

pub struct EscrowApiState {
    pub manager: Arc<EscrowManager>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn map_error(e: EscrowError) -> ApiError {
    let (status, code) = match &e {
        EscrowError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        EscrowError::Unauthorized(_) => (StatusCode::FORBIDDEN, "NOT_AUTHORIZED"),
        EscrowError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        EscrowError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        EscrowError::VerificationFailed(_) => (StatusCode::BAD_REQUEST, "VERIFICATION_FAILED"),
        EscrowError::Gateway(_) => (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR"),
        EscrowError::InvalidState(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
        EscrowError::Contract(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONTRACT_ERROR"),
        EscrowError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (status, Json(ErrorResponse::new(code, e.to_string())))
}

fn parse_id(raw: &str) -> Result<PaymentId, ApiError> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "INVALID_ID",
                "Invalid payment id format",
            )),
        )
    })
}

fn actor_from(user_id: UserId, admin: bool) -> Actor {
    if admin {
        Actor::admin(user_id)
    } else {
        Actor::user(user_id)
    }
}

/// Open an escrow order
pub async fn create_order(
    State(state): State<Arc<EscrowApiState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = state
        .manager
        .create_order(Actor::user(req.user_id), req.contract_id)
        .await
        .map_err(map_error)?;

    Ok(Json(PaymentResponse {
        success: true,
        payment,
    }))
}

/// Get a payment
pub async fn get_payment(
    State(state): State<Arc<EscrowApiState>>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment_id = parse_id(&payment_id)?;

    match state.manager.get(payment_id).await.map_err(map_error)? {
        Some(payment) => Ok(Json(PaymentResponse {
            success: true,
            payment,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "NOT_FOUND",
                format!("Payment {} not found", payment_id),
            )),
        )),
    }
}

/// Verify a gateway payment callback
pub async fn verify_payment(
    State(state): State<Arc<EscrowApiState>>,
    Path(payment_id): Path<String>,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment_id = parse_id(&payment_id)?;

    let payment = state
        .manager
        .verify(payment_id, &req.gateway_payment_id, &req.signature)
        .await
        .map_err(map_error)?;

    Ok(Json(PaymentResponse {
        success: true,
        payment,
    }))
}

/// Confirm delivery
pub async fn confirm_delivery(
    State(state): State<Arc<EscrowApiState>>,
    Path(payment_id): Path<String>,
    Json(req): Json<ConfirmDeliveryRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment_id = parse_id(&payment_id)?;

    let payment = state
        .manager
        .confirm_delivery(
            Actor::user(req.user_id),
            payment_id,
            req.delivery_confirmed,
            req.quality_approved,
        )
        .await
        .map_err(map_error)?;

    Ok(Json(PaymentResponse {
        success: true,
        payment,
    }))
}

/// Release escrow to the seller
pub async fn release_payment(
    State(state): State<Arc<EscrowApiState>>,
    Path(payment_id): Path<String>,
    Json(req): Json<ReleasePaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment_id = parse_id(&payment_id)?;

    let payment = state
        .manager
        .release(actor_from(req.user_id, req.admin), payment_id)
        .await
        .map_err(map_error)?;

    Ok(Json(PaymentResponse {
        success: true,
        payment,
    }))
}

/// Refund escrow to the buyer
pub async fn refund_payment(
    State(state): State<Arc<EscrowApiState>>,
    Path(payment_id): Path<String>,
    Json(req): Json<RefundPaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment_id = parse_id(&payment_id)?;

    let payment = state
        .manager
        .refund(actor_from(req.user_id, req.admin), payment_id, &req.reason)
        .await
        .map_err(map_error)?;

    Ok(Json(PaymentResponse {
        success: true,
        payment,
    }))
}
