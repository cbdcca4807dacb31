//! API models for escrow HTTP endpoints

use serde::{Deserialize, Serialize};

use common::{ContractId, UserId};

use crate::types::Payment;

/// Request to open an escrow order for a signed contract
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub contract_id: ContractId,
}

/// Gateway callback verification payload
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub gateway_payment_id: String,
    pub signature: String,
}

/// Buyer delivery confirmation
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmDeliveryRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub delivery_confirmed: bool,
    pub quality_approved: bool,
}

/// Admin release request
#[derive(Debug, Serialize, Deserialize)]
pub struct ReleasePaymentRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub admin: bool,
}

/// Admin refund request
#[derive(Debug, Serialize, Deserialize)]
pub struct RefundPaymentRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub admin: bool,
    pub reason: String,
}

/// Payment in API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub success: bool,
    pub payment: Payment,
}

/// Error payload shared by all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}
