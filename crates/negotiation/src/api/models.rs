//! API models for negotiation HTTP endpoints

use serde::{Deserialize, Serialize};

use common::UserId;

use crate::types::{MessageType, Negotiation, NegotiationOrigin, OfferPayload};

/// Request to open a negotiation
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateNegotiationRequest {
    pub user_id: UserId,
    pub title: String,
    pub counterparty_id: UserId,
    pub origin: NegotiationOrigin,
}

/// Request to post a message
#[derive(Debug, Serialize, Deserialize)]
pub struct PostMessageRequest {
    pub user_id: UserId,
    pub content: String,
    pub message_type: MessageType,
    #[serde(default)]
    pub offer: Option<OfferPayload>,
}

/// Request to mark the conversation read
#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadRequest {
    pub user_id: UserId,
}

/// Request to close the negotiation (complete or cancel)
#[derive(Debug, Serialize, Deserialize)]
pub struct CloseNegotiationRequest {
    pub user_id: UserId,
}

/// Negotiation in API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct NegotiationResponse {
    pub success: bool,
    pub negotiation: Negotiation,
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
