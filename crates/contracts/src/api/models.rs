//! API models for contract HTTP endpoints

use serde::{Deserialize, Serialize};

use common::{NegotiationId, PartyRole, UserId};

use crate::types::{Contract, ContractTerms, SignaturePayload};

/// Request to create a contract from a completed negotiation
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateContractRequest {
    pub user_id: UserId,
    pub negotiation_id: NegotiationId,
    pub terms: ContractTerms,
}

/// Request to sign a contract in a role
#[derive(Debug, Serialize, Deserialize)]
pub struct SignContractRequest {
    pub user_id: UserId,
    pub role: PartyRole,
    #[serde(flatten)]
    pub payload: SignaturePayload,
}

/// Request to retry a failed ledger deployment
#[derive(Debug, Serialize, Deserialize)]
pub struct RetryDeploymentRequest {
    pub user_id: UserId,
}

/// Request to cancel or dispute a contract
#[derive(Debug, Serialize, Deserialize)]
pub struct CloseContractRequest {
    pub user_id: UserId,
}

/// Contract in API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ContractResponse {
    pub success: bool,
    pub contract: Contract,
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
