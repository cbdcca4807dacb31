//! Shipment client - read-only lookup of delivery evidence
//!
//! Logistics is an external collaborator; the escrow engine only reads
//! the shipment status for a contract to auto-confirm delivery.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use common::ContractId;

use crate::error::Result;

/// Shipment state reported by the logistics collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentStatus {
    /// Status string, e.g. "pending", "in_transit", "delivered"
    pub status: String,
    /// Delivery timestamp, when delivered
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl ShipmentStatus {
    /// Whether the shipment is delivered
    pub fn is_delivered(&self) -> bool {
        self.status == "delivered"
    }
}

/// Read-only client trait for the shipment collaborator
#[async_trait]
pub trait ShipmentClient: Send + Sync {
    /// Look up the shipment for a contract, if any exists
    async fn status_for_contract(&self, contract_id: ContractId) -> Result<Option<ShipmentStatus>>;
}

// ==================== Mock Implementation ====================

/// Mock shipment client for testing
#[derive(Default)]
pub struct MockShipmentClient {
    shipments: RwLock<HashMap<ContractId, ShipmentStatus>>,
}

impl MockShipmentClient {
    /// Create a mock with no shipments
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shipment status for a contract
    pub fn set_status(&self, contract_id: ContractId, status: &str) {
        let delivered_at = (status == "delivered").then(Utc::now);
        self.shipments.write().unwrap().insert(
            contract_id,
            ShipmentStatus {
                status: status.to_string(),
                delivered_at,
            },
        );
    }
}

#[async_trait]
impl ShipmentClient for MockShipmentClient {
    async fn status_for_contract(&self, contract_id: ContractId) -> Result<Option<ShipmentStatus>> {
        Ok(self.shipments.read().unwrap().get(&contract_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_shipment_lookup() {
        let client = MockShipmentClient::new();
        let contract_id = ContractId::new();

        assert!(client
            .status_for_contract(contract_id)
            .await
            .unwrap()
            .is_none());

        client.set_status(contract_id, "in_transit");
        let status = client
            .status_for_contract(contract_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!status.is_delivered());
        assert!(status.delivered_at.is_none());

        client.set_status(contract_id, "delivered");
        let status = client
            .status_for_contract(contract_id)
            .await
            .unwrap()
            .unwrap();
        assert!(status.is_delivered());
        assert!(status.delivered_at.is_some());
    }
}
