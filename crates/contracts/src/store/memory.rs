//! In-memory contract store implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use common::{ContractId, PartyRole, UserId};

use crate::error::{ContractError, Result};
use crate::store::traits::ContractStore;
use crate::types::{Contract, SignatureRecord};

/// First sequence issued for a new company pair
const SEQUENCE_START: u32 = 1001;

/// In-memory contract store for testing and development
///
/// Sequence allocation and signature recording run under the write lock,
/// which gives the same atomicity the Postgres store gets from
/// transactions.
#[derive(Default)]
pub struct InMemoryContractStore {
    contracts: RwLock<HashMap<ContractId, Contract>>,
    sequences: RwLock<HashMap<(String, String), u32>>,
}

impl InMemoryContractStore {
    /// Create a new in-memory contract store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContractStore for InMemoryContractStore {
    async fn create(&self, contract: Contract) -> Result<Contract> {
        let mut contracts = self.contracts.write().unwrap();
        contracts.insert(contract.contract_id, contract.clone());
        Ok(contract)
    }

    async fn get(&self, contract_id: ContractId) -> Result<Option<Contract>> {
        let contracts = self.contracts.read().unwrap();
        Ok(contracts.get(&contract_id).cloned())
    }

    async fn update(&self, contract: &Contract) -> Result<()> {
        let mut contracts = self.contracts.write().unwrap();
        if contracts.contains_key(&contract.contract_id) {
            contracts.insert(contract.contract_id, contract.clone());
            Ok(())
        } else {
            Err(ContractError::NotFound(format!(
                "contract {}",
                contract.contract_id
            )))
        }
    }

    async fn next_sequence(&self, seller_code: &str, buyer_code: &str) -> Result<u32> {
        let mut sequences = self.sequences.write().unwrap();
        let key = (seller_code.to_string(), buyer_code.to_string());
        let next = sequences
            .get(&key)
            .map(|last| last + 1)
            .unwrap_or(SEQUENCE_START);
        sequences.insert(key, next);
        Ok(next)
    }

    async fn record_signature(
        &self,
        contract_id: ContractId,
        role: PartyRole,
        record: SignatureRecord,
    ) -> Result<Contract> {
        let mut contracts = self.contracts.write().unwrap();
        let contract = contracts
            .get_mut(&contract_id)
            .ok_or_else(|| ContractError::NotFound(format!("contract {}", contract_id)))?;

        let slot = match role {
            PartyRole::Seller => &mut contract.seller_signature,
            PartyRole::Buyer => &mut contract.buyer_signature,
        };

        if slot.is_some() {
            return Err(ContractError::Conflict(format!(
                "{} has already signed contract {}",
                role, contract_id
            )));
        }

        *slot = Some(record);
        contract.updated_at = Utc::now();
        Ok(contract.clone())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Contract>> {
        let contracts = self.contracts.read().unwrap();
        let mut result: Vec<Contract> = contracts
            .values()
            .filter(|c| c.is_party(user_id))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContractParty, ContractTerms, SignaturePayload};
    use common::NegotiationId;

    fn test_contract() -> Contract {
        Contract::new(
            "C-2026-ECO-GRN-1001".to_string(),
            NegotiationId::new(),
            ContractParty {
                user_id: UserId::new(),
                company_name: "EcoPlast Industries".to_string(),
                company_code: "ECO".to_string(),
            },
            ContractParty {
                user_id: UserId::new(),
                company_name: "GreenBuild Materials".to_string(),
                company_code: "GRN".to_string(),
            },
            ContractTerms {
                material: "PET flakes".to_string(),
                quantity_kg: 1000.0,
                price_per_kg: 45.0,
                total_value: 45_000.0,
                delivery_date: Utc::now(),
                payment_terms: "full advance via escrow".to_string(),
            },
        )
    }

    fn signature() -> SignatureRecord {
        SignatureRecord::new(SignaturePayload {
            signature: "sig".to_string(),
            signer_address: "0xsigner".to_string(),
        })
    }

    #[tokio::test]
    async fn test_sequence_starts_at_1001_per_pair() {
        let store = InMemoryContractStore::new();

        assert_eq!(store.next_sequence("ECO", "GRN").await.unwrap(), 1001);
        assert_eq!(store.next_sequence("ECO", "GRN").await.unwrap(), 1002);
        assert_eq!(store.next_sequence("ECO", "GRN").await.unwrap(), 1003);

        // A different pair has its own sequence; reversed roles are a
        // different pair
        assert_eq!(store.next_sequence("GRN", "ECO").await.unwrap(), 1001);
        assert_eq!(store.next_sequence("ECO", "STL").await.unwrap(), 1001);
    }

    #[tokio::test]
    async fn test_concurrent_sequence_allocation_never_collides() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryContractStore::new());
        let mut handles = Vec::new();

        for _ in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.next_sequence("ECO", "GRN").await.unwrap()
            }));
        }

        let mut seen = std::collections::HashSet::new();
        for handle in handles {
            let seq = handle.await.unwrap();
            assert!(seen.insert(seq), "sequence {} allocated twice", seq);
        }
        assert_eq!(seen.len(), 20);
    }

    #[tokio::test]
    async fn test_record_signature_exactly_once() {
        let store = InMemoryContractStore::new();
        let contract = test_contract();
        let id = contract.contract_id;
        store.create(contract).await.unwrap();

        let updated = store
            .record_signature(id, PartyRole::Seller, signature())
            .await
            .unwrap();
        assert!(updated.seller_signature.is_some());
        assert!(updated.buyer_signature.is_none());

        // Second signature for the same role is a conflict
        let result = store
            .record_signature(id, PartyRole::Seller, signature())
            .await;
        assert!(matches!(result, Err(ContractError::Conflict(_))));

        // The other role still signs fine
        let updated = store
            .record_signature(id, PartyRole::Buyer, signature())
            .await
            .unwrap();
        assert!(updated.both_signed_locally());
    }

    #[tokio::test]
    async fn test_list_for_user() {
        let store = InMemoryContractStore::new();
        let contract = test_contract();
        let seller = contract.seller.user_id;
        store.create(contract).await.unwrap();

        assert_eq!(store.list_for_user(seller).await.unwrap().len(), 1);
        assert!(store.list_for_user(UserId::new()).await.unwrap().is_empty());
    }
}
