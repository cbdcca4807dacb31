//! Contract Manager - core business logic for the contract lifecycle

use std::sync::Arc;

use common::{Actor, ContractId, NegotiationId, PartyDirectory, PartyRole, UserId};
use negotiation::{NegotiationStatus, NegotiationStore};

use crate::clients::ledger::LedgerClient;
use crate::error::{ContractError, Result};
use crate::store::traits::ContractStore;
use crate::types::{
    format_contract_number, AuditEntry, Contract, ContractParty, ContractStatus, ContractTerms,
    DeploymentState, SignaturePayload, SignatureRecord,
};

/// Tolerance when checking total_value against quantity × price
const TOTAL_VALUE_EPSILON: f64 = 0.01;

/// Contract Manager - handles the contract lifecycle
///
/// The ledger client is injected once at construction; the manager never
/// reaches for ambient state.
pub struct ContractManager {
    store: Arc<dyn ContractStore>,
    ledger: Arc<dyn LedgerClient>,
    negotiations: Arc<dyn NegotiationStore>,
    directory: Arc<dyn PartyDirectory>,
}

impl ContractManager {
    /// Create a new ContractManager
    pub fn new(
        store: Arc<dyn ContractStore>,
        ledger: Arc<dyn LedgerClient>,
        negotiations: Arc<dyn NegotiationStore>,
        directory: Arc<dyn PartyDirectory>,
    ) -> Self {
        Self {
            store,
            ledger,
            negotiations,
            directory,
        }
    }

    /// Create a contract from a completed negotiation.
    ///
    /// Flow:
    /// 1. Resolve the negotiation; it must be completed and the actor a
    ///    participant
    /// 2. Validate the terms (entered independently of any chat offer)
    /// 3. Resolve both parties from the directory
    /// 4. Allocate the next sequence for the company pair and persist in
    ///    draft with a pending deployment
    /// 5. Deploy the ledger record; only a confirmed deployment advances
    ///    the contract to pending
    ///
    /// A deployment failure leaves the contract in draft with an explicit
    /// failed sub-state, retryable via [`retry_deployment`](Self::retry_deployment).
    pub async fn create(
        &self,
        actor: Actor,
        negotiation_id: NegotiationId,
        terms: ContractTerms,
    ) -> Result<Contract> {
        // Step 1: the source negotiation
        let negotiation = self
            .negotiations
            .get(negotiation_id)
            .await
            .map_err(|e| ContractError::Storage(e.to_string()))?
            .ok_or_else(|| ContractError::NotFound(format!("negotiation {}", negotiation_id)))?;

        if negotiation.status != NegotiationStatus::Completed {
            return Err(ContractError::InvalidState(format!(
                "contracts are created from completed negotiations, this one is {}",
                negotiation.status
            )));
        }

        if !negotiation.is_participant(actor.user_id) {
            return Err(ContractError::Unauthorized(format!(
                "user {} is not a participant of negotiation {}",
                actor.user_id, negotiation_id
            )));
        }

        // Step 2: terms
        self.validate_terms(&terms)?;

        // Step 3: parties
        let seller = self.resolve_party(negotiation.seller_id).await?;
        let buyer = self.resolve_party(negotiation.buyer_id).await?;

        // Step 4: number + draft record
        let sequence = self
            .store
            .next_sequence(&seller.company_code, &buyer.company_code)
            .await?;
        let contract_number =
            format_contract_number(&seller.company_code, &buyer.company_code, sequence);

        let mut contract = Contract::new(contract_number, negotiation_id, seller, buyer, terms);
        contract.audit.push(AuditEntry::new(
            Some(actor.user_id),
            "created",
            format!("contract {} created in draft", contract.contract_number),
        ));

        let contract = self.store.create(contract).await?;

        tracing::info!(
            contract_id = %contract.contract_id,
            number = %contract.contract_number,
            "Contract created, deploying ledger record"
        );

        // Step 5: ledger deployment saga step
        self.deploy(actor, contract.contract_id).await
    }

    /// Retry a failed (or still pending) ledger deployment.
    pub async fn retry_deployment(&self, actor: Actor, contract_id: ContractId) -> Result<Contract> {
        let contract = self.get_required(contract_id).await?;

        if !contract.is_party(actor.user_id) {
            return Err(ContractError::Unauthorized(format!(
                "user {} is not a party to contract {}",
                actor.user_id, contract_id
            )));
        }

        if contract.status != ContractStatus::Draft {
            return Err(ContractError::InvalidState(format!(
                "deployment can only be retried from draft, contract is {}",
                contract.status
            )));
        }

        self.deploy(actor, contract_id).await
    }

    /// Deploy the ledger record for a draft contract.
    ///
    /// On success the contract advances to pending; on failure the
    /// deployment sub-state becomes failed and the error surfaces as
    /// retryable. The contract is never treated as valid without its
    /// ledger counterpart.
    async fn deploy(&self, actor: Actor, contract_id: ContractId) -> Result<Contract> {
        let mut contract = self.get_required(contract_id).await?;

        let terms_json = serde_json::to_string(&contract.terms)
            .map_err(|e| ContractError::Storage(e.to_string()))?;

        match self.ledger.deploy(&terms_json).await {
            Ok(deployment) => {
                contract.ledger.deployment = DeploymentState::Confirmed {
                    address: deployment.address.clone(),
                    tx_hash: deployment.tx_hash,
                };
                contract.status = ContractStatus::Pending;
                contract.audit.push(AuditEntry::new(
                    Some(actor.user_id),
                    "deployed",
                    format!("ledger record deployed at {}", deployment.address),
                ));
                contract.updated_at = chrono::Utc::now();
                self.store.update(&contract).await?;

                tracing::info!(
                    contract_id = %contract_id,
                    address = %deployment.address,
                    "Ledger deployment confirmed"
                );

                Ok(contract)
            }
            Err(e) => {
                let reason = e.to_string();
                contract.ledger.deployment = DeploymentState::Failed {
                    error: reason.clone(),
                };
                contract.audit.push(AuditEntry::new(
                    Some(actor.user_id),
                    "deploy_failed",
                    reason.clone(),
                ));
                contract.updated_at = chrono::Utc::now();
                self.store.update(&contract).await?;

                tracing::warn!(contract_id = %contract_id, %reason, "Ledger deployment failed");

                Err(ContractError::Ledger(format!(
                    "deployment of contract {} failed ({}); retry via retry_deployment",
                    contract_id, reason
                )))
            }
        }
    }

    /// Sign the contract in a role.
    ///
    /// Flow:
    /// 1. The actor must hold the role; the contract must be pending
    /// 2. The on-chain signing transaction runs first; local state is
    ///    never advanced before the ledger confirms
    /// 3. The signature is then recorded exactly once (conditional store
    ///    update; a duplicate is a conflict)
    /// 4. The ledger's fully-signed flag is read back; the contract
    ///    becomes signed only when both roles signed locally AND the
    ///    ledger agrees
    ///
    /// Every attempt, failed or not, appends an audit entry.
    pub async fn sign(
        &self,
        actor: Actor,
        contract_id: ContractId,
        role: PartyRole,
        payload: SignaturePayload,
    ) -> Result<Contract> {
        let mut contract = self.get_required(contract_id).await?;

        // Step 1: authorization and state
        match contract.role_of(actor.user_id) {
            Some(r) if r == role => {}
            Some(_) => {
                return Err(ContractError::Unauthorized(format!(
                    "user {} does not hold the {} role on contract {}",
                    actor.user_id, role, contract_id
                )))
            }
            None => {
                return Err(ContractError::Unauthorized(format!(
                    "user {} is not a party to contract {}",
                    actor.user_id, contract_id
                )))
            }
        }

        if contract.status != ContractStatus::Pending {
            return Err(ContractError::InvalidState(format!(
                "contract {} is {}, signing requires pending",
                contract_id, contract.status
            )));
        }

        if contract.signature(role).is_some() {
            return Err(ContractError::Conflict(format!(
                "{} has already signed contract {}",
                role, contract_id
            )));
        }

        let address = contract
            .ledger
            .deployment
            .address()
            .ok_or_else(|| {
                ContractError::InvalidState(format!(
                    "contract {} has no confirmed ledger record",
                    contract_id
                ))
            })?
            .to_string();

        // Step 2: on-chain signing, confirmed before any local advance
        let chain_result = match role {
            PartyRole::Seller => self.ledger.sign_as_seller(&address).await,
            PartyRole::Buyer => self.ledger.sign_as_buyer(&address).await,
        };

        if let Err(e) = chain_result {
            let reason = e.to_string();
            contract.audit.push(AuditEntry::new(
                Some(actor.user_id),
                "sign_failed",
                format!("{} signing transaction failed: {}", role, reason),
            ));
            contract.updated_at = chrono::Utc::now();
            self.store.update(&contract).await?;

            tracing::warn!(contract_id = %contract_id, %role, %reason, "Ledger signing failed");

            return Err(ContractError::Ledger(format!(
                "signing as {} failed ({}); the attempt can be retried",
                role, reason
            )));
        }

        // Step 3: exactly-once local record
        let record = SignatureRecord::new(payload);
        let mut contract = self.store.record_signature(contract_id, role, record).await?;

        contract.audit.push(AuditEntry::new(
            Some(actor.user_id),
            "signed",
            format!("{} signed", role),
        ));

        // Step 4: read back the ledger flag, only now that the
        // transaction is confirmed
        let fully_signed = self.ledger.is_fully_signed(&address).await?;
        contract.ledger.fully_signed_onchain = fully_signed;

        if contract.both_signed_locally() && fully_signed {
            contract.status = ContractStatus::Signed;
            contract.audit.push(AuditEntry::new(
                Some(actor.user_id),
                "fully_signed",
                "both parties signed; ledger reports fully signed".to_string(),
            ));
            tracing::info!(contract_id = %contract_id, "Contract fully signed");
        }

        contract.updated_at = chrono::Utc::now();
        self.store.update(&contract).await?;

        Ok(contract)
    }

    /// Cancel a contract. Parties only; any non-terminal state.
    pub async fn cancel(&self, actor: Actor, contract_id: ContractId) -> Result<Contract> {
        self.close(actor, contract_id, ContractStatus::Cancelled).await
    }

    /// Dispute a contract. Parties only; any non-terminal state.
    pub async fn dispute(&self, actor: Actor, contract_id: ContractId) -> Result<Contract> {
        self.close(actor, contract_id, ContractStatus::Disputed).await
    }

    async fn close(
        &self,
        actor: Actor,
        contract_id: ContractId,
        target: ContractStatus,
    ) -> Result<Contract> {
        let mut contract = self.get_required(contract_id).await?;

        if !contract.is_party(actor.user_id) {
            return Err(ContractError::Unauthorized(format!(
                "user {} is not a party to contract {}",
                actor.user_id, contract_id
            )));
        }

        if !contract.status.can_transition_to(target) {
            return Err(ContractError::InvalidState(format!(
                "contract {} is {} and cannot become {}",
                contract_id, contract.status, target
            )));
        }

        contract.status = target;
        contract.audit.push(AuditEntry::new(
            Some(actor.user_id),
            target.to_string(),
            format!("contract moved to {}", target),
        ));
        contract.updated_at = chrono::Utc::now();
        self.store.update(&contract).await?;

        tracing::info!(contract_id = %contract_id, status = %target, "Contract closed");

        Ok(contract)
    }

    /// Advance a signed contract to executed.
    ///
    /// Never self-initiated: the escrow engine calls this as a side
    /// effect of successful payment verification, and nothing else does.
    pub async fn mark_executed(&self, contract_id: ContractId) -> Result<Contract> {
        self.advance(contract_id, ContractStatus::Signed, ContractStatus::Executed, "payment verified and held in escrow")
            .await
    }

    /// Advance an executed contract to completed.
    ///
    /// Never self-initiated: the escrow engine calls this as a side
    /// effect of escrow release, and nothing else does.
    pub async fn mark_completed(&self, contract_id: ContractId) -> Result<Contract> {
        self.advance(contract_id, ContractStatus::Executed, ContractStatus::Completed, "escrow released to seller")
            .await
    }

    async fn advance(
        &self,
        contract_id: ContractId,
        from: ContractStatus,
        to: ContractStatus,
        detail: &str,
    ) -> Result<Contract> {
        let mut contract = self.get_required(contract_id).await?;

        if contract.status != from {
            return Err(ContractError::InvalidState(format!(
                "contract {} is {}, expected {}",
                contract_id, contract.status, from
            )));
        }

        contract.status = to;
        contract
            .audit
            .push(AuditEntry::new(None, to.to_string(), detail.to_string()));
        contract.updated_at = chrono::Utc::now();
        self.store.update(&contract).await?;

        tracing::info!(contract_id = %contract_id, status = %to, "Contract advanced");

        Ok(contract)
    }

    /// Get a contract by ID
    pub async fn get(&self, contract_id: ContractId) -> Result<Option<Contract>> {
        self.store.get(contract_id).await
    }

    /// List contracts a user is party to
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Contract>> {
        self.store.list_for_user(user_id).await
    }

    fn validate_terms(&self, terms: &ContractTerms) -> Result<()> {
        if terms.material.trim().is_empty() {
            return Err(ContractError::Validation(
                "Material is required".to_string(),
            ));
        }
        if terms.quantity_kg <= 0.0 {
            return Err(ContractError::Validation(
                "Quantity must be greater than 0".to_string(),
            ));
        }
        if terms.price_per_kg < 0.0 {
            return Err(ContractError::Validation(
                "Price must not be negative".to_string(),
            ));
        }
        if terms.total_value <= 0.0 {
            return Err(ContractError::Validation(
                "Total value must be greater than 0".to_string(),
            ));
        }

        let expected = terms.quantity_kg * terms.price_per_kg;
        if (terms.total_value - expected).abs() > TOTAL_VALUE_EPSILON {
            return Err(ContractError::Validation(format!(
                "Total value {} does not match quantity × price ({})",
                terms.total_value, expected
            )));
        }

        Ok(())
    }

    async fn resolve_party(&self, user_id: UserId) -> Result<ContractParty> {
        let party = self
            .directory
            .get(user_id)
            .ok_or_else(|| ContractError::NotFound(format!("party {}", user_id)))?;

        Ok(ContractParty {
            user_id: party.user_id,
            company_name: party.company_name,
            company_code: party.company_code,
        })
    }

    async fn get_required(&self, contract_id: ContractId) -> Result<Contract> {
        self.store
            .get(contract_id)
            .await?
            .ok_or_else(|| ContractError::NotFound(format!("contract {}", contract_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ledger::MockLedgerClient;
    use crate::store::memory::InMemoryContractStore;
    use chrono::Utc;
    use common::{InMemoryPartyDirectory, ListingId, Party};
    use negotiation::{InMemoryNegotiationStore, Negotiation, NegotiationOrigin};

    struct Fixture {
        manager: ContractManager,
        negotiations: Arc<InMemoryNegotiationStore>,
        seller: Actor,
        buyer: Actor,
    }

    async fn fixture_with_ledger(ledger: MockLedgerClient) -> Fixture {
        let directory = Arc::new(InMemoryPartyDirectory::new());
        let seller = UserId::new();
        let buyer = UserId::new();
        directory.register(Party::new(seller, "EcoPlast Industries", "Mumbai"));
        directory.register(Party::new(buyer, "GreenBuild Materials", "Pune"));

        let negotiations = Arc::new(InMemoryNegotiationStore::new());

        let manager = ContractManager::new(
            Arc::new(InMemoryContractStore::new()),
            Arc::new(ledger),
            negotiations.clone(),
            directory,
        );

        Fixture {
            manager,
            negotiations,
            seller: Actor::user(seller),
            buyer: Actor::user(buyer),
        }
    }

    async fn fixture() -> Fixture {
        fixture_with_ledger(MockLedgerClient::new()).await
    }

    async fn completed_negotiation(f: &Fixture) -> NegotiationId {
        let mut negotiation = Negotiation::new(
            "PET flakes",
            NegotiationOrigin::Listing(ListingId::new()),
            f.seller.user_id,
            f.buyer.user_id,
        );
        negotiation.status = NegotiationStatus::Completed;
        let id = negotiation.negotiation_id;
        f.negotiations.create(negotiation).await.unwrap();
        id
    }

    fn terms() -> ContractTerms {
        ContractTerms {
            material: "PET flakes".to_string(),
            quantity_kg: 1000.0,
            price_per_kg: 45.0,
            total_value: 45_000.0,
            delivery_date: Utc::now(),
            payment_terms: "full advance via escrow".to_string(),
        }
    }

    fn payload() -> SignaturePayload {
        SignaturePayload {
            signature: "sig".to_string(),
            signer_address: "0xsigner".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_deploys_and_numbers() {
        let f = fixture().await;
        let negotiation_id = completed_negotiation(&f).await;

        let contract = f
            .manager
            .create(f.buyer, negotiation_id, terms())
            .await
            .unwrap();

        assert_eq!(contract.status, ContractStatus::Pending);
        assert!(contract.ledger.deployment.is_confirmed());
        assert!(contract.contract_number.contains("-ECO-GRE-1001"));
        assert_eq!(contract.seller.user_id, f.seller.user_id);
        assert_eq!(contract.buyer.user_id, f.buyer.user_id);

        // Same pair: next contract takes the next sequence
        let negotiation_id = completed_negotiation(&f).await;
        let second = f
            .manager
            .create(f.buyer, negotiation_id, terms())
            .await
            .unwrap();
        assert!(second.contract_number.ends_with("-1002"));
    }

    #[tokio::test]
    async fn test_create_requires_completed_negotiation() {
        let f = fixture().await;

        let negotiation = Negotiation::new(
            "PET flakes",
            NegotiationOrigin::Listing(ListingId::new()),
            f.seller.user_id,
            f.buyer.user_id,
        );
        let id = negotiation.negotiation_id;
        f.negotiations.create(negotiation).await.unwrap();

        let result = f.manager.create(f.buyer, id, terms()).await;
        assert!(matches!(result, Err(ContractError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_non_participant() {
        let f = fixture().await;
        let negotiation_id = completed_negotiation(&f).await;

        let stranger = Actor::user(UserId::new());
        let result = f.manager.create(stranger, negotiation_id, terms()).await;
        assert!(matches!(result, Err(ContractError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_create_validates_terms() {
        let f = fixture().await;
        let negotiation_id = completed_negotiation(&f).await;

        let mut bad = terms();
        bad.total_value = 44_000.0; // inconsistent with quantity × price
        let result = f.manager.create(f.buyer, negotiation_id, bad).await;
        assert!(matches!(result, Err(ContractError::Validation(_))));
    }

    #[tokio::test]
    async fn test_deploy_failure_leaves_retryable_draft() {
        let f = fixture_with_ledger(MockLedgerClient::new().with_deploy_failure(true)).await;
        let negotiation_id = completed_negotiation(&f).await;

        let result = f.manager.create(f.buyer, negotiation_id, terms()).await;
        assert!(matches!(result, Err(ContractError::Ledger(_))));

        // The record exists in draft with an explicit failed deployment
        let contracts = f.manager.list_for_user(f.buyer.user_id).await.unwrap();
        assert_eq!(contracts.len(), 1);
        let contract = &contracts[0];
        assert_eq!(contract.status, ContractStatus::Draft);
        assert!(matches!(
            contract.ledger.deployment,
            DeploymentState::Failed { .. }
        ));

        // Signing a draft is a state error, never "assume signed"
        let result = f
            .manager
            .sign(f.seller, contract.contract_id, PartyRole::Seller, payload())
            .await;
        assert!(matches!(result, Err(ContractError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_retry_deployment_recovers() {
        let f = fixture_with_ledger(MockLedgerClient::new().with_deploy_failure(true)).await;
        let negotiation_id = completed_negotiation(&f).await;

        let _ = f.manager.create(f.buyer, negotiation_id, terms()).await;
        let contract_id = f.manager.list_for_user(f.buyer.user_id).await.unwrap()[0].contract_id;

        // Still failing: stays draft
        let result = f.manager.retry_deployment(f.buyer, contract_id).await;
        assert!(matches!(result, Err(ContractError::Ledger(_))));

        // (A fresh fixture whose ledger works shows the success path in
        // test_create_deploys_and_numbers; here we assert the retry left
        // the record in its prior state.)
        let contract = f.manager.get(contract_id).await.unwrap().unwrap();
        assert_eq!(contract.status, ContractStatus::Draft);
    }

    #[tokio::test]
    async fn test_sign_both_roles_reaches_signed() {
        let f = fixture().await;
        let negotiation_id = completed_negotiation(&f).await;
        let contract = f
            .manager
            .create(f.buyer, negotiation_id, terms())
            .await
            .unwrap();

        let contract = f
            .manager
            .sign(f.seller, contract.contract_id, PartyRole::Seller, payload())
            .await
            .unwrap();
        // Partial local signing never advances status
        assert_eq!(contract.status, ContractStatus::Pending);
        assert!(contract.seller_signature.is_some());
        assert!(!contract.ledger.fully_signed_onchain);

        let contract = f
            .manager
            .sign(f.buyer, contract.contract_id, PartyRole::Buyer, payload())
            .await
            .unwrap();
        assert_eq!(contract.status, ContractStatus::Signed);
        assert!(contract.both_signed_locally());
        assert!(contract.ledger.fully_signed_onchain);

        // Every attempt appended an audit entry
        assert!(contract.audit.iter().any(|a| a.action == "fully_signed"));
    }

    #[tokio::test]
    async fn test_sign_twice_rejected() {
        let f = fixture().await;
        let negotiation_id = completed_negotiation(&f).await;
        let contract = f
            .manager
            .create(f.buyer, negotiation_id, terms())
            .await
            .unwrap();

        f.manager
            .sign(f.seller, contract.contract_id, PartyRole::Seller, payload())
            .await
            .unwrap();

        let result = f
            .manager
            .sign(f.seller, contract.contract_id, PartyRole::Seller, payload())
            .await;
        assert!(matches!(result, Err(ContractError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_sign_wrong_role_or_stranger_rejected() {
        let f = fixture().await;
        let negotiation_id = completed_negotiation(&f).await;
        let contract = f
            .manager
            .create(f.buyer, negotiation_id, terms())
            .await
            .unwrap();

        // Buyer cannot sign as seller
        let result = f
            .manager
            .sign(f.buyer, contract.contract_id, PartyRole::Seller, payload())
            .await;
        assert!(matches!(result, Err(ContractError::Unauthorized(_))));

        // A stranger cannot sign at all
        let stranger = Actor::user(UserId::new());
        let result = f
            .manager
            .sign(stranger, contract.contract_id, PartyRole::Buyer, payload())
            .await;
        assert!(matches!(result, Err(ContractError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_ledger_sign_failure_leaves_prior_state() {
        let f = fixture().await;
        let negotiation_id = completed_negotiation(&f).await;
        let contract = f
            .manager
            .create(f.buyer, negotiation_id, terms())
            .await
            .unwrap();
        let contract_id = contract.contract_id;

        // Swap in a failing ledger by building a second manager over the
        // same store
        let failing = ContractManager::new(
            f.manager.store.clone(),
            Arc::new(MockLedgerClient::new().with_signing_failure(true)),
            f.manager.negotiations.clone(),
            f.manager.directory.clone(),
        );

        let result = failing
            .sign(f.seller, contract_id, PartyRole::Seller, payload())
            .await;
        assert!(matches!(result, Err(ContractError::Ledger(_))));

        // No local signature was recorded; the attempt is audited
        let contract = f.manager.get(contract_id).await.unwrap().unwrap();
        assert!(contract.seller_signature.is_none());
        assert_eq!(contract.status, ContractStatus::Pending);
        assert!(contract.audit.iter().any(|a| a.action == "sign_failed"));

        // The retry against a working ledger succeeds
        f.manager
            .sign(f.seller, contract_id, PartyRole::Seller, payload())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_payment_driven_transitions() {
        let f = fixture().await;
        let negotiation_id = completed_negotiation(&f).await;
        let contract = f
            .manager
            .create(f.buyer, negotiation_id, terms())
            .await
            .unwrap();
        let id = contract.contract_id;

        // Executed requires signed
        let result = f.manager.mark_executed(id).await;
        assert!(matches!(result, Err(ContractError::InvalidState(_))));

        f.manager
            .sign(f.seller, id, PartyRole::Seller, payload())
            .await
            .unwrap();
        f.manager
            .sign(f.buyer, id, PartyRole::Buyer, payload())
            .await
            .unwrap();

        let contract = f.manager.mark_executed(id).await.unwrap();
        assert_eq!(contract.status, ContractStatus::Executed);

        // Completed requires executed
        let contract = f.manager.mark_completed(id).await.unwrap();
        assert_eq!(contract.status, ContractStatus::Completed);

        // Terminal: nothing moves it again
        let result = f.manager.mark_completed(id).await;
        assert!(matches!(result, Err(ContractError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_cancel_and_dispute() {
        let f = fixture().await;
        let negotiation_id = completed_negotiation(&f).await;
        let contract = f
            .manager
            .create(f.buyer, negotiation_id, terms())
            .await
            .unwrap();

        let cancelled = f.manager.cancel(f.seller, contract.contract_id).await.unwrap();
        assert_eq!(cancelled.status, ContractStatus::Cancelled);

        // Terminal states cannot be disputed afterwards
        let result = f.manager.dispute(f.seller, contract.contract_id).await;
        assert!(matches!(result, Err(ContractError::InvalidState(_))));

        // A stranger cannot cancel
        let negotiation_id = completed_negotiation(&f).await;
        let contract = f
            .manager
            .create(f.buyer, negotiation_id, terms())
            .await
            .unwrap();
        let stranger = Actor::user(UserId::new());
        let result = f.manager.cancel(stranger, contract.contract_id).await;
        assert!(matches!(result, Err(ContractError::Unauthorized(_))));
    }
}
