//! Contract domain types

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use common::{ContractId, NegotiationId, PartyRole, UserId};

/// Contract status
///
/// Moves only forward along draft → pending → signed → executed →
/// completed; any non-terminal state may also move to cancelled or
/// disputed. No transition rolls back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Created locally, ledger record not yet confirmed
    Draft,
    /// Deployed to the ledger, awaiting signatures
    Pending,
    /// Both parties signed and the ledger reports fully-signed
    Signed,
    /// Payment verified and held in escrow
    Executed,
    /// Escrow released to the seller
    Completed,
    /// Cancelled by a party before completion
    Cancelled,
    /// Disputed by a party before completion
    Disputed,
}

impl ContractStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ContractStatus::Completed | ContractStatus::Cancelled | ContractStatus::Disputed
        )
    }

    /// Position in the forward chain (terminal side states excluded)
    fn rank(&self) -> Option<u8> {
        match self {
            ContractStatus::Draft => Some(0),
            ContractStatus::Pending => Some(1),
            ContractStatus::Signed => Some(2),
            ContractStatus::Executed => Some(3),
            ContractStatus::Completed => Some(4),
            ContractStatus::Cancelled | ContractStatus::Disputed => None,
        }
    }

    /// Whether a transition to `next` is allowed: one step forward along
    /// the chain, or to cancelled/disputed from any non-terminal state.
    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            ContractStatus::Cancelled | ContractStatus::Disputed => true,
            _ => match (self.rank(), next.rank()) {
                (Some(from), Some(to)) => to == from + 1,
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractStatus::Draft => write!(f, "draft"),
            ContractStatus::Pending => write!(f, "pending"),
            ContractStatus::Signed => write!(f, "signed"),
            ContractStatus::Executed => write!(f, "executed"),
            ContractStatus::Completed => write!(f, "completed"),
            ContractStatus::Cancelled => write!(f, "cancelled"),
            ContractStatus::Disputed => write!(f, "disputed"),
        }
    }
}

/// Ledger deployment sub-state
///
/// The off-chain record and the on-chain record are a dual write; the
/// sub-state keeps the pending/failed cases visible instead of assuming
/// the deploy succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeploymentState {
    /// Deploy not yet confirmed
    Pending,
    /// Ledger record exists at this address
    Confirmed { address: String, tx_hash: String },
    /// Deploy failed; retryable
    Failed { error: String },
}

impl DeploymentState {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, DeploymentState::Confirmed { .. })
    }

    /// The deployed ledger address, if confirmed
    pub fn address(&self) -> Option<&str> {
        match self {
            DeploymentState::Confirmed { address, .. } => Some(address),
            _ => None,
        }
    }
}

/// The contract's view of its ledger counterpart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Deployment sub-state
    pub deployment: DeploymentState,
    /// Last fully-signed flag read back from the ledger
    pub fully_signed_onchain: bool,
}

impl LedgerRecord {
    pub fn pending() -> Self {
        Self {
            deployment: DeploymentState::Pending,
            fully_signed_onchain: false,
        }
    }
}

/// A party to the contract, resolved from the directory at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractParty {
    pub user_id: UserId,
    pub company_name: String,
    pub company_code: String,
}

/// Contract terms, entered at creation
///
/// Terms are re-entered rather than copied from the negotiation's
/// advisory offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    /// Material being traded
    pub material: String,
    /// Quantity in kilograms
    pub quantity_kg: f64,
    /// Price per kilogram
    pub price_per_kg: f64,
    /// Total contract value
    pub total_value: f64,
    /// Agreed delivery date
    pub delivery_date: DateTime<Utc>,
    /// Payment terms description (e.g. "full advance via escrow")
    pub payment_terms: String,
}

/// Signature metadata supplied by a signing party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePayload {
    /// The signature blob
    pub signature: String,
    /// Address the signature was submitted from
    pub signer_address: String,
}

/// A recorded signature for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub signed_at: DateTime<Utc>,
    pub signature: String,
    pub signer_address: String,
}

impl SignatureRecord {
    pub fn new(payload: SignaturePayload) -> Self {
        Self {
            signed_at: Utc::now(),
            signature: payload.signature,
            signer_address: payload.signer_address,
        }
    }
}

/// An audit log entry
///
/// Every signing attempt and every status transition appends one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub actor: Option<UserId>,
    pub action: String,
    pub detail: String,
}

impl AuditEntry {
    pub fn new(actor: Option<UserId>, action: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            actor,
            action: action.into(),
            detail: detail.into(),
        }
    }
}

/// A dual-signed trade contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    /// Unique contract identifier
    pub contract_id: ContractId,
    /// Human-readable contract number, unique per company pair
    pub contract_number: String,
    /// The negotiation this contract was created from (1:1)
    pub negotiation_id: NegotiationId,
    /// Selling party
    pub seller: ContractParty,
    /// Buying party
    pub buyer: ContractParty,
    /// Agreed terms
    pub terms: ContractTerms,
    /// Seller's signature, if recorded
    #[serde(default)]
    pub seller_signature: Option<SignatureRecord>,
    /// Buyer's signature, if recorded
    #[serde(default)]
    pub buyer_signature: Option<SignatureRecord>,
    /// Ledger counterpart state
    pub ledger: LedgerRecord,
    /// Current status
    pub status: ContractStatus,
    /// Audit log
    #[serde(default)]
    pub audit: Vec<AuditEntry>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn new(
        contract_number: String,
        negotiation_id: NegotiationId,
        seller: ContractParty,
        buyer: ContractParty,
        terms: ContractTerms,
    ) -> Self {
        let now = Utc::now();
        Self {
            contract_id: ContractId::new(),
            contract_number,
            negotiation_id,
            seller,
            buyer,
            terms,
            seller_signature: None,
            buyer_signature: None,
            ledger: LedgerRecord::pending(),
            status: ContractStatus::Draft,
            audit: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The role a user holds on this contract, if any
    pub fn role_of(&self, user_id: UserId) -> Option<PartyRole> {
        if self.seller.user_id == user_id {
            Some(PartyRole::Seller)
        } else if self.buyer.user_id == user_id {
            Some(PartyRole::Buyer)
        } else {
            None
        }
    }

    /// Whether a user is one of the two parties
    pub fn is_party(&self, user_id: UserId) -> bool {
        self.role_of(user_id).is_some()
    }

    /// The recorded signature for a role
    pub fn signature(&self, role: PartyRole) -> Option<&SignatureRecord> {
        match role {
            PartyRole::Seller => self.seller_signature.as_ref(),
            PartyRole::Buyer => self.buyer_signature.as_ref(),
        }
    }

    /// Whether both roles have signed locally
    pub fn both_signed_locally(&self) -> bool {
        self.seller_signature.is_some() && self.buyer_signature.is_some()
    }
}

/// Format a contract number: `C-{year}-{sellerCode}-{buyerCode}-{sequence}`
pub fn format_contract_number(seller_code: &str, buyer_code: &str, sequence: u32) -> String {
    format!(
        "C-{}-{}-{}-{}",
        Utc::now().year(),
        seller_code,
        buyer_code,
        sequence
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(code: &str) -> ContractParty {
        ContractParty {
            user_id: UserId::new(),
            company_name: format!("{} Pvt Ltd", code),
            company_code: code.to_string(),
        }
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

    #[test]
    fn test_status_forward_only() {
        use ContractStatus::*;

        assert!(Draft.can_transition_to(Pending));
        assert!(Pending.can_transition_to(Signed));
        assert!(Signed.can_transition_to(Executed));
        assert!(Executed.can_transition_to(Completed));

        // No skipping, no going back
        assert!(!Draft.can_transition_to(Signed));
        assert!(!Signed.can_transition_to(Pending));
        assert!(!Executed.can_transition_to(Signed));

        // Cancelled/disputed from any non-terminal state
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Executed.can_transition_to(Disputed));

        // Terminal states admit nothing
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Disputed.can_transition_to(Completed));
    }

    #[test]
    fn test_contract_roles() {
        let contract = Contract::new(
            "C-2026-ECO-GRN-1001".to_string(),
            NegotiationId::new(),
            party("ECO"),
            party("GRN"),
            terms(),
        );

        assert_eq!(
            contract.role_of(contract.seller.user_id),
            Some(PartyRole::Seller)
        );
        assert_eq!(
            contract.role_of(contract.buyer.user_id),
            Some(PartyRole::Buyer)
        );
        assert_eq!(contract.role_of(UserId::new()), None);
        assert!(!contract.both_signed_locally());
    }

    #[test]
    fn test_format_contract_number() {
        let number = format_contract_number("ECO", "GRN", 1001);
        let year = Utc::now().year();
        assert_eq!(number, format!("C-{}-ECO-GRN-1001", year));
    }

    #[test]
    fn test_deployment_state() {
        assert!(!DeploymentState::Pending.is_confirmed());
        let confirmed = DeploymentState::Confirmed {
            address: "0xabc".to_string(),
            tx_hash: "0xdef".to_string(),
        };
        assert!(confirmed.is_confirmed());
        assert_eq!(confirmed.address(), Some("0xabc"));
    }
}
