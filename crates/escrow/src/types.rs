//! Payment domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::{ContractId, PaymentId};

/// Payment status
///
/// Moves only forward: pending → held_in_escrow → released_to_seller or
/// refunded; pending → failed on a bad verification. No rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Gateway order opened, awaiting verification
    Pending,
    /// Funds verified and held in escrow
    HeldInEscrow,
    /// Escrow paid out to the seller
    ReleasedToSeller,
    /// Escrow returned to the buyer
    Refunded,
    /// Verification failed; dead end, a new order is required
    Failed,
}

impl PaymentStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::ReleasedToSeller | PaymentStatus::Refunded | PaymentStatus::Failed
        )
    }

    /// Whether this payment blocks another order for the same contract
    ///
    /// A failed payment is a dead end and does not; everything else does.
    pub fn blocks_new_order(&self) -> bool {
        !matches!(self, PaymentStatus::Failed)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::HeldInEscrow => write!(f, "held_in_escrow"),
            PaymentStatus::ReleasedToSeller => write!(f, "released_to_seller"),
            PaymentStatus::Refunded => write!(f, "refunded"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The amount split, fixed at order creation and never recomputed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentAmount {
    /// Total contract value collected from the buyer
    pub total: f64,
    /// Amount paid out to the seller on release
    pub seller_amount: f64,
    /// Commission withheld by the platform
    pub platform_fee: f64,
}

/// The payment's view of the external gateway order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Order id returned by the gateway
    pub order_id: String,
    /// Gateway payment id, present once verified
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Whether the callback signature checked out
    #[serde(default)]
    pub signature_verified: bool,
}

/// Conditions that release escrow without waiting for the timeout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseConditions {
    /// Delivery confirmed (by the buyer, or forced by shipment evidence)
    pub delivery_confirmed: bool,
    /// Quality approved by the buyer
    pub quality_approved: bool,
}

impl ReleaseConditions {
    /// Whether both conditions hold
    pub fn all_met(&self) -> bool {
        self.delivery_confirmed && self.quality_approved
    }
}

/// Escrow custody sub-record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// When funds entered escrow
    pub held_at: Option<DateTime<Utc>>,
    /// When timeout release becomes eligible
    pub auto_release_date: Option<DateTime<Utc>>,
    /// Conditional release state
    #[serde(default)]
    pub release_conditions: ReleaseConditions,
    /// When funds were released to the seller
    pub released_at: Option<DateTime<Utc>>,
    /// When funds were refunded to the buyer
    pub refunded_at: Option<DateTime<Utc>>,
}

/// A timeline entry
///
/// Every transition and every failed verification appends one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub at: DateTime<Utc>,
    pub event: String,
    pub note: String,
}

impl TimelineEntry {
    pub fn new(event: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            event: event.into(),
            note: note.into(),
        }
    }
}

/// An escrow payment against a signed contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment identifier
    pub payment_id: PaymentId,
    /// The contract this payment settles
    pub contract_id: ContractId,
    /// Amount split, frozen at creation
    pub amount: PaymentAmount,
    /// Settlement currency
    pub currency: String,
    /// Gateway order state
    pub gateway: GatewayOrder,
    /// Escrow custody state
    #[serde(default)]
    pub escrow: EscrowRecord,
    /// Current status
    pub status: PaymentStatus,
    /// Event timeline
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        contract_id: ContractId,
        amount: PaymentAmount,
        currency: impl Into<String>,
        gateway_order_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            payment_id: PaymentId::new(),
            contract_id,
            amount,
            currency: currency.into(),
            gateway: GatewayOrder {
                order_id: gateway_order_id.into(),
                payment_id: None,
                signature_verified: false,
            },
            escrow: EscrowRecord::default(),
            status: PaymentStatus::Pending,
            timeline: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether timeout release is eligible at `now` (strictly after the
    /// auto-release date, never at or before it)
    pub fn due_for_auto_release(&self, now: DateTime<Utc>) -> bool {
        self.status == PaymentStatus::HeldInEscrow
            && self
                .escrow
                .auto_release_date
                .map(|date| now > date)
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn payment() -> Payment {
        Payment::new(
            ContractId::new(),
            PaymentAmount {
                total: 45_000.0,
                seller_amount: 43_875.0,
                platform_fee: 1_125.0,
            },
            "INR",
            "order_123",
        )
    }

    #[test]
    fn test_status_predicates() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(!PaymentStatus::HeldInEscrow.is_terminal());
        assert!(PaymentStatus::ReleasedToSeller.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());

        assert!(PaymentStatus::Pending.blocks_new_order());
        assert!(PaymentStatus::HeldInEscrow.blocks_new_order());
        assert!(!PaymentStatus::Failed.blocks_new_order());
    }

    #[test]
    fn test_due_for_auto_release_strictly_after() {
        let mut p = payment();
        let now = Utc::now();

        // Pending payments are never due
        p.escrow.auto_release_date = Some(now - Duration::days(1));
        assert!(!p.due_for_auto_release(now));

        p.status = PaymentStatus::HeldInEscrow;
        assert!(p.due_for_auto_release(now));

        // Exactly at the date: not yet due
        p.escrow.auto_release_date = Some(now);
        assert!(!p.due_for_auto_release(now));

        p.escrow.auto_release_date = Some(now + Duration::days(7));
        assert!(!p.due_for_auto_release(now));
    }

    #[test]
    fn test_release_conditions() {
        let mut c = ReleaseConditions::default();
        assert!(!c.all_met());
        c.delivery_confirmed = true;
        assert!(!c.all_met());
        c.quality_approved = true;
        assert!(c.all_met());
    }
}
