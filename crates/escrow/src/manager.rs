//! Escrow Manager - core business logic for payment custody and release

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use common::{Actor, ContractId, PaymentId};
use contracts::{ContractManager, ContractStatus};

use crate::clients::gateway::PaymentGatewayClient;
use crate::clients::shipment::ShipmentClient;
use crate::error::{EscrowError, Result};
use crate::fee;
use crate::signature;
use crate::store::traits::PaymentStore;
use crate::types::{Payment, PaymentStatus, TimelineEntry};

/// Escrow behavior settings
#[derive(Debug, Clone)]
pub struct EscrowSettings {
    /// Settlement currency
    pub currency: String,
    /// Days after funds are held before timeout release becomes eligible
    pub auto_release_days: i64,
    /// Shared secret for gateway callback verification
    pub key_secret: String,
}

impl EscrowSettings {
    pub fn new(key_secret: impl Into<String>) -> Self {
        Self {
            currency: "INR".to_string(),
            auto_release_days: 7,
            key_secret: key_secret.into(),
        }
    }

    pub fn with_auto_release_days(mut self, days: i64) -> Self {
        self.auto_release_days = days;
        self
    }
}

/// Escrow Manager - drives the payment state machine and, through it, the
/// contract's executed/completed transitions
pub struct EscrowManager {
    store: Arc<dyn PaymentStore>,
    gateway: Arc<dyn PaymentGatewayClient>,
    shipment: Arc<dyn ShipmentClient>,
    contracts: Arc<ContractManager>,
    settings: EscrowSettings,
}

impl EscrowManager {
    /// Create a new EscrowManager
    pub fn new(
        store: Arc<dyn PaymentStore>,
        gateway: Arc<dyn PaymentGatewayClient>,
        shipment: Arc<dyn ShipmentClient>,
        contracts: Arc<ContractManager>,
        settings: EscrowSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            shipment,
            contracts,
            settings,
        }
    }

    /// Open an escrow order for a signed contract.
    ///
    /// Flow:
    /// 1. The caller must be the contract's buyer; the contract must be
    ///    signed
    /// 2. The fee split is computed from the tier table and frozen
    /// 3. The gateway order is opened (blocking round-trip; a failure
    ///    persists nothing)
    /// 4. The payment persists as pending; the store enforces at most one
    ///    live payment per contract
    pub async fn create_order(&self, actor: Actor, contract_id: ContractId) -> Result<Payment> {
        // Step 1: contract and authorization
        let contract = self
            .contracts
            .get(contract_id)
            .await
            .map_err(|e| EscrowError::Contract(e.to_string()))?
            .ok_or_else(|| EscrowError::NotFound(format!("contract {}", contract_id)))?;

        if contract.buyer.user_id != actor.user_id {
            return Err(EscrowError::Unauthorized(format!(
                "only the contract's buyer may open a payment, caller is {}",
                actor.user_id
            )));
        }

        if contract.status != ContractStatus::Signed {
            return Err(EscrowError::InvalidState(format!(
                "contract {} is {}, payments require signed",
                contract_id, contract.status
            )));
        }

        if let Some(existing) = self.store.get_live_by_contract(contract_id).await? {
            return Err(EscrowError::Conflict(format!(
                "contract {} already has payment {}",
                contract_id, existing.payment_id
            )));
        }

        // Step 2: frozen fee split
        let amount = fee::split_amount(contract.terms.total_value);

        // Step 3: gateway order
        let order_id = self
            .gateway
            .create_order(amount.total, &self.settings.currency, &contract.contract_number)
            .await?;

        // Step 4: persist pending
        let mut payment = Payment::new(contract_id, amount, &self.settings.currency, order_id);
        payment.timeline.push(TimelineEntry::new(
            "order_created",
            format!(
                "escrow order opened for {} {} ({} to seller, {} platform fee)",
                amount.total, self.settings.currency, amount.seller_amount, amount.platform_fee
            ),
        ));

        let payment = self.store.create(payment).await?;

        tracing::info!(
            payment_id = %payment.payment_id,
            contract_id = %contract_id,
            total = amount.total,
            "Escrow order created"
        );

        Ok(payment)
    }

    /// Verify a gateway payment callback.
    ///
    /// The expected signature is a keyed hash over the gateway order id
    /// and payment id. A mismatch marks the payment failed (the buyer
    /// must open a new order; there is no automatic retry) and leaves the
    /// contract untouched. A match moves funds into escrow, stamps the
    /// auto-release date, and drives the contract to executed - the only
    /// path by which a contract becomes executed.
    pub async fn verify(
        &self,
        payment_id: PaymentId,
        gateway_payment_id: &str,
        supplied_signature: &str,
    ) -> Result<Payment> {
        let mut payment = self.get_required(payment_id).await?;

        if payment.status != PaymentStatus::Pending {
            return Err(EscrowError::InvalidState(format!(
                "payment {} is {}, verification requires pending",
                payment_id, payment.status
            )));
        }

        let valid = signature::verify_signature(
            &self.settings.key_secret,
            &payment.gateway.order_id,
            gateway_payment_id,
            supplied_signature,
        );

        if !valid {
            payment.status = PaymentStatus::Failed;
            payment.timeline.push(TimelineEntry::new(
                "verification_failed",
                "gateway signature mismatch".to_string(),
            ));
            payment.updated_at = Utc::now();
            self.store.update(&payment).await?;

            tracing::warn!(payment_id = %payment_id, "Payment signature mismatch");

            return Err(EscrowError::VerificationFailed(format!(
                "signature mismatch for payment {}; open a new order to retry",
                payment_id
            )));
        }

        let held_at = Utc::now();
        payment.status = PaymentStatus::HeldInEscrow;
        payment.gateway.payment_id = Some(gateway_payment_id.to_string());
        payment.gateway.signature_verified = true;
        payment.escrow.held_at = Some(held_at);
        payment.escrow.auto_release_date =
            Some(held_at + Duration::days(self.settings.auto_release_days));
        payment.timeline.push(TimelineEntry::new(
            "held_in_escrow",
            format!(
                "funds held; auto-release after {} days",
                self.settings.auto_release_days
            ),
        ));
        payment.updated_at = held_at;
        self.store.update(&payment).await?;

        self.contracts
            .mark_executed(payment.contract_id)
            .await
            .map_err(|e| EscrowError::Contract(e.to_string()))?;

        tracing::info!(
            payment_id = %payment_id,
            contract_id = %payment.contract_id,
            "Payment verified and held in escrow"
        );

        Ok(payment)
    }

    /// Record the buyer's delivery confirmation.
    ///
    /// Shipment evidence overrides the passed flag: a shipment reported
    /// as delivered forces the delivery condition true. The quality flag
    /// is always recorded as supplied. When both release conditions hold
    /// the escrow releases immediately.
    pub async fn confirm_delivery(
        &self,
        actor: Actor,
        payment_id: PaymentId,
        delivery_confirmed: bool,
        quality_approved: bool,
    ) -> Result<Payment> {
        let mut payment = self.get_required(payment_id).await?;

        let contract = self
            .contracts
            .get(payment.contract_id)
            .await
            .map_err(|e| EscrowError::Contract(e.to_string()))?
            .ok_or_else(|| {
                EscrowError::NotFound(format!("contract {}", payment.contract_id))
            })?;

        if contract.buyer.user_id != actor.user_id {
            return Err(EscrowError::Unauthorized(format!(
                "only the contract's buyer may confirm delivery, caller is {}",
                actor.user_id
            )));
        }

        if payment.status != PaymentStatus::HeldInEscrow {
            return Err(EscrowError::InvalidState(format!(
                "payment {} is {}, delivery confirmation requires held_in_escrow",
                payment_id, payment.status
            )));
        }

        let mut delivery = delivery_confirmed;
        if let Some(status) = self.shipment.status_for_contract(payment.contract_id).await? {
            if status.is_delivered() {
                delivery = true;
            }
        }

        payment.escrow.release_conditions.delivery_confirmed = delivery;
        payment.escrow.release_conditions.quality_approved = quality_approved;
        payment.timeline.push(TimelineEntry::new(
            "delivery_confirmation",
            format!(
                "delivery_confirmed={}, quality_approved={}",
                delivery, quality_approved
            ),
        ));
        payment.updated_at = Utc::now();
        self.store.update(&payment).await?;

        if payment.escrow.release_conditions.all_met() {
            return self.release_held(payment, "release conditions met").await;
        }

        Ok(payment)
    }

    /// Release escrow to the seller. Admin actors only; the timeout path
    /// goes through [`release_due`](Self::release_due).
    ///
    /// Idempotent in the safe direction: releasing an already-released
    /// payment is rejected with an explicit error and transfers nothing.
    pub async fn release(&self, actor: Actor, payment_id: PaymentId) -> Result<Payment> {
        if !actor.admin {
            return Err(EscrowError::Unauthorized(
                "manual release requires an admin actor".to_string(),
            ));
        }

        let payment = self.get_required(payment_id).await?;

        if payment.status == PaymentStatus::ReleasedToSeller {
            return Err(EscrowError::InvalidState(format!(
                "payment {} already released",
                payment_id
            )));
        }

        if payment.status != PaymentStatus::HeldInEscrow {
            return Err(EscrowError::InvalidState(format!(
                "payment {} is {}, release requires held_in_escrow",
                payment_id, payment.status
            )));
        }

        self.release_held(payment, "released by admin").await
    }

    /// Refund escrow to the buyer. Admin actors only, from held_in_escrow.
    ///
    /// The contract is not touched; disputing or cancelling it is a
    /// separate action by its parties.
    pub async fn refund(
        &self,
        actor: Actor,
        payment_id: PaymentId,
        reason: &str,
    ) -> Result<Payment> {
        if !actor.admin {
            return Err(EscrowError::Unauthorized(
                "refund requires an admin actor".to_string(),
            ));
        }

        let mut payment = self.get_required(payment_id).await?;

        if payment.status != PaymentStatus::HeldInEscrow {
            return Err(EscrowError::InvalidState(format!(
                "payment {} is {}, refund requires held_in_escrow",
                payment_id, payment.status
            )));
        }

        let now = Utc::now();
        payment.status = PaymentStatus::Refunded;
        payment.escrow.refunded_at = Some(now);
        payment
            .timeline
            .push(TimelineEntry::new("refunded", reason.to_string()));
        payment.updated_at = now;
        self.store.update(&payment).await?;

        tracing::info!(payment_id = %payment_id, %reason, "Payment refunded");

        Ok(payment)
    }

    /// Release every held payment whose auto-release date has passed.
    ///
    /// Called by the periodic sweep; a failure on one payment is logged
    /// and does not stop the rest. Returns the number released.
    pub async fn release_due(&self, now: DateTime<Utc>) -> Result<usize> {
        let due = self.store.due_for_release(now).await?;
        let mut released = 0;

        for payment in due {
            let payment_id = payment.payment_id;
            match self.release_held(payment, "auto-released after timeout").await {
                Ok(_) => released += 1,
                Err(e) => {
                    tracing::warn!(payment_id = %payment_id, error = %e, "Auto-release failed");
                }
            }
        }

        Ok(released)
    }

    /// Get a payment by ID
    pub async fn get(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        self.store.get(payment_id).await
    }

    /// Get the live payment for a contract
    pub async fn get_by_contract(&self, contract_id: ContractId) -> Result<Option<Payment>> {
        self.store.get_live_by_contract(contract_id).await
    }

    /// Transition a held payment to released and complete its contract -
    /// the only path by which a contract becomes completed.
    async fn release_held(&self, mut payment: Payment, trigger: &str) -> Result<Payment> {
        // Paid out funds never exceed what was collected
        debug_assert!(payment.amount.seller_amount <= payment.amount.total);

        let now = Utc::now();
        payment.status = PaymentStatus::ReleasedToSeller;
        payment.escrow.released_at = Some(now);
        payment.timeline.push(TimelineEntry::new(
            "released_to_seller",
            format!("{} ({} to seller)", trigger, payment.amount.seller_amount),
        ));
        payment.updated_at = now;
        self.store.update(&payment).await?;

        self.contracts
            .mark_completed(payment.contract_id)
            .await
            .map_err(|e| EscrowError::Contract(e.to_string()))?;

        tracing::info!(
            payment_id = %payment.payment_id,
            contract_id = %payment.contract_id,
            seller_amount = payment.amount.seller_amount,
            trigger,
            "Escrow released to seller"
        );

        Ok(payment)
    }

    async fn get_required(&self, payment_id: PaymentId) -> Result<Payment> {
        self.store
            .get(payment_id)
            .await?
            .ok_or_else(|| EscrowError::NotFound(format!("payment {}", payment_id)))
    }
}
