//! In-memory payment store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use common::{ContractId, PaymentId};

use crate::error::{EscrowError, Result};
use crate::store::traits::PaymentStore;
use crate::types::Payment;

/// In-memory payment store for testing and development
///
/// The at-most-one-live-payment-per-contract check runs under the write
/// lock, which gives the same atomicity the Postgres store gets from its
/// unique index.
#[derive(Default)]
pub struct InMemoryPaymentStore {
    payments: RwLock<HashMap<PaymentId, Payment>>,
}

impl InMemoryPaymentStore {
    /// Create a new in-memory payment store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create(&self, payment: Payment) -> Result<Payment> {
        let mut payments = self.payments.write().unwrap();

        let blocked = payments
            .values()
            .any(|p| p.contract_id == payment.contract_id && p.status.blocks_new_order());
        if blocked {
            return Err(EscrowError::Conflict(format!(
                "contract {} already has a payment",
                payment.contract_id
            )));
        }

        payments.insert(payment.payment_id, payment.clone());
        Ok(payment)
    }

    async fn get(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        let payments = self.payments.read().unwrap();
        Ok(payments.get(&payment_id).cloned())
    }

    async fn get_live_by_contract(&self, contract_id: ContractId) -> Result<Option<Payment>> {
        let payments = self.payments.read().unwrap();
        Ok(payments
            .values()
            .find(|p| p.contract_id == contract_id && p.status.blocks_new_order())
            .cloned())
    }

    async fn update(&self, payment: &Payment) -> Result<()> {
        let mut payments = self.payments.write().unwrap();
        if payments.contains_key(&payment.payment_id) {
            payments.insert(payment.payment_id, payment.clone());
            Ok(())
        } else {
            Err(EscrowError::NotFound(format!(
                "payment {}",
                payment.payment_id
            )))
        }
    }

    async fn due_for_release(&self, now: DateTime<Utc>) -> Result<Vec<Payment>> {
        let payments = self.payments.read().unwrap();
        let mut due: Vec<Payment> = payments
            .values()
            .filter(|p| p.due_for_auto_release(now))
            .cloned()
            .collect();
        due.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentAmount, PaymentStatus};
    use chrono::Duration;

    fn test_payment(contract_id: ContractId) -> Payment {
        Payment::new(
            contract_id,
            PaymentAmount {
                total: 45_000.0,
                seller_amount: 43_875.0,
                platform_fee: 1_125.0,
            },
            "INR",
            "order_123",
        )
    }

    #[tokio::test]
    async fn test_one_live_payment_per_contract() {
        let store = InMemoryPaymentStore::new();
        let contract_id = ContractId::new();

        store.create(test_payment(contract_id)).await.unwrap();

        // Second payment for the same contract is a conflict
        let result = store.create(test_payment(contract_id)).await;
        assert!(matches!(result, Err(EscrowError::Conflict(_))));

        // A different contract is fine
        store.create(test_payment(ContractId::new())).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_payment_does_not_block() {
        let store = InMemoryPaymentStore::new();
        let contract_id = ContractId::new();

        let mut payment = test_payment(contract_id);
        let id = payment.payment_id;
        store.create(payment.clone()).await.unwrap();

        payment.status = PaymentStatus::Failed;
        store.update(&payment).await.unwrap();

        assert!(store
            .get_live_by_contract(contract_id)
            .await
            .unwrap()
            .is_none());
        assert!(store.get(id).await.unwrap().is_some());

        // A replacement order can now be created
        store.create(test_payment(contract_id)).await.unwrap();
    }

    #[tokio::test]
    async fn test_due_for_release_filter() {
        let store = InMemoryPaymentStore::new();
        let now = Utc::now();

        let mut overdue = test_payment(ContractId::new());
        overdue.status = PaymentStatus::HeldInEscrow;
        overdue.escrow.auto_release_date = Some(now - Duration::hours(1));
        let overdue_id = overdue.payment_id;
        store.create(overdue).await.unwrap();

        let mut not_yet = test_payment(ContractId::new());
        not_yet.status = PaymentStatus::HeldInEscrow;
        not_yet.escrow.auto_release_date = Some(now + Duration::days(7));
        store.create(not_yet).await.unwrap();

        let due = store.due_for_release(now).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].payment_id, overdue_id);
    }
}
