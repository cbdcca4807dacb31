//! PostgreSQL payment store implementation
//!
//! The at-most-one-live-payment-per-contract guard is a partial unique
//! index on `contract_id` excluding failed payments; a unique violation
//! on insert maps to a conflict the caller can retry from a fresh read.
//! Nested structures are stored as serialized JSON text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPool, Row};
use std::sync::Arc;

use common::{ContractId, PaymentId};

use crate::error::{EscrowError, Result};
use crate::store::traits::PaymentStore;
use crate::types::{Payment, PaymentStatus};

/// PostgreSQL payment store
pub struct PostgresPaymentStore {
    pool: Arc<PgPool>,
}

impl PostgresPaymentStore {
    /// Create a new PostgreSQL payment store
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(|e| EscrowError::Storage(e.to_string()))
    }

    fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T> {
        serde_json::from_str(raw).map_err(|e| EscrowError::Storage(e.to_string()))
    }

    fn row_to_payment(&self, row: &sqlx::postgres::PgRow) -> Result<Payment> {
        let status_str: String = row.get("status");
        let status = match status_str.as_str() {
            "pending" => PaymentStatus::Pending,
            "held_in_escrow" => PaymentStatus::HeldInEscrow,
            "released_to_seller" => PaymentStatus::ReleasedToSeller,
            "refunded" => PaymentStatus::Refunded,
            "failed" => PaymentStatus::Failed,
            other => {
                return Err(EscrowError::Storage(format!(
                    "unknown payment status '{}'",
                    other
                )))
            }
        };

        Ok(Payment {
            payment_id: PaymentId::from_uuid(row.get("payment_id")),
            contract_id: ContractId::from_uuid(row.get("contract_id")),
            amount: Self::from_json(row.get::<String, _>("amount").as_str())?,
            currency: row.get("currency"),
            gateway: Self::from_json(row.get::<String, _>("gateway").as_str())?,
            escrow: Self::from_json(row.get::<String, _>("escrow").as_str())?,
            status,
            timeline: Self::from_json(row.get::<String, _>("timeline").as_str())?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    fn map_insert_error(contract_id: ContractId, e: sqlx::Error) -> EscrowError {
        if let sqlx::Error::Database(ref db) = e {
            // 23505 = unique_violation
            if db.code().as_deref() == Some("23505") {
                return EscrowError::Conflict(format!(
                    "contract {} already has a payment",
                    contract_id
                ));
            }
        }
        EscrowError::Storage(e.to_string())
    }
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn create(&self, payment: Payment) -> Result<Payment> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                payment_id, contract_id, amount, currency, gateway, escrow,
                status, timeline, auto_release_date, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(payment.payment_id.0)
        .bind(payment.contract_id.0)
        .bind(Self::to_json(&payment.amount)?)
        .bind(&payment.currency)
        .bind(Self::to_json(&payment.gateway)?)
        .bind(Self::to_json(&payment.escrow)?)
        .bind(payment.status.to_string())
        .bind(Self::to_json(&payment.timeline)?)
        .bind(payment.escrow.auto_release_date)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| Self::map_insert_error(payment.contract_id, e))?;

        Ok(payment)
    }

    async fn get(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        let result = sqlx::query("SELECT * FROM payments WHERE payment_id = $1")
            .bind(payment_id.0)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| EscrowError::Storage(e.to_string()))?;

        match result {
            Some(row) => Ok(Some(self.row_to_payment(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_live_by_contract(&self, contract_id: ContractId) -> Result<Option<Payment>> {
        let result = sqlx::query(
            "SELECT * FROM payments WHERE contract_id = $1 AND status != 'failed'",
        )
        .bind(contract_id.0)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| EscrowError::Storage(e.to_string()))?;

        match result {
            Some(row) => Ok(Some(self.row_to_payment(&row)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, payment: &Payment) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                gateway = $1,
                escrow = $2,
                status = $3,
                timeline = $4,
                auto_release_date = $5,
                updated_at = $6
            WHERE payment_id = $7
            "#,
        )
        .bind(Self::to_json(&payment.gateway)?)
        .bind(Self::to_json(&payment.escrow)?)
        .bind(payment.status.to_string())
        .bind(Self::to_json(&payment.timeline)?)
        .bind(payment.escrow.auto_release_date)
        .bind(payment.updated_at)
        .bind(payment.payment_id.0)
        .execute(&*self.pool)
        .await
        .map_err(|e| EscrowError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(EscrowError::NotFound(format!(
                "payment {}",
                payment.payment_id
            )));
        }

        Ok(())
    }

    async fn due_for_release(&self, now: DateTime<Utc>) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            "SELECT * FROM payments \
             WHERE status = 'held_in_escrow' AND auto_release_date < $1 \
             ORDER BY created_at ASC",
        )
        .bind(now)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| EscrowError::Storage(e.to_string()))?;

        rows.iter().map(|row| self.row_to_payment(row)).collect()
    }
}
