//! PostgreSQL contract store implementation
//!
//! Nested structures (terms, signatures, ledger record, audit log) are
//! stored as serialized JSON text; the concurrency-sensitive operations
//! map onto a transactional sequence upsert and a conditional signature
//! update.

use async_trait::async_trait;
use sqlx::{postgres::PgPool, Row};
use std::sync::Arc;

use common::{ContractId, PartyRole, UserId};

use crate::error::{ContractError, Result};
use crate::store::traits::ContractStore;
use crate::types::{Contract, SignatureRecord};

/// PostgreSQL contract store
pub struct PostgresContractStore {
    pool: Arc<PgPool>,
}

impl PostgresContractStore {
    /// Create a new PostgreSQL contract store
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(|e| ContractError::Storage(e.to_string()))
    }

    fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T> {
        serde_json::from_str(raw).map_err(|e| ContractError::Storage(e.to_string()))
    }

    fn row_to_contract(&self, row: &sqlx::postgres::PgRow) -> Result<Contract> {
        use crate::types::ContractStatus;

        let status_str: String = row.get("status");
        let status = match status_str.as_str() {
            "draft" => ContractStatus::Draft,
            "pending" => ContractStatus::Pending,
            "signed" => ContractStatus::Signed,
            "executed" => ContractStatus::Executed,
            "completed" => ContractStatus::Completed,
            "cancelled" => ContractStatus::Cancelled,
            "disputed" => ContractStatus::Disputed,
            other => {
                return Err(ContractError::Storage(format!(
                    "unknown contract status '{}'",
                    other
                )))
            }
        };

        Ok(Contract {
            contract_id: ContractId::from_uuid(row.get("contract_id")),
            contract_number: row.get("contract_number"),
            negotiation_id: common::NegotiationId::from_uuid(row.get("negotiation_id")),
            seller: Self::from_json(row.get::<String, _>("seller").as_str())?,
            buyer: Self::from_json(row.get::<String, _>("buyer").as_str())?,
            terms: Self::from_json(row.get::<String, _>("terms").as_str())?,
            seller_signature: row
                .get::<Option<String>, _>("seller_signature")
                .map(|s| Self::from_json(&s))
                .transpose()?,
            buyer_signature: row
                .get::<Option<String>, _>("buyer_signature")
                .map(|s| Self::from_json(&s))
                .transpose()?,
            ledger: Self::from_json(row.get::<String, _>("ledger").as_str())?,
            status,
            audit: Self::from_json(row.get::<String, _>("audit").as_str())?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl ContractStore for PostgresContractStore {
    async fn create(&self, contract: Contract) -> Result<Contract> {
        sqlx::query(
            r#"
            INSERT INTO contracts (
                contract_id, contract_number, negotiation_id, seller, buyer,
                terms, seller_signature, buyer_signature, ledger, status,
                audit, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(contract.contract_id.0)
        .bind(&contract.contract_number)
        .bind(contract.negotiation_id.0)
        .bind(Self::to_json(&contract.seller)?)
        .bind(Self::to_json(&contract.buyer)?)
        .bind(Self::to_json(&contract.terms)?)
        .bind(
            contract
                .seller_signature
                .as_ref()
                .map(Self::to_json)
                .transpose()?,
        )
        .bind(
            contract
                .buyer_signature
                .as_ref()
                .map(Self::to_json)
                .transpose()?,
        )
        .bind(Self::to_json(&contract.ledger)?)
        .bind(contract.status.to_string())
        .bind(Self::to_json(&contract.audit)?)
        .bind(contract.created_at)
        .bind(contract.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| ContractError::Storage(e.to_string()))?;

        Ok(contract)
    }

    async fn get(&self, contract_id: ContractId) -> Result<Option<Contract>> {
        let result = sqlx::query("SELECT * FROM contracts WHERE contract_id = $1")
            .bind(contract_id.0)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| ContractError::Storage(e.to_string()))?;

        match result {
            Some(row) => Ok(Some(self.row_to_contract(&row)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, contract: &Contract) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE contracts SET
                seller_signature = $1,
                buyer_signature = $2,
                ledger = $3,
                status = $4,
                audit = $5,
                updated_at = $6
            WHERE contract_id = $7
            "#,
        )
        .bind(
            contract
                .seller_signature
                .as_ref()
                .map(Self::to_json)
                .transpose()?,
        )
        .bind(
            contract
                .buyer_signature
                .as_ref()
                .map(Self::to_json)
                .transpose()?,
        )
        .bind(Self::to_json(&contract.ledger)?)
        .bind(contract.status.to_string())
        .bind(Self::to_json(&contract.audit)?)
        .bind(contract.updated_at)
        .bind(contract.contract_id.0)
        .execute(&*self.pool)
        .await
        .map_err(|e| ContractError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ContractError::NotFound(format!(
                "contract {}",
                contract.contract_id
            )));
        }

        Ok(())
    }

    async fn next_sequence(&self, seller_code: &str, buyer_code: &str) -> Result<u32> {
        // Transactional increment: two simultaneous allocations for the
        // same pair serialize on the row and never return the same value.
        let row = sqlx::query(
            r#"
            INSERT INTO contract_sequences (seller_code, buyer_code, last_seq)
            VALUES ($1, $2, 1001)
            ON CONFLICT (seller_code, buyer_code)
            DO UPDATE SET last_seq = contract_sequences.last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(seller_code)
        .bind(buyer_code)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| ContractError::Storage(e.to_string()))?;

        let seq: i32 = row.get("last_seq");
        Ok(seq as u32)
    }

    async fn record_signature(
        &self,
        contract_id: ContractId,
        role: PartyRole,
        record: SignatureRecord,
    ) -> Result<Contract> {
        let column = match role {
            PartyRole::Seller => "seller_signature",
            PartyRole::Buyer => "buyer_signature",
        };

        // Conditional update: succeeds only while the slot is empty.
        let result = sqlx::query(&format!(
            "UPDATE contracts SET {col} = $1, updated_at = NOW() \
             WHERE contract_id = $2 AND {col} IS NULL",
            col = column
        ))
        .bind(Self::to_json(&record)?)
        .bind(contract_id.0)
        .execute(&*self.pool)
        .await
        .map_err(|e| ContractError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            // Distinguish an unknown contract from a duplicate signature
            return match self.get(contract_id).await? {
                Some(_) => Err(ContractError::Conflict(format!(
                    "{} has already signed contract {}",
                    role, contract_id
                ))),
                None => Err(ContractError::NotFound(format!(
                    "contract {}",
                    contract_id
                ))),
            };
        }

        self.get(contract_id)
            .await?
            .ok_or_else(|| ContractError::NotFound(format!("contract {}", contract_id)))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Contract>> {
        // Party user ids live inside the JSON party blobs
        let pattern = format!("%{}%", user_id);

        let rows = sqlx::query(
            "SELECT * FROM contracts \
             WHERE seller LIKE $1 OR buyer LIKE $1 \
             ORDER BY created_at DESC",
        )
        .bind(&pattern)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| ContractError::Storage(e.to_string()))?;

        rows.iter().map(|row| self.row_to_contract(row)).collect()
    }
}
