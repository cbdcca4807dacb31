//! Ledger client - trait and implementations
//!
//! The ledger is an opaque external attestation service. The client is
//! constructed once at startup and injected into the contract manager,
//! which keeps the manager testable against the mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::{ContractError, Result};

/// Result of deploying a contract record on the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerDeployment {
    /// Address of the deployed record
    pub address: String,
    /// Deployment transaction hash
    pub tx_hash: String,
}

/// A confirmed ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTx {
    /// Transaction hash
    pub tx_hash: String,
}

/// Client trait for the external ledger - protocol agnostic
///
/// Every call is a blocking round-trip with a bounded timeout; a returned
/// `Ok` means the ledger confirmed the transaction.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Deploy a contract record holding the given terms JSON
    async fn deploy(&self, terms_json: &str) -> Result<LedgerDeployment>;

    /// Submit the seller's signature transaction
    async fn sign_as_seller(&self, address: &str) -> Result<LedgerTx>;

    /// Submit the buyer's signature transaction
    async fn sign_as_buyer(&self, address: &str) -> Result<LedgerTx>;

    /// Whether the seller has signed on the ledger
    async fn seller_signed(&self, address: &str) -> Result<bool>;

    /// Whether the buyer has signed on the ledger
    async fn buyer_signed(&self, address: &str) -> Result<bool>;

    /// Whether the ledger reports the record as fully signed
    async fn is_fully_signed(&self, address: &str) -> Result<bool>;
}

// ==================== Mock Implementation ====================

#[derive(Default)]
struct MockRecord {
    seller_signed: bool,
    buyer_signed: bool,
}

/// Mock ledger client for testing
///
/// Tracks deployed records and their signature flags in memory, with
/// switches to simulate deploy/sign failures.
pub struct MockLedgerClient {
    records: RwLock<HashMap<String, MockRecord>>,
    fail_deploy: bool,
    fail_signing: bool,
}

impl MockLedgerClient {
    /// Create a new mock ledger client
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            fail_deploy: false,
            fail_signing: false,
        }
    }

    /// Configure deploy calls to fail
    pub fn with_deploy_failure(mut self, fail: bool) -> Self {
        self.fail_deploy = fail;
        self
    }

    /// Configure signing calls to fail
    pub fn with_signing_failure(mut self, fail: bool) -> Self {
        self.fail_signing = fail;
        self
    }

    /// Number of deployed records
    pub fn deployed_count(&self) -> usize {
        self.records.read().unwrap().len()
    }

    fn record<T>(&self, address: &str, f: impl FnOnce(&MockRecord) -> T) -> Result<T> {
        let records = self.records.read().unwrap();
        let record = records
            .get(address)
            .ok_or_else(|| ContractError::Ledger(format!("unknown ledger address {}", address)))?;
        Ok(f(record))
    }
}

impl Default for MockLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn deploy(&self, _terms_json: &str) -> Result<LedgerDeployment> {
        // Simulate some async delay
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        if self.fail_deploy {
            return Err(ContractError::Ledger(
                "deployment rejected by ledger".to_string(),
            ));
        }

        let address = format!("0x{}", Uuid::new_v4().simple());
        let tx_hash = format!("0x{}", Uuid::new_v4().simple());

        let mut records = self.records.write().unwrap();
        records.insert(address.clone(), MockRecord::default());

        Ok(LedgerDeployment { address, tx_hash })
    }

    async fn sign_as_seller(&self, address: &str) -> Result<LedgerTx> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        if self.fail_signing {
            return Err(ContractError::Ledger(
                "signing transaction rejected".to_string(),
            ));
        }

        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(address)
            .ok_or_else(|| ContractError::Ledger(format!("unknown ledger address {}", address)))?;
        record.seller_signed = true;

        Ok(LedgerTx {
            tx_hash: format!("0x{}", Uuid::new_v4().simple()),
        })
    }

    async fn sign_as_buyer(&self, address: &str) -> Result<LedgerTx> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        if self.fail_signing {
            return Err(ContractError::Ledger(
                "signing transaction rejected".to_string(),
            ));
        }

        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(address)
            .ok_or_else(|| ContractError::Ledger(format!("unknown ledger address {}", address)))?;
        record.buyer_signed = true;

        Ok(LedgerTx {
            tx_hash: format!("0x{}", Uuid::new_v4().simple()),
        })
    }

    async fn seller_signed(&self, address: &str) -> Result<bool> {
        self.record(address, |r| r.seller_signed)
    }

    async fn buyer_signed(&self, address: &str) -> Result<bool> {
        self.record(address, |r| r.buyer_signed)
    }

    async fn is_fully_signed(&self, address: &str) -> Result<bool> {
        self.record(address, |r| r.seller_signed && r.buyer_signed)
    }
}

// ==================== HTTP Implementation ====================

#[cfg(feature = "client")]
pub mod http {
    use async_trait::async_trait;
    use reqwest::Client;
    use std::time::Duration;

    use super::{LedgerClient, LedgerDeployment, LedgerTx};
    use crate::error::{ContractError, Result};

    /// HTTP-based ledger client
    pub struct HttpLedgerClient {
        client: Client,
        base_url: String,
    }

    impl HttpLedgerClient {
        /// Create a new HTTP ledger client with a bounded request timeout
        pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| ContractError::Ledger(e.to_string()))?;

            Ok(Self {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            })
        }

        async fn post_json<T: serde::de::DeserializeOwned>(
            &self,
            path: &str,
            body: serde_json::Value,
        ) -> Result<T> {
            let url = format!("{}{}", self.base_url, path);

            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| ContractError::Ledger(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                return Err(ContractError::Ledger(format!(
                    "ledger returned {}: {}",
                    status, error_text
                )));
            }

            response
                .json::<T>()
                .await
                .map_err(|e| ContractError::Ledger(e.to_string()))
        }

        async fn get_bool(&self, path: &str) -> Result<bool> {
            let url = format!("{}{}", self.base_url, path);

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| ContractError::Ledger(e.to_string()))?;

            if !response.status().is_success() {
                return Err(ContractError::Ledger(format!(
                    "ledger returned {}",
                    response.status()
                )));
            }

            response
                .json::<bool>()
                .await
                .map_err(|e| ContractError::Ledger(e.to_string()))
        }
    }

    #[async_trait]
    impl LedgerClient for HttpLedgerClient {
        async fn deploy(&self, terms_json: &str) -> Result<LedgerDeployment> {
            self.post_json(
                "/api/v1/contracts/deploy",
                serde_json::json!({ "terms": terms_json }),
            )
            .await
        }

        async fn sign_as_seller(&self, address: &str) -> Result<LedgerTx> {
            self.post_json(
                &format!("/api/v1/contracts/{}/sign-seller", address),
                serde_json::json!({}),
            )
            .await
        }

        async fn sign_as_buyer(&self, address: &str) -> Result<LedgerTx> {
            self.post_json(
                &format!("/api/v1/contracts/{}/sign-buyer", address),
                serde_json::json!({}),
            )
            .await
        }

        async fn seller_signed(&self, address: &str) -> Result<bool> {
            self.get_bool(&format!("/api/v1/contracts/{}/seller-signed", address))
                .await
        }

        async fn buyer_signed(&self, address: &str) -> Result<bool> {
            self.get_bool(&format!("/api/v1/contracts/{}/buyer-signed", address))
                .await
        }

        async fn is_fully_signed(&self, address: &str) -> Result<bool> {
            self.get_bool(&format!("/api/v1/contracts/{}/fully-signed", address))
                .await
        }
    }
}
