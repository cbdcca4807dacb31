//! Payment gateway client - trait and implementations
//!
//! The gateway is an opaque external service; the engine only opens
//! orders against it and verifies its callbacks.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::error::{EscrowError, Result};

/// Client trait for the payment gateway - protocol agnostic
#[async_trait]
pub trait PaymentGatewayClient: Send + Sync {
    /// Open an order with the gateway.
    ///
    /// Returns the gateway's order id. A blocking round-trip with a
    /// bounded timeout; on failure nothing is persisted locally.
    async fn create_order(&self, amount: f64, currency: &str, receipt: &str) -> Result<String>;
}

// ==================== Mock Implementation ====================

/// Mock payment gateway client for testing
pub struct MockPaymentGatewayClient {
    fail: bool,
    orders_created: AtomicUsize,
}

impl MockPaymentGatewayClient {
    /// Create a new mock gateway client
    pub fn new() -> Self {
        Self {
            fail: false,
            orders_created: AtomicUsize::new(0),
        }
    }

    /// Configure order creation to fail
    pub fn with_failure(mut self, fail: bool) -> Self {
        self.fail = fail;
        self
    }

    /// Number of orders opened
    pub fn orders_created(&self) -> usize {
        self.orders_created.load(Ordering::SeqCst)
    }
}

impl Default for MockPaymentGatewayClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGatewayClient for MockPaymentGatewayClient {
    async fn create_order(&self, amount: f64, _currency: &str, _receipt: &str) -> Result<String> {
        // Simulate some async delay
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        if self.fail {
            return Err(EscrowError::Gateway(
                "order creation rejected by gateway".to_string(),
            ));
        }

        if amount <= 0.0 {
            return Err(EscrowError::Gateway(
                "gateway rejects non-positive amounts".to_string(),
            ));
        }

        self.orders_created.fetch_add(1, Ordering::SeqCst);
        Ok(format!("order_{}", Uuid::new_v4().simple()))
    }
}

// ==================== HTTP Implementation ====================

#[cfg(feature = "client")]
pub mod http {
    use async_trait::async_trait;
    use reqwest::Client;
    use serde::Deserialize;
    use std::time::Duration;

    use super::PaymentGatewayClient;
    use crate::error::{EscrowError, Result};

    #[derive(Deserialize)]
    struct CreateOrderResponse {
        #[serde(rename = "id")]
        order_id: String,
    }

    /// HTTP-based payment gateway client
    pub struct HttpPaymentGatewayClient {
        client: Client,
        base_url: String,
        key_id: String,
        key_secret: String,
    }

    impl HttpPaymentGatewayClient {
        /// Create a new HTTP gateway client with a bounded request timeout
        pub fn new(
            base_url: &str,
            key_id: &str,
            key_secret: &str,
            timeout: Duration,
        ) -> Result<Self> {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| EscrowError::Gateway(e.to_string()))?;

            Ok(Self {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
                key_id: key_id.to_string(),
                key_secret: key_secret.to_string(),
            })
        }
    }

    #[async_trait]
    impl PaymentGatewayClient for HttpPaymentGatewayClient {
        async fn create_order(
            &self,
            amount: f64,
            currency: &str,
            receipt: &str,
        ) -> Result<String> {
            let url = format!("{}/v1/orders", self.base_url);

            let response = self
                .client
                .post(&url)
                .basic_auth(&self.key_id, Some(&self.key_secret))
                .json(&serde_json::json!({
                    "amount": amount,
                    "currency": currency,
                    "receipt": receipt,
                }))
                .send()
                .await
                .map_err(|e| EscrowError::Gateway(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                return Err(EscrowError::Gateway(format!(
                    "gateway returned {}: {}",
                    status, error_text
                )));
            }

            let body: CreateOrderResponse = response
                .json()
                .await
                .map_err(|e| EscrowError::Gateway(e.to_string()))?;

            Ok(body.order_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_creates_orders() {
        let client = MockPaymentGatewayClient::new();
        let order_id = client.create_order(45_000.0, "INR", "C-2026-ECO-GRN-1001").await.unwrap();
        assert!(order_id.starts_with("order_"));
        assert_eq!(client.orders_created(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let client = MockPaymentGatewayClient::new().with_failure(true);
        let result = client.create_order(45_000.0, "INR", "receipt").await;
        assert!(matches!(result, Err(EscrowError::Gateway(_))));
        assert_eq!(client.orders_created(), 0);
    }
}
