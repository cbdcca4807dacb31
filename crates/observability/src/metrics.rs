//! Prometheus metrics infrastructure
//!
//! This module provides utilities for initializing Prometheus metrics
//! and the counters tracked across the deal lifecycle.

use metrics::{counter, gauge, Counter, Gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter
///
/// This starts an HTTP server on the specified port that exposes metrics
/// at the `/metrics` endpoint.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Deal-lifecycle metrics
///
/// One instance is created per service and shared via `Arc`.
///
/// # Metrics
///
/// * `matches_recomputed_total` - Match list recomputations
/// * `negotiations_created_total` - Negotiations opened
/// * `contracts_created_total` - Contracts created
/// * `contracts_signed_total` - Contracts reaching fully-signed
/// * `ledger_failures_total` - Failed ledger round-trips
/// * `payments_created_total` - Escrow orders opened
/// * `payments_released_total` - Escrow releases (manual or auto)
/// * `payments_refunded_total` - Escrow refunds
/// * `payments_failed_total` - Failed payment verifications
/// * `payments_in_escrow` - Payments currently held
#[derive(Clone)]
pub struct LifecycleMetrics {
    matches_recomputed: Counter,
    negotiations_created: Counter,
    contracts_created: Counter,
    contracts_signed: Counter,
    ledger_failures: Counter,
    payments_created: Counter,
    payments_released: Counter,
    payments_refunded: Counter,
    payments_failed: Counter,
    payments_in_escrow: Gauge,
}

impl LifecycleMetrics {
    /// Create the lifecycle metric set for a service
    pub fn new(service_name: &str) -> Self {
        let name = service_name.to_string();

        Self {
            matches_recomputed: counter!("matches_recomputed_total", "service" => name.clone()),
            negotiations_created: counter!("negotiations_created_total", "service" => name.clone()),
            contracts_created: counter!("contracts_created_total", "service" => name.clone()),
            contracts_signed: counter!("contracts_signed_total", "service" => name.clone()),
            ledger_failures: counter!("ledger_failures_total", "service" => name.clone()),
            payments_created: counter!("payments_created_total", "service" => name.clone()),
            payments_released: counter!("payments_released_total", "service" => name.clone()),
            payments_refunded: counter!("payments_refunded_total", "service" => name.clone()),
            payments_failed: counter!("payments_failed_total", "service" => name.clone()),
            payments_in_escrow: gauge!("payments_in_escrow", "service" => name),
        }
    }

    pub fn match_recomputed(&self) {
        self.matches_recomputed.increment(1);
    }

    pub fn negotiation_created(&self) {
        self.negotiations_created.increment(1);
    }

    pub fn contract_created(&self) {
        self.contracts_created.increment(1);
    }

    pub fn contract_signed(&self) {
        self.contracts_signed.increment(1);
    }

    pub fn ledger_failure(&self) {
        self.ledger_failures.increment(1);
    }

    pub fn payment_created(&self) {
        self.payments_created.increment(1);
    }

    /// Record a payment entering escrow
    pub fn payment_held(&self) {
        self.payments_in_escrow.increment(1.0);
    }

    pub fn payment_released(&self) {
        self.payments_released.increment(1);
        self.payments_in_escrow.decrement(1.0);
    }

    pub fn payment_refunded(&self) {
        self.payments_refunded.increment(1);
        self.payments_in_escrow.decrement(1.0);
    }

    pub fn payment_failed(&self) {
        self.payments_failed.increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_metrics_creation() {
        // Just verify it doesn't panic
        let metrics = LifecycleMetrics::new("test");
        metrics.contract_created();
        metrics.payment_held();
        metrics.payment_released();
    }
}
