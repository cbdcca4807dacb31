use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Top-level configuration for the WasteX deal lifecycle engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WastexConfig {
    pub platform: PlatformConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub escrow: EscrowConfig,
    pub ledger: LedgerConfig,
    #[serde(rename = "payment_gateway")]
    pub payment_gateway: PaymentGatewayConfig,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformConfig {
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Matching engine thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingConfig {
    /// Maximum number of candidates returned per request
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Listings must offer at least this fraction of the requested quantity
    #[serde(default = "default_min_quantity_ratio")]
    pub min_quantity_ratio: f64,
    /// Listings priced above budget × this ratio are filtered out
    #[serde(default = "default_max_price_ratio")]
    pub max_price_ratio: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            min_quantity_ratio: default_min_quantity_ratio(),
            max_price_ratio: default_max_price_ratio(),
        }
    }
}

/// Escrow behavior settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EscrowConfig {
    /// Days after funds are held before timeout release becomes eligible
    #[serde(default = "default_auto_release_days")]
    pub auto_release_days: i64,
    /// Interval of the auto-release reconciliation sweep
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            auto_release_days: default_auto_release_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// External ledger service endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// External payment gateway endpoint and credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentGatewayConfig {
    pub base_url: String,
    pub key_id: String,
    /// Shared secret for keyed-hash verification of gateway callbacks
    pub key_secret: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            metrics_port: default_metrics_port(),
        }
    }
}
