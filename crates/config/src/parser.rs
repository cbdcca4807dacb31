use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WastexConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    // Perform environment variable substitution
    let substituted = substitution::substitute_env_vars(&content)?;
    debug!("Environment variable substitution completed");

    // Parse YAML
    let config: WastexConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> WastexConfig {
    WastexConfig {
        platform: PlatformConfig {
            name: "WasteX".to_string(),
            description: "Industrial waste trading platform".to_string(),
            version: "1.0.0".to_string(),
            currency: default_currency(),
        },
        matching: MatchingConfig::default(),
        escrow: EscrowConfig::default(),
        ledger: LedgerConfig {
            base_url: "http://localhost:8545".to_string(),
            timeout_secs: default_timeout_secs(),
        },
        payment_gateway: PaymentGatewayConfig {
            base_url: "https://api.payments.example.com".to_string(),
            key_id: "${WASTEX_GATEWAY_KEY_ID}".to_string(),
            key_secret: "${WASTEX_GATEWAY_KEY_SECRET}".to_string(),
            timeout_secs: default_timeout_secs(),
        },
        server: ServerSettings::default(),
    }
}

pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(
    config: &WastexConfig,
    path: P,
) -> Result<()> {
    let yaml =
        serde_yaml::to_string(config).with_context(|| "Failed to serialize configuration")?;

    fs::write(&path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved to: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid_yaml() {
        let config = generate_default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: WastexConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.platform.name, "WasteX");
        assert_eq!(parsed.matching.max_results, 10);
        assert_eq!(parsed.escrow.auto_release_days, 7);
    }

    #[test]
    fn test_minimal_config_applies_defaults() {
        let yaml = r#"
platform:
  name: WasteX
  description: test
  version: 1.0.0
ledger:
  base_url: http://localhost:8545
payment_gateway:
  base_url: https://gw.example.com
  key_id: key
  key_secret: secret
"#;
        let config: WastexConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.platform.currency, "INR");
        assert_eq!(config.matching.min_quantity_ratio, 0.5);
        assert_eq!(config.matching.max_price_ratio, 1.2);
        assert_eq!(config.escrow.sweep_interval_secs, 60);
        assert_eq!(config.ledger.timeout_secs, 10);
        assert_eq!(config.server.metrics_port, 9090);
    }
}
