use crate::*;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ConfigValidationError {
    #[error("Platform name is required")]
    MissingPlatformName,

    #[error("Platform description is required")]
    MissingPlatformDescription,

    #[error("Invalid version format: {0}. Must be in format X.Y.Z (e.g., 1.0.0)")]
    InvalidVersionFormat(String),

    #[error("Invalid currency code: {0}. Must be a 3-letter code (e.g., INR)")]
    InvalidCurrency(String),

    #[error("Matching: {message}")]
    InvalidMatching { message: String },

    #[error("Escrow: {message}")]
    InvalidEscrow { message: String },

    #[error("Invalid {service} base URL '{url}': must start with http:// or https://")]
    InvalidBaseUrl { service: String, url: String },

    #[error("Payment gateway credential '{field}' is missing or unresolved")]
    MissingGatewayCredential { field: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ConfigValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: impl ToString) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

/// Validate a loaded configuration, collecting every problem instead of
/// failing on the first one.
pub fn validate_config(config: &WastexConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_platform(&config.platform, &mut report);
    validate_matching(&config.matching, &mut report);
    validate_escrow(&config.escrow, &mut report);
    validate_endpoints(config, &mut report);

    report
}

fn validate_platform(platform: &PlatformConfig, report: &mut ValidationReport) {
    if platform.name.trim().is_empty() {
        report.add_error(ConfigValidationError::MissingPlatformName);
    }

    if platform.description.trim().is_empty() {
        report.add_error(ConfigValidationError::MissingPlatformDescription);
    }

    let version_re = Regex::new(r"^\d+\.\d+\.\d+$").unwrap();
    if !version_re.is_match(&platform.version) {
        report.add_error(ConfigValidationError::InvalidVersionFormat(
            platform.version.clone(),
        ));
    }

    if platform.currency.len() != 3 || !platform.currency.chars().all(|c| c.is_ascii_alphabetic())
    {
        report.add_error(ConfigValidationError::InvalidCurrency(
            platform.currency.clone(),
        ));
    }
}

fn validate_matching(matching: &MatchingConfig, report: &mut ValidationReport) {
    if matching.max_results == 0 {
        report.add_error(ConfigValidationError::InvalidMatching {
            message: "max_results must be at least 1".to_string(),
        });
    }

    if !(matching.min_quantity_ratio > 0.0 && matching.min_quantity_ratio <= 1.0) {
        report.add_error(ConfigValidationError::InvalidMatching {
            message: format!(
                "min_quantity_ratio must be in (0, 1], got {}",
                matching.min_quantity_ratio
            ),
        });
    }

    if matching.max_price_ratio < 1.0 {
        report.add_error(ConfigValidationError::InvalidMatching {
            message: format!(
                "max_price_ratio must be at least 1.0, got {}",
                matching.max_price_ratio
            ),
        });
    }

    if matching.max_results > 10 {
        report.add_warning(
            "matching.max_results",
            "values above 10 return more candidates than clients typically display",
        );
    }
}

fn validate_escrow(escrow: &EscrowConfig, report: &mut ValidationReport) {
    if escrow.auto_release_days < 1 {
        report.add_error(ConfigValidationError::InvalidEscrow {
            message: format!(
                "auto_release_days must be at least 1, got {}",
                escrow.auto_release_days
            ),
        });
    }

    if escrow.sweep_interval_secs == 0 {
        report.add_error(ConfigValidationError::InvalidEscrow {
            message: "sweep_interval_secs must be at least 1".to_string(),
        });
    }

    if escrow.sweep_interval_secs > 3600 {
        report.add_warning(
            "escrow.sweep_interval_secs",
            "sweep intervals above an hour delay timeout-based release noticeably",
        );
    }
}

fn validate_endpoints(config: &WastexConfig, report: &mut ValidationReport) {
    for (service, url) in [
        ("ledger", &config.ledger.base_url),
        ("payment_gateway", &config.payment_gateway.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            report.add_error(ConfigValidationError::InvalidBaseUrl {
                service: service.to_string(),
                url: url.clone(),
            });
        }
    }

    for (field, value) in [
        ("key_id", &config.payment_gateway.key_id),
        ("key_secret", &config.payment_gateway.key_secret),
    ] {
        if value.trim().is_empty() || has_unresolved_env_vars(value) {
            report.add_error(ConfigValidationError::MissingGatewayCredential {
                field: field.to_string(),
            });
        }
    }

    if config.ledger.timeout_secs == 0 || config.payment_gateway.timeout_secs == 0 {
        report.add_warning(
            "timeout_secs",
            "a zero timeout disables bounded waits on external calls",
        );
    }
}
