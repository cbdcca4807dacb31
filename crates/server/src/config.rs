//! Server configuration
//!
//! This module provides server configuration types and port constants
//! for all WasteX services.

use crate::error::{Result, ServerError};
use std::net::SocketAddr;

/// Standard HTTP port assignments for each service
///
/// These are the default ports used by each service. The monolith serves
/// everything on the gateway port; split deployments use one port per
/// engine.
pub mod ports {
    /// Gateway / monolith HTTP port
    pub const GATEWAY_HTTP: u16 = 8080;
    /// Matching engine HTTP port
    pub const MATCHING_HTTP: u16 = 8081;
    /// Negotiation channel HTTP port
    pub const NEGOTIATION_HTTP: u16 = 8082;
    /// Contract lifecycle HTTP port
    pub const CONTRACTS_HTTP: u16 = 8083;
    /// Escrow payments HTTP port
    pub const ESCROW_HTTP: u16 = 8084;

    /// Get the HTTP port for a service by name
    pub fn for_service(name: &str) -> u16 {
        match name.to_lowercase().as_str() {
            "gateway" | "monolith" => GATEWAY_HTTP,
            "matching" => MATCHING_HTTP,
            "negotiation" => NEGOTIATION_HTTP,
            "contracts" => CONTRACTS_HTTP,
            "escrow" => ESCROW_HTTP,
            _ => GATEWAY_HTTP,
        }
    }
}

/// Server configuration
///
/// # Example
///
/// ```
/// use server::config::ServerConfig;
///
/// let config = ServerConfig::http_only("127.0.0.1", 8080);
///
/// // For a specific service
/// let config = ServerConfig::for_service("escrow");
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Optional HTTP port
    pub http_port: Option<u16>,
}

impl ServerConfig {
    /// Create a server config for HTTP
    pub fn http_only(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            http_port: Some(port),
        }
    }

    /// Create a server config for a specific service with its default port
    ///
    /// Uses the port assignments from the [`ports`] module.
    pub fn for_service(service_name: &str) -> Self {
        Self::http_only("0.0.0.0", ports::for_service(service_name))
    }

    /// Get the HTTP socket address
    pub fn http_addr(&self) -> Option<Result<SocketAddr>> {
        self.http_port.map(|p| self.parse_addr(p))
    }

    /// Check if any servers are configured
    pub fn has_servers(&self) -> bool {
        self.http_port.is_some()
    }

    /// Parse an address from host and port
    fn parse_addr(&self, port: u16) -> Result<SocketAddr> {
        format!("{}:{}", self.host, port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, port)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: Some(ports::GATEWAY_HTTP),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_http_only() {
        let config = ServerConfig::http_only("127.0.0.1", 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.http_port, Some(8080));
        assert!(config.has_servers());
    }

    #[test]
    fn test_server_config_for_service() {
        let config = ServerConfig::for_service("gateway");
        assert_eq!(config.http_port, Some(8080));

        let config = ServerConfig::for_service("contracts");
        assert_eq!(config.http_port, Some(8083));

        let config = ServerConfig::for_service("escrow");
        assert_eq!(config.http_port, Some(8084));
    }

    #[test]
    fn test_ports_for_service() {
        assert_eq!(ports::for_service("matching"), 8081);
        assert_eq!(ports::for_service("MATCHING"), 8081); // case insensitive
        assert_eq!(ports::for_service("negotiation"), 8082);
        assert_eq!(ports::for_service("unknown"), 8080); // defaults to gateway
    }
}
