//! Port validation utilities
//!
//! Note: Port validation before binding has an inherent TOCTOU (time-of-check-time-of-use)
//! race condition. Between checking and actually binding, another process could take the port.
//! These utilities are useful for early feedback but should not be relied upon for correctness.
//! The actual bind operation is the source of truth.

use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Validate that all configured ports are available
///
/// This performs an async check of port availability. Note that there's a race condition
/// between checking and actually binding - another process could grab the port in between.
/// This is useful for early user feedback but the actual bind is what matters.
pub async fn validate_ports_available(config: &ServerConfig) -> Result<()> {
    info!("Validating server ports...");

    let Some(port) = config.http_port else {
        warn!("No ports configured for server");
        return Ok(());
    };

    validate_single_port(&config.host, port, "HTTP").await?;

    info!("All server ports validated successfully");
    Ok(())
}

/// Validate a single port is available
async fn validate_single_port(host: &str, port: u16, protocol: &str) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    debug!("Checking {} port {}", protocol, port);

    match TcpListener::bind(&addr).await {
        Ok(listener) => {
            let local_addr = listener
                .local_addr()
                .map_err(|e| ServerError::bind(addr.clone(), e))?;

            // Drop the listener to release the port
            drop(listener);

            info!("{} port {} is available ({})", protocol, port, local_addr);
            Ok(())
        }
        Err(e) => {
            error!("{} port {} is NOT available: {}", protocol, port, e);
            Err(ServerError::port_in_use(port, e.to_string()))
        }
    }
}

/// Check if a port is in use (async version)
///
/// Returns `true` if the port appears to be in use, `false` if it's available.
/// Note: This is subject to TOCTOU race conditions.
pub async fn is_port_in_use(host: &str, port: u16) -> bool {
    let addr = format!("{}:{}", host, port);
    TcpListener::bind(&addr).await.is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ephemeral_port_available() {
        let config = ServerConfig::http_only("127.0.0.1", 0);
        assert!(validate_ports_available(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_occupied_port_detected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(is_port_in_use("127.0.0.1", port).await);

        let config = ServerConfig::http_only("127.0.0.1", port);
        let result = validate_ports_available(&config).await;
        assert!(matches!(result, Err(ServerError::PortInUse { .. })));
    }
}
