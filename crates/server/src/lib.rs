//! Server infrastructure for WasteX
//!
//! This crate provides the HTTP server implementation with unified
//! lifecycle management and graceful shutdown.
//!
//! # Architecture
//!
//! All long-running components implement the [`Server`] trait, which
//! provides a consistent interface for running and monitoring them. The
//! [`ServerExt`] trait provides convenience methods like `spawn()` and
//! `run_with_ctrl_c()`.
//!
//! Shutdown coordination uses `CancellationToken` from `tokio_util`, allowing
//! hierarchical shutdown where cancelling a parent token automatically cancels
//! all child tokens.
//!
//! # Quick Start
//!
//! ```ignore
//! use server::{AppServer, ServerConfig, Server, ServerExt};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::for_service("gateway");
//!     let server = AppServer::new("gateway", config, router);
//!
//!     // Run with Ctrl+C handling
//!     server.run_with_ctrl_c().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`] - Server configuration and port constants
//! - [`traits`] - `Server` and `ServerExt` traits
//! - [`http`] - HTTP server using Axum
//! - [`health`] - Health check endpoints and client
//! - [`shutdown`] - Graceful shutdown utilities

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

// Core modules
pub mod config;
pub mod error;
pub mod shutdown;
pub mod traits;

// Server implementations
pub mod health;
pub mod http;
pub mod port_validator;

// Re-exports for convenience
pub use config::{ports, ServerConfig};
pub use error::{Result, ServerError};
pub use health::{HealthClient, HealthState, HealthStatus};
pub use http::HttpServer;
pub use port_validator::validate_ports_available;
pub use shutdown::{shutdown_signal, ShutdownController};
pub use traits::{Server, ServerExt};

/// Application server coordinating the HTTP surface and background workers
///
/// This struct runs the HTTP server alongside any registered background
/// workers (such as the escrow auto-release sweep) and provides unified
/// startup and shutdown handling using `CancellationToken`.
///
/// # Example
///
/// ```ignore
/// use server::{AppServer, ServerConfig, Server, ServerExt};
///
/// let config = ServerConfig::for_service("gateway");
/// let mut server = AppServer::new("gateway", config, router);
/// server.add_worker(Arc::new(sweeper));
///
/// // Option 1: Run with Ctrl+C handling
/// server.run_with_ctrl_c().await?;
///
/// // Option 2: Manual control
/// let (handle, token) = server.spawn();
/// // ... later ...
/// token.cancel();
/// handle.await??;
/// ```
pub struct AppServer {
    name: String,
    config: ServerConfig,
    http_server: Option<HttpServer>,
    workers: Vec<Arc<dyn Server>>,
}

impl AppServer {
    /// Create a new application server with a custom HTTP router
    pub fn new(name: impl Into<String>, config: ServerConfig, router: axum::Router) -> Self {
        let http_server = config
            .http_port
            .map(|_| HttpServer::new(config.clone(), router));

        Self {
            name: name.into(),
            config,
            http_server,
            workers: Vec::new(),
        }
    }

    /// Create a simple ping/health server with the default config for a service
    pub fn ping_server(service_name: impl Into<String>) -> Self {
        let service_name = service_name.into();
        let config = ServerConfig::for_service(&service_name);
        Self::ping_server_with_config(service_name, config)
    }

    /// Create a simple ping/health server with a custom config
    pub fn ping_server_with_config(service_name: impl Into<String>, config: ServerConfig) -> Self {
        let service_name = service_name.into();
        let service_name_clone = service_name.clone();

        // HTTP router with health endpoint
        let router = axum::Router::new()
            .route(
                "/health",
                axum::routing::get(health::simple_health_handler),
            )
            .route(
                "/",
                axum::routing::get(move || async move { format!("{} Service", service_name_clone) }),
            );

        Self::new(service_name, config, router)
    }

    /// Register a background worker to run alongside the HTTP server
    pub fn add_worker(&mut self, worker: Arc<dyn Server>) {
        self.workers.push(worker);
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Validate that all configured ports are available
    pub async fn validate_ports(&self) -> Result<()> {
        validate_ports_available(&self.config).await
    }
}

#[async_trait::async_trait]
impl Server for AppServer {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Option<std::net::SocketAddr> {
        self.http_server.as_ref().and_then(|s| s.address())
    }

    fn is_running(&self) -> bool {
        self.http_server
            .as_ref()
            .map(|s| s.is_running())
            .unwrap_or(false)
            || self.workers.iter().any(|w| w.is_running())
    }

    async fn run(&self, shutdown_token: CancellationToken) -> Result<()> {
        info!(server = %self.name, "Starting application server...");

        let mut handles: Vec<tokio::task::JoinHandle<Result<()>>> = Vec::new();

        // Start HTTP server if configured
        if let Some(ref http) = self.http_server {
            let http = http.clone();
            let token = shutdown_token.child_token();
            if let Some(port) = self.config.http_port {
                info!(port, "Starting HTTP server");
            }
            handles.push(tokio::spawn(async move { http.run(token).await }));
        }

        // Start background workers
        for worker in &self.workers {
            let worker = Arc::clone(worker);
            let token = shutdown_token.child_token();
            info!(worker = worker.name(), "Starting background worker");
            handles.push(tokio::spawn(async move { worker.run(token).await }));
        }

        if handles.is_empty() {
            warn!("No servers configured to start");
            return Ok(());
        }

        info!(server = %self.name, "All server components started");

        // Wait for either:
        // 1. The shutdown token to be cancelled, OR
        // 2. Any component to exit unexpectedly
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                info!("Shutdown signal received");
            }
            result = wait_for_first_completion(&mut handles) => {
                match result {
                    Some(Ok(Ok(()))) => {
                        warn!("A component exited unexpectedly (but successfully)");
                    }
                    Some(Ok(Err(e))) => {
                        error!(%e, "A component exited with error");
                    }
                    Some(Err(e)) => {
                        error!(%e, "A component task panicked");
                    }
                    None => {}
                }
                // Cancel remaining components
                shutdown_token.cancel();
            }
        }

        // Wait for all components to shut down with a timeout
        info!("Waiting for all components to shut down...");
        let shutdown_timeout = std::time::Duration::from_secs(30);

        match tokio::time::timeout(shutdown_timeout, wait_for_all_completion(handles)).await {
            Ok(results) => {
                let errors: Vec<_> = results
                    .into_iter()
                    .filter_map(|r| match r {
                        Ok(Ok(())) => None,
                        Ok(Err(e)) => Some(e.to_string()),
                        Err(e) => Some(format!("Task panicked: {}", e)),
                    })
                    .collect();

                if errors.is_empty() {
                    info!(server = %self.name, "All components shut down successfully");
                } else {
                    warn!(?errors, "Some components had errors during shutdown");
                }
            }
            Err(_) => {
                warn!("Timed out waiting for components to shut down");
            }
        }

        info!(server = %self.name, "Application server shutdown complete");
        Ok(())
    }
}

/// Wait for the first handle to complete
async fn wait_for_first_completion(
    handles: &mut [tokio::task::JoinHandle<Result<()>>],
) -> Option<std::result::Result<Result<()>, tokio::task::JoinError>> {
    if handles.is_empty() {
        return None;
    }

    let (result, _index, _remaining) =
        futures::future::select_all(handles.iter_mut().map(Box::pin)).await;

    Some(result)
}

/// Wait for all handles to complete
async fn wait_for_all_completion(
    handles: Vec<tokio::task::JoinHandle<Result<()>>>,
) -> Vec<std::result::Result<Result<()>, tokio::task::JoinError>> {
    futures::future::join_all(handles).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_server_config() {
        let config = ServerConfig::http_only("127.0.0.1", 8080);

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.http_port, Some(8080));
        assert!(config.has_servers());
    }

    #[test]
    fn test_server_config_for_service() {
        let config = ServerConfig::for_service("gateway");
        assert_eq!(config.http_port, Some(8080));

        let config = ServerConfig::for_service("negotiation");
        assert_eq!(config.http_port, Some(8082));

        let config = ServerConfig::for_service("escrow");
        assert_eq!(config.http_port, Some(8084));
    }

    #[tokio::test]
    async fn test_app_server_shutdown() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            http_port: Some(0), // Use ephemeral port
        };

        let server = AppServer::ping_server_with_config("test", config);
        let (handle, token) = server.spawn();

        // Give server time to start
        tokio::time::sleep(Duration::from_millis(200)).await;

        // Trigger shutdown
        token.cancel();

        // Wait for server to stop
        let result = tokio::time::timeout(Duration::from_secs(10), handle).await;

        assert!(result.is_ok(), "Server should shutdown within timeout");
    }
}
