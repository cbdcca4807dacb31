//! WasteX CLI and Server Binary
//!
//! This is the main entry point for the WasteX deal lifecycle engine.
//! It provides commands for initializing, validating, and starting the
//! platform in monolith or per-engine mode.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use cli::{Cli, Commands, DeploymentMode};
use common::InMemoryPartyDirectory;
use config::{generate_default_config, load_config, save_config, validate_config, WastexConfig};
use observability::{init_logging, LogFormat};
use server::{ports, AppServer, HealthState, Server, ServerConfig, ServerExt};

use contracts::{ContractManager, HttpLedgerClient, InMemoryContractStore};
use escrow::{
    EscrowManager, EscrowSettings, EscrowSweeper, HttpPaymentGatewayClient, InMemoryPaymentStore,
    MockShipmentClient,
};
use matching_engine::{InMemoryMatchingStore, MatchingEngine, MatchingService, ScoringConfig};
use negotiation::{InMemoryNegotiationStore, NegotiationService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging("wastex", LogFormat::Pretty)?;

    info!("WasteX starting...");

    let cli = Cli::parse_args();
    debug!(?cli, "CLI arguments parsed");

    match cli.command {
        Commands::Start { mode, config, http } => {
            info!("Executing 'start' command");
            start_platform(mode, config, http).await
        }
        Commands::Validate { config } => {
            info!("Executing 'validate' command");
            validate_command(config).await
        }
        Commands::Init { output } => {
            info!("Executing 'init' command");
            init_command(output).await
        }
    }
}

async fn start_platform<P: AsRef<Path>>(
    mode: DeploymentMode,
    config_path: P,
    http_override: Option<u16>,
) -> Result<()> {
    let config_path = config_path.as_ref();

    // Load and validate config
    let config = load_config(config_path)?;
    let report = validate_config(&config);

    // Log warnings
    if !report.warnings.is_empty() {
        warn!("Configuration warnings:");
        for warning in &report.warnings {
            warn!(field = %warning.field, message = %warning.message);
        }
    }

    // Check validation errors
    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start platform due to configuration errors");
    }

    let http_port = http_override.unwrap_or_else(|| ports::for_service(mode.as_str()));
    info!(mode = mode.as_str(), http_port, "Starting platform");

    // Metrics exporter
    if let Err(e) = observability::init_metrics(config.server.metrics_port) {
        warn!(error = %e, "Metrics exporter failed to start, continuing without it");
    }

    // Build the full engine stack; per-engine modes mount a subset of the
    // routes but share the same wiring
    let stack = build_stack(&config)?;

    let mut router = axum::Router::new().merge(server::health::health_routes(Arc::new(
        HealthState::new(mode.as_str()),
    )));

    let mount_matching = matches!(mode, DeploymentMode::Monolith | DeploymentMode::Matching);
    let mount_negotiation = matches!(mode, DeploymentMode::Monolith | DeploymentMode::Negotiation);
    let mount_contracts = matches!(mode, DeploymentMode::Monolith | DeploymentMode::Contracts);
    let mount_escrow = matches!(mode, DeploymentMode::Monolith | DeploymentMode::Escrow);

    if mount_matching {
        router = router.merge(matching_engine::api::create_router(
            matching_engine::api::MatchingApiState {
                service: stack.matching.clone(),
            },
        ));
    }
    if mount_negotiation {
        router = router.merge(negotiation::api::create_router(
            negotiation::api::NegotiationApiState {
                service: stack.negotiations.clone(),
            },
        ));
    }
    if mount_contracts {
        router = router.merge(contracts::api::create_router(
            contracts::api::ContractApiState {
                manager: stack.contracts.clone(),
            },
        ));
    }
    if mount_escrow {
        router = router.merge(escrow::api::create_router(escrow::api::EscrowApiState {
            manager: stack.escrow.clone(),
        }));
    }

    let server_config = ServerConfig::http_only(config.server.host.clone(), http_port);
    let mut app = AppServer::new(mode.as_str(), server_config, router);

    // The auto-release sweep runs wherever the escrow engine runs
    if mount_escrow {
        let sweeper = EscrowSweeper::new(
            stack.escrow.clone(),
            Duration::from_secs(config.escrow.sweep_interval_secs),
        );
        app.add_worker(Arc::new(SweepWorker::new(sweeper)));
    }

    // Validate ports, then run with graceful shutdown (Ctrl+C handling)
    app.validate_ports().await?;
    app.run_with_ctrl_c().await?;

    Ok(())
}

/// The wired engine stack shared by all deployment modes
struct EngineStack {
    matching: Arc<MatchingService>,
    negotiations: Arc<NegotiationService>,
    contracts: Arc<ContractManager>,
    escrow: Arc<EscrowManager>,
}

fn build_stack(config: &WastexConfig) -> Result<EngineStack> {
    // The directory is populated by the surrounding platform; the engine
    // only consumes it
    let directory = Arc::new(InMemoryPartyDirectory::new());

    let matching = Arc::new(MatchingService::new(
        Arc::new(InMemoryMatchingStore::new()),
        MatchingEngine::new(ScoringConfig {
            max_results: config.matching.max_results,
            min_quantity_ratio: config.matching.min_quantity_ratio,
            max_price_ratio: config.matching.max_price_ratio,
        }),
    ));

    let negotiation_store = Arc::new(InMemoryNegotiationStore::new());
    let negotiations = Arc::new(NegotiationService::new(
        negotiation_store.clone(),
        directory.clone(),
    ));

    let ledger = Arc::new(
        HttpLedgerClient::new(
            &config.ledger.base_url,
            Duration::from_secs(config.ledger.timeout_secs),
        )
        .context("building ledger client")?,
    );

    let contracts = Arc::new(ContractManager::new(
        Arc::new(InMemoryContractStore::new()),
        ledger,
        negotiation_store,
        directory,
    ));

    let gateway = Arc::new(
        HttpPaymentGatewayClient::new(
            &config.payment_gateway.base_url,
            &config.payment_gateway.key_id,
            &config.payment_gateway.key_secret,
            Duration::from_secs(config.payment_gateway.timeout_secs),
        )
        .context("building payment gateway client")?,
    );

    // Logistics is external; without a configured provider the engine
    // sees no shipment evidence and relies on buyer confirmation
    let shipment = Arc::new(MockShipmentClient::new());

    let escrow = Arc::new(EscrowManager::new(
        Arc::new(InMemoryPaymentStore::new()),
        gateway,
        shipment,
        contracts.clone(),
        EscrowSettings {
            currency: config.platform.currency.clone(),
            auto_release_days: config.escrow.auto_release_days,
            key_secret: config.payment_gateway.key_secret.clone(),
        },
    ));

    Ok(EngineStack {
        matching,
        negotiations,
        contracts,
        escrow,
    })
}

/// Adapter running the escrow sweep under the server lifecycle
struct SweepWorker {
    sweeper: EscrowSweeper,
    running: Arc<AtomicBool>,
}

impl SweepWorker {
    fn new(sweeper: EscrowSweeper) -> Self {
        Self {
            sweeper,
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl Server for SweepWorker {
    fn name(&self) -> &str {
        "escrow-sweep"
    }

    fn address(&self) -> Option<SocketAddr> {
        None
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run(&self, shutdown: CancellationToken) -> server::Result<()> {
        self.running.store(true, Ordering::SeqCst);
        self.sweeper.run(shutdown).await;
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    // Print summary
    println!("\n=== Configuration Validation Report ===\n");

    // Defaults
    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    // Warnings
    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    // Errors
    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Platform: {}", config.platform.name);
    println!("Version: {}", config.platform.version);
    println!("Currency: {}", config.platform.currency);
    println!("Auto-release days: {}", config.escrow.auto_release_days);
    println!("Ledger: {}", config.ledger.base_url);
    println!("Payment gateway: {}", config.payment_gateway.base_url);

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    // Generate default config
    let config = generate_default_config();

    // Ensure parent directory exists
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    // Save config
    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("This configuration includes:");
    println!("  - Platform metadata (name, description, version, currency)");
    println!("  - Matching thresholds (quantity floor, price ceiling, result cap)");
    println!("  - Escrow settings (auto-release window, sweep interval)");
    println!("  - Ledger and payment gateway endpoints");
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file to customize settings");
    println!("  2. Set WASTEX_GATEWAY_KEY_ID and WASTEX_GATEWAY_KEY_SECRET");
    println!(
        "  3. Run 'wastex validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  4. Run 'wastex start --config {:?}' to start the platform",
        output_path
    );

    Ok(())
}
