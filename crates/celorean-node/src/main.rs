//! Celorean Node: Entry point.
//!
//! Serves wallet sign-in and course credential endpoints, configured from a
//! TOML file with command-line overrides.

mod api;
mod config;
mod state;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::{CeloreanConfig, StoreBackend, SECRET_ENV_VAR};
use state::AppState;

/// Celorean Node
#[derive(Parser, Debug)]
#[command(name = "celorean-node", version, about = "Celorean sign-in and credential node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "celorean.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Override the content store backend (memory, pinning).
    #[arg(long)]
    store: Option<StoreBackend>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(logging: &config::LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        let config = CeloreanConfig::default();
        config.save(&args.config)?;
        println!("wrote default config to {}", args.config.display());
        println!("set {} (at least 32 bytes) before starting the node", SECRET_ENV_VAR);
        return Ok(());
    }

    // Load configuration
    let mut config = CeloreanConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(backend) = args.store {
        config.store.backend = backend;
    }

    init_tracing(&config.logging);
    tracing::info!("Celorean Node v{}", env!("CARGO_PKG_VERSION"));

    let secret = config.signing_secret(std::env::var(SECRET_ENV_VAR).ok())?;
    let state = Arc::new(AppState::from_config(&config, secret)?);
    tracing::info!(
        store = ?config.store.backend,
        origin = %state.public_origin,
        admins = state.admins.len(),
        contract_wallets = config.signature.rpc_url.is_some(),
        "node configured"
    );

    api::start_api_server(config.api_addr()?, state, shutdown_signal()).await?;
    tracing::info!("Celorean node exited cleanly");
    Ok(())
}
