//! context-dispatch gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────────┐
//!                     │                     GATEWAY                              │
//!   Client Request    │  ┌─────────┐    ┌─────────┐    ┌───────────────────┐     │
//!   ──────────────────┼─▶│ gateway │───▶│  queue  │───▶│    Dispatcher     │     │
//!                     │  │ server  │    │ workers │    │                   │     │
//!                     │  └─────────┘    └─────────┘    │ discovery         │     │
//!                     │                                │  → load_balancer  │     │
//!                     │                                │  → rewrite        │     │
//!   Client Response   │                                │  → transport ─────┼─────┼──▶ Upstream
//!   ◀─────────────────┼────────────────────────────────│  ← resilience     │     │
//!                     │                                └───────────────────┘     │
//!                     └──────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use context_dispatch::config::{self, DispatchConfig};
use context_dispatch::observability;
use context_dispatch::{Dispatcher, GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "context-dispatch")]
#[command(about = "Dispatch HTTP requests to logical clusters by context id", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the gateway bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => DispatchConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.gateway.bind_address = bind;
    }

    observability::logging::init(&config.observability.log_level);
    tracing::info!("context-dispatch v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        config = ?cli.config,
        register_type = %config.register.register_type,
        bind_address = %config.gateway.bind_address,
        retry_enabled = config.register.props.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let dispatcher = Arc::new(Dispatcher::builder(&config).build());

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let listener = TcpListener::bind(&config.gateway.bind_address).await?;
    let server = GatewayServer::new(config.gateway.clone(), dispatcher, &shutdown);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
