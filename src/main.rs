//! route-ledger service host.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http server ─▶ dispatcher ─▶ handler             │
//!                           │   (axum)         │  lookup       │                   │
//!                           │                  │  validate     ▼                   │
//!     Client Response       │                  │            fault mapping          │
//!     ◀─────────────────────┼── envelope ◀─────┘                                   │
//!                           │                                                      │
//!                           │   GET /openapi.json ─▶ synthesizer ─▶ registry       │
//!                           │   GET /docs         ─▶ swagger page                  │
//!                           │                                                      │
//!                           │   config · logging · metrics · shutdown              │
//!                           └──────────────────────────────────────────────────────┘
//! ```
//!
//! `serve` hosts the bundled pets registry; `describe` prints its document.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use route_ledger::config::{load_config, ServiceConfig};
use route_ledger::lifecycle::{trigger_on_signal, Shutdown};
use route_ledger::observability::{logging, metrics};
use route_ledger::openapi::Synthesizer;
use route_ledger::sample::pets_registry;
use route_ledger::HttpServer;

#[derive(Parser)]
#[command(name = "route-ledger")]
#[command(about = "Declarative API host with OpenAPI synthesis", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the registry over HTTP (default)
    Serve,
    /// Print the synthesized API document and exit
    Describe {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Describe { pretty } => describe(config, pretty),
    }
}

async fn serve(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing(&config.observability);

    tracing::info!("route-ledger v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        docs_enabled = config.docs.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = pets_registry()?;
    tracing::info!(routes = registry.len(), "Registry frozen");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    trigger_on_signal(shutdown.clone());

    let server = HttpServer::new(config, registry)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn describe(config: ServiceConfig, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let synthesizer = Synthesizer::new(pets_registry()?);
    let document = synthesizer.describe(config.api.info(), config.api.servers());
    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    println!("{}", json);
    Ok(())
}
