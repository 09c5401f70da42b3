//! API lab engine.
//!
//! # Architecture Overview
//!
//! ```text
//!     UI collaborator (JSON)
//!            │
//!            ▼
//!     ┌─────────────┐    ┌──────────────┐    ┌─────────────────────────┐
//!     │ http server │───▶│    router    │───▶│ adapter (mock / public / │
//!     │  (axum)     │    │ current src  │    │         training)        │
//!     └──────┬──────┘    └──────┬───────┘    └───────────┬─────────────┘
//!            │                  │  ▲                     │
//!            ▼                  │  │ probe results       ▼
//!     ┌─────────────┐           │  │             mock table or backend
//!     │   verify    │           │ ┌┴─────────────┐
//!     │ req / resp  │           │ │health monitor│
//!     └─────────────┘           ▼ └──────────────┘
//!                        session store (current source, client id, tokens)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use api_lab::config::{load_config, LabConfig};
use api_lab::health::HealthMonitor;
use api_lab::lifecycle::{build_router, open_session, Shutdown};
use api_lab::observability::{logging, metrics};
use api_lab::ApiServer;

#[derive(Parser)]
#[command(name = "api-lab")]
#[command(about = "Request routing and verification engine for the API lab", long_about = None)]
struct Args {
    /// Path to a TOML config file. Built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => LabConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "api-lab starting");
    tracing::info!(
        sources = config.sources.len(),
        bind_address = %config.api.bind_address,
        health_checks = config.health_check.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let session = open_session(&config.session)?;
    let router = Arc::new(build_router(&config, session)?);

    let current = router.current_source_info();
    tracing::info!(source = %current.key, "Current source");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let monitor = HealthMonitor::new(router.clone(), config.health_check.clone());
    let monitor_task = tokio::spawn(monitor.run(shutdown.subscribe()));

    let listener = TcpListener::bind(&config.api.bind_address).await?;
    let server = ApiServer::new(router.clone(), &config);
    server.run(listener, shutdown.subscribe()).await?;

    shutdown.trigger();
    if let Err(e) = monitor_task.await {
        tracing::warn!(error = %e, "Health monitor task ended abnormally");
    }

    if let Err(e) = router.session().save() {
        tracing::warn!(error = %e, "Failed to persist session on shutdown");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
