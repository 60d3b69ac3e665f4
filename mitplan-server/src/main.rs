//! Mitplan synchronization server - main entry point
//!
//! Single-process service: WebSocket gateway for real-time collaborative
//! mitplan editing plus a small HTTP control surface.

use anyhow::{Context, Result};
use clap::Parser;
use mitplan_common::{config, db};
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for mitplan-server
#[derive(Parser, Debug)]
#[command(name = "mitplan-server")]
#[command(about = "Real-time collaborative mitplan synchronization server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5000", env = "MITPLAN_PORT")]
    port: u16,

    /// SQLite database path (falls back to config file, then OS default)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Frontend origin allowed by CORS
    #[arg(long, env = "MITPLAN_FRONTEND_URL")]
    frontend_origin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mitplan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let db_path = config::resolve_database_path(
        args.database.as_deref().and_then(|p| p.to_str()),
        "MITPLAN_DATABASE",
    )
    .context("Failed to resolve database path")?;

    info!("Starting mitplan server on port {}", args.port);
    info!("Database: {}", db_path.display());

    let pool = db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let bind_addr = format!("0.0.0.0:{}", args.port);
    mitplan_server::server::run(
        &bind_addr,
        pool,
        args.frontend_origin.as_deref(),
        shutdown_signal(),
    )
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
