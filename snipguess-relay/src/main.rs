//! Relay server - main entry point
//!
//! Starts the HTTP relay that fronts the song catalog for the browser:
//! proxied catalog endpoints under /api, static front-end files everywhere
//! else.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use snipguess_core::catalog::DEFAULT_CATALOG_BASE;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snipguess_relay::server::{self, RelayContext};

/// Command-line arguments for snipguess-relay
#[derive(Parser, Debug)]
#[command(name = "snipguess-relay")]
#[command(about = "HTTP relay for the snipguess music trivia front end")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5000", env = "SNIPGUESS_RELAY_PORT")]
    port: u16,

    /// Directory holding the static front-end files
    #[arg(short, long, default_value = "public", env = "SNIPGUESS_STATIC_DIR")]
    static_dir: PathBuf,

    /// Base URL of the upstream song catalog
    #[arg(long, default_value = DEFAULT_CATALOG_BASE, env = "SNIPGUESS_CATALOG_BASE")]
    catalog_base: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snipguess_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting snipguess relay on port {}", args.port);
    info!("Static directory: {}", args.static_dir.display());
    info!("Proxying catalog requests to {}", args.catalog_base);

    let ctx = RelayContext::new(&args.catalog_base)
        .context("Failed to initialize relay context")?;
    let app = server::create_router(ctx, &args.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
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
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
