//! inkwell-scribe - handwritten journal service
//!
//! Uploads of handwritten pages are transcribed by a vision/language provider,
//! titled, and stored as journal entries scoped to the signed-in owner.

use anyhow::{Context, Result};
use clap::Parser;
use inkwell_common::config::InkwellConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkwell_scribe::capability::{Capabilities, OpenAiClient, SqliteStore};
use inkwell_scribe::{AppState, HOUSEKEEPING_INTERVAL};

/// Command-line arguments for inkwell-scribe
#[derive(Parser, Debug)]
#[command(name = "inkwell-scribe")]
#[command(about = "Handwritten journal transcription service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "INKWELL_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "INKWELL_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = InkwellConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(database) = args.database {
        config.store.database_path = database;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate().context("Invalid configuration")?;

    info!("Starting inkwell-scribe on port {}", config.server.port);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.store.database_path.display());

    let db_pool = inkwell_common::db::init_database_pool(&config.store.database_path)
        .await
        .context("Failed to open database")?;
    info!("Database connection established");

    let provider = Arc::new(OpenAiClient::new(&config.capability).context("Failed to build provider client")?);
    let store = Arc::new(SqliteStore::new(db_pool.clone()));
    let capabilities = Capabilities::from_provider(provider, store);

    let port = config.server.port;
    let state = AppState::new(db_pool, capabilities, config);

    tokio::spawn({
        let state = state.clone();
        async move {
            let mut interval = tokio::time::interval(HOUSEKEEPING_INTERVAL);
            loop {
                interval.tick().await;
                state.housekeeping().await;
            }
        }
    });

    let app = inkwell_scribe::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
