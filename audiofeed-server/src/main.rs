//! audiofeed-server - REST backend for the audio feed
//!
//! Resolves configuration, opens (or creates) the SQLite database, loads the
//! request-signing secret and serves the HTTP API.

use std::path::PathBuf;

use anyhow::{Context, Result};
use audiofeed_common::api::auth::load_shared_secret;
use audiofeed_common::config::{ConfigOverrides, ServiceConfig};
use audiofeed_common::db::init::init_database;
use audiofeed_server::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

/// Command-line arguments for audiofeed-server
#[derive(Parser, Debug)]
#[command(name = "audiofeed-server")]
#[command(about = "Random audio feed REST service")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to the platform config directory)
    #[arg(short, long, env = "AUDIOFEED_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding audiofeed.db
    #[arg(short, long, env = "AUDIOFEED_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "AUDIOFEED_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "AUDIOFEED_PORT")]
    port: Option<u16>,

    /// Base URL of the web client, used for share links and CORS
    #[arg(long, env = "AUDIOFEED_FRONTEND_URL")]
    frontend_url: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "AUDIOFEED_LOG_LEVEL")]
    log_level: Option<String>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        ConfigOverrides {
            config_file: args.config,
            root_folder: args.root_folder,
            bind_address: args.bind_address,
            port: args.port,
            frontend_url: args.frontend_url,
            log_level: args.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::resolve(args.into()).context("Failed to resolve configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting audiofeed-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config.config_file {
        Some(path) => info!("Config file: {}", path.display()),
        None => warn!("No config file found, using defaults and overrides"),
    }

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let shared_secret = load_shared_secret(&pool)
        .await
        .context("Failed to load shared secret")?;
    if shared_secret == 0 {
        warn!("Request signing disabled (api_shared_secret = 0)");
    } else {
        info!("✓ Loaded shared secret for request signing");
    }

    let state = AppState::new(pool, shared_secret, config.frontend_url.clone());
    let app = build_router(state);

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("audiofeed-server listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
