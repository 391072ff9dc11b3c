//! scad-dash - Streaming catalog analytics dashboard service
//!
//! Opens the catalog read-only, then serves the dashboard sections over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use scad_common::config::{load_toml_config, BootstrapConfig, Overrides};
use scad_dash::analytics::Analytics;
use scad_dash::cache::QueryCache;
use scad_dash::db::Store;
use scad_dash::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};

/// Command-line arguments for scad-dash
#[derive(Parser, Debug)]
#[command(name = "scad-dash")]
#[command(about = "Streaming catalog analytics dashboard")]
#[command(version)]
struct Args {
    /// Catalog database file (SQLite, table `titles`)
    #[arg(short, long, env = "SCAD_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "SCAD_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SCAD_PORT")]
    port: Option<u16>,

    /// TOML config file (also SCAD_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "SCAD_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = load_toml_config(args.config.as_deref());
    let config = BootstrapConfig::resolve(
        Overrides {
            database_path: args.database,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
        },
        loaded.toml,
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    // Build identification first, before any database work
    info!(
        "Starting SCAD dashboard (scad-dash) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(warning) = &loaded.warning {
        warn!("{}", warning);
    }
    match &loaded.source {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using defaults"),
    }

    info!("Database path: {}", config.database_path.display());
    let store = match Store::open(&config.database_path).await {
        Ok(store) => {
            info!("Opened catalog (read-only)");
            store
        }
        Err(e) => {
            error!("Failed to open catalog database: {}", e);
            return Err(e).context("Catalog database unavailable");
        }
    };

    let analytics = Analytics::new(store, Arc::new(QueryCache::new()));
    let bounds = analytics.year_bounds().await;
    info!("Release years span {}..={}", bounds.min, bounds.max);

    let app = build_router(AppState::new(analytics));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("scad-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
