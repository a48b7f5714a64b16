//! MoodTune playlist service - main entry point
//!
//! Configuration priority: command line, then environment, then the TOML
//! file, then compiled defaults.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moodtune_api::composer::QueryComposer;
use moodtune_api::credentials::{CredentialResolver, CredentialSources};
use moodtune_api::llm::{HttpTextGenerator, TextGenerator};
use moodtune_api::{build_router, AppState, PlaylistGenerator};
use moodtune_common::config::{resolve_config_path, TomlConfig};

/// Command-line arguments for moodtune-api
#[derive(Parser, Debug)]
#[command(name = "moodtune-api")]
#[command(about = "Mood-driven playlist generation service")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "MOODTUNE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "MOODTUNE_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "MOODTUNE_BIND")]
    bind: Option<String>,

    /// Directory holding catalog credential files
    #[arg(long, env = "MOODTUNE_AUTH_DIR")]
    auth_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts so its log level can apply
    let config_result = TomlConfig::load_or_default(args.config.as_deref());
    let log_level = config_result
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("moodtune_api={0},moodtune_common={0},tower_http=info", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting MoodTune API (moodtune-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = config_result.context("Failed to load configuration")?;
    match resolve_config_path(args.config.as_deref()).filter(|p| p.exists()) {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    let port = args.port.unwrap_or(config.port);
    let bind = args.bind.unwrap_or_else(|| config.bind_address.clone());
    let auth_dir = args.auth_dir.unwrap_or_else(|| config.auth_dir.clone());

    info!("Credential directory: {}", auth_dir.display());
    if !auth_dir.is_dir() {
        warn!(
            "Credential directory {} does not exist; playlist requests will fail until credentials are added",
            auth_dir.display()
        );
    }

    let generator: Option<Arc<dyn TextGenerator>> = HttpTextGenerator::from_config(&config.llm)
        .map(|g| Arc::new(g) as Arc<dyn TextGenerator>);
    let composer = QueryComposer::new(generator);

    let credentials = CredentialResolver::new(
        CredentialSources::from_env(auth_dir),
        config.catalog.clone(),
    );

    let generator = PlaylistGenerator::new(
        composer,
        Arc::new(credentials),
        config.selection,
        config.catalog.per_query_limit,
    );

    let app = build_router(AppState::new(generator), &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind((bind.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", bind, port))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;

    info!("moodtune-api listening on http://{}", addr);
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
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
