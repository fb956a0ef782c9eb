//! banter-server - Piraeus Banter editor backend
//!
//! Serves the editor's speech generation and audio export endpoints on a
//! local port.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use banter_common::config::ConfigOverrides;
use banter_common::ServerConfig;
use banter_server::tts::ByteDanceClient;
use banter_server::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for banter-server
#[derive(Parser, Debug)]
#[command(name = "banter-server")]
#[command(about = "Speech generation and audio export backend for Piraeus Banter")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Default project directory when a request names none
    #[arg(long, env = "BANTER_PROJECTS_DIR")]
    projects_dir: Option<PathBuf>,

    /// ByteDance application key
    #[arg(long, env = "BYTEDANCE_APPKEY", hide_env_values = true)]
    app_key: Option<String>,

    /// ByteDance access token
    #[arg(long, env = "BYTEDANCE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// ByteDance cluster
    #[arg(long, env = "BYTEDANCE_CLUSTER")]
    cluster: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "BANTER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "BANTER_LOG")]
    log_level: Option<String>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            projects_dir: args.projects_dir,
            app_key: args.app_key,
            access_token: args.access_token,
            cluster: args.cluster,
            log_level: args.log_level,
            config_file: args.config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ServerConfig::resolve(args.into()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("banter_server={0},banter_common={0},tower_http={0}", config.log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Piraeus Banter backend (banter-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Projects directory: {}", config.projects_dir.display());
    if config.tts.app_key.is_empty() {
        warn!("No ByteDance AppKey configured; requests must supply their own");
    }

    let synthesizer = ByteDanceClient::new(config.tts.endpoint.clone())
        .context("Failed to create speech synthesis client")?;

    let addr = config.bind_addr();
    let state = AppState::new(config, Arc::new(synthesizer));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("banter-server listening on http://{}", addr);

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
            warn!("Failed to listen for Ctrl+C: {}", e);
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
