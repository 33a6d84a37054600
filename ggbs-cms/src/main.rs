//! ggbs-cms - site content service for the GGBS marketing site
//!
//! Startup order:
//! 1. Parse arguments and load the TOML bootstrap config
//! 2. Initialize tracing, log build identification and the config outcome
//! 3. Resolve root folder, open the local cache database
//! 4. Resolve bootstrap remote credentials, build the sync context
//! 5. Serve HTTP until Ctrl+C / SIGTERM

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ggbs_cms::admin::StaticCredentialGate;
use ggbs_cms::cache::LocalCache;
use ggbs_cms::preview::PreviewStore;
use ggbs_cms::remote::SupabaseStore;
use ggbs_cms::sync::SyncContext;
use ggbs_cms::{build_router, AppState};
use ggbs_common::config::{
    resolve_bootstrap_credentials, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for ggbs-cms
#[derive(Parser, Debug)]
#[command(name = "ggbs-cms")]
#[command(about = "Site content service for the GGBS marketing site")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "GGBS_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder holding the local cache database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "GGBS_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(short, long, env = "GGBS_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    // The log level lives in the config file, so the load outcome is
    // reported once the subscriber exists
    let (config, config_origin) = TomlConfig::load_with_origin(args.config.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("ggbs_cms={0},ggbs_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification before anything slow
    info!(
        "Starting GGBS CMS (ggbs-cms) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_origin.log();

    let resolver = RootFolderResolver::new(args.root_folder.clone(), config.root_folder.clone());
    let initializer = RootFolderInitializer::new(resolver.resolve());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());

    let pool = match ggbs_common::db::init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Local cache database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open local cache database: {}", e);
            return Err(e.into());
        }
    };

    let remote_timeout = Duration::from_millis(config.remote.timeout_ms);
    let remote = SupabaseStore::new(remote_timeout).context("Failed to build HTTP client")?;

    let bootstrap = resolve_bootstrap_credentials(&config.remote);
    if bootstrap.is_none() {
        warn!("No bootstrap remote credentials; set them from the admin panel to enable global saves");
    }

    let ctx = SyncContext::new(LocalCache::new(pool), Arc::new(remote))
        .with_bootstrap_credentials(bootstrap)
        .with_remote_timeout(remote_timeout);

    let state = AppState::new(
        ctx,
        PreviewStore::new(config.media.preview_capacity)
            .with_max_bytes(config.media.preview_max_bytes),
        Arc::new(StaticCredentialGate::from_config(&config.admin)),
    )
    .with_max_upload_bytes(config.media.max_upload_bytes);

    let app = build_router(state);

    let bind = args.bind.unwrap_or(config.bind_address);
    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("ggbs-cms listening on http://{}", addr);
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
            error!("Failed to install Ctrl+C handler: {}", e);
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
