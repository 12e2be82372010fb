//! certify-server - Certificate serial issuance and public verification

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use certify_server::api::middleware::RateLimitConfig;
use certify_server::api::{create_router, AppState};
use certify_server::artifact::{ArtifactConfig, FileRenderer};
use certify_server::background::{BackgroundConfig, BackgroundJobRunner};
use certify_server::config::{parse_access_grants, Config};
use certify_server::seed::load_seed_file;
use certify_server::storage::SqliteStore;
use certify_server::traits::LogNotifier;

#[derive(Parser, Debug)]
#[command(name = "certify-server")]
#[command(about = "Certificate serial issuance and public verification service")]
struct Args {
    /// Host to bind to
    #[arg(long, env = "CERTIFY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(long, env = "CERTIFY_PORT", default_value = "3000")]
    port: u16,

    /// Path to SQLite database
    #[arg(long, env = "CERTIFY_DATABASE_PATH", default_value = "./certify.db")]
    database: String,

    /// Public base URL printed into verification links
    #[arg(long, env = "CERTIFY_BASE_URL", default_value = "http://localhost:3000")]
    base_url: String,

    /// Log level
    #[arg(long, env = "CERTIFY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Bearer tokens: `token=institution:<uuid>,token2=student:<uuid>`
    /// If not set, only public endpoints are usable
    #[arg(long, env = "CERTIFY_ACCESS_TOKENS")]
    access_tokens: Option<String>,

    /// JSON file with institutions, students and enrollments to upsert at startup
    #[arg(long, env = "CERTIFY_SEED_FILE")]
    seed_file: Option<String>,

    /// Directory for rendered certificate documents
    #[arg(long, env = "CERTIFY_ARTIFACT_DIR")]
    artifact_dir: Option<PathBuf>,

    /// Verification requests allowed per client per window (0 disables)
    #[arg(long, env = "CERTIFY_VERIFY_RATE_LIMIT")]
    verify_rate_limit: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting certify-server v{}", env!("CARGO_PKG_VERSION"));

    let mut artifact = ArtifactConfig::from_env();
    if let Some(dir) = args.artifact_dir {
        artifact.dir = dir;
    }

    let mut verify_rate_limit = RateLimitConfig::from_env();
    if let Some(max_requests) = args.verify_rate_limit {
        verify_rate_limit.max_requests = max_requests;
    }

    let config = Config {
        host: args.host,
        port: args.port,
        database_path: args.database,
        base_url: args.base_url,
        log_level: args.log_level,
        access_grants: parse_access_grants(args.access_tokens.as_deref().unwrap_or(""))?,
        seed_file: args.seed_file,
        artifact,
        background: BackgroundConfig::from_env(),
        verify_rate_limit,
    };

    if config.verify_rate_limit.max_requests == 0 {
        tracing::warn!("Verification rate limit disabled");
    }

    if config.access_grants.is_empty() {
        tracing::warn!("No access tokens configured, issuance and sharing endpoints will reject every request");
    }

    // Storage
    let store = Arc::new(SqliteStore::new(&config.database_path)?);
    store.initialize()?;
    tracing::info!(path = %config.database_path, "Storage initialized");

    if let Some(path) = &config.seed_file {
        load_seed_file(path, store.as_ref())?;
    }

    // Services
    let renderer = Arc::new(FileRenderer::new(config.artifact.dir.clone()));
    let state = Arc::new(AppState::assemble(
        store,
        renderer,
        Arc::new(LogNotifier),
        &config,
    ));

    let runner = BackgroundJobRunner::new(
        Arc::clone(&state.certificates),
        state.artifacts.clone(),
        config.background.clone(),
    );
    let handles = runner.start().await?;

    // HTTP server
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Listening");

    // Peer addresses key the verification rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    runner.shutdown();
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Background job ended abnormally");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
