use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber;

use trackline::config::TracklineConfig;
use trackline::http::{router, AppState, HttpServer};
use trackline::issues::IssueRepository;
use trackline::ratelimit::{
    InMemoryStatisticsStore, PolicyRegistry, RateLimitGate, RateLimiter, StatisticsStore,
};

#[derive(Parser, Debug)]
#[command(name = "trackline")]
#[command(about = "Issue tracking API with per-route rate limiting")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Starting Trackline Issue Tracking Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = match args.config {
        Some(path) => TracklineConfig::from_file(&path)?,
        None => TracklineConfig::default(),
    };
    info!(http_addr = %config.server.http_addr, "Configuration loaded");

    // Build the policy registry from configuration
    let registry = Arc::new(PolicyRegistry::from_config(&config.rate_limiting.routes)?);

    // Initialize the statistics store and the rate limiter over it
    let ttl = config.rate_limiting.stale_entry_ttl_secs;
    let store: Arc<dyn StatisticsStore> = if ttl > 0 {
        Arc::new(InMemoryStatisticsStore::with_stale_after(
            chrono::Duration::seconds(ttl as i64),
        ))
    } else {
        Arc::new(InMemoryStatisticsStore::new())
    };
    let limiter = Arc::new(RateLimiter::new(store));
    info!("Rate limiter initialized");

    // Assemble the router and start serving
    let state = AppState::new(Arc::new(IssueRepository::new()));
    let gate = RateLimitGate::new(registry, limiter);
    let server = HttpServer::new(config.server.http_addr, router(state, gate));

    // Run the server with graceful shutdown on Ctrl+C
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Trackline Issue Tracking Service stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
