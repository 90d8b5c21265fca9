use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::redirect::Policy;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamevault_core::{
    load_config, validate_config, BackendClient, GameStore, HttpGameStore, HttpLibraryClient,
    LibraryService, SearchAggregator,
};
use gamevault_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("GAMEVAULT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Backend: {}", config.backend.base_url);
    info!("Catalog: {}", config.catalog.base_url);

    // Backend clients share one connection pool
    let backend = BackendClient::new(&config.backend).context("Failed to create backend client")?;
    let store: Arc<dyn GameStore> = Arc::new(HttpGameStore::new(backend.clone()));
    let library: Arc<dyn LibraryService> = Arc::new(HttpLibraryClient::new(backend));

    // Search aggregator with the configured relay chain
    let search = SearchAggregator::from_config(&config, store)
        .context("Failed to create catalog relays")?;
    info!(
        "Catalog relays ({}s per attempt): {}",
        config.search.relay_timeout_secs,
        search.chain().relay_names().join(", ")
    );

    // Proxy passes redirects back to the caller untouched
    let proxy_client = reqwest::Client::builder()
        .redirect(Policy::none())
        .timeout(Duration::from_secs(config.backend.timeout_secs))
        .build()
        .context("Failed to create proxy client")?;

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(search),
        library,
        proxy_client,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
