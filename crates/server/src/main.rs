use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wishdeck_core::{
    create_authenticator, load_config, validate_config, Authenticator, BrowseEngine, Cache,
    CatalogProvider, DetailFetcher, GameStore, MemoryCache, SqliteCatalog, SqliteWishlistStore,
    SteamProvider, WishlistManager, WishlistStore,
};

use wishdeck_server::api::create_router;
use wishdeck_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
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
    let config_path = std::env::var("WISHDECK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Database path: {:?}", config.database.path);

    // Config fingerprint, logged so deployments can tell configs apart
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(version = VERSION, config_hash = &config_hash[..16], "starting wishdeck");

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Create SQLite game catalog
    let catalog: Arc<dyn GameStore> = Arc::new(
        SqliteCatalog::new(&config.database.path).context("Failed to create game catalog")?,
    );
    info!("Game catalog initialized");

    // Create SQLite wish-list store (same database file)
    let wishlist_store: Arc<dyn WishlistStore> = Arc::new(
        SqliteWishlistStore::new(&config.database.path)
            .context("Failed to create wishlist store")?,
    );
    info!("Wishlist store initialized");

    // Create the external catalog provider
    let provider: Arc<dyn CatalogProvider> = Arc::new(
        SteamProvider::new(&config.provider).context("Failed to create catalog provider")?,
    );
    info!("Catalog provider initialized ({})", config.provider.app_list_url);

    // In-process TTL cache for provider payloads
    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());

    // Bounded concurrent detail fetcher, shared by browsing and promotion
    let fetcher = Arc::new(DetailFetcher::new(
        Arc::clone(&provider),
        Arc::clone(&cache),
        config.browse.fetch_batch_size,
        Duration::from_secs(config.cache.detail_ttl_secs),
    ));

    // Merge-and-paginate listing engine
    let browse = Arc::new(BrowseEngine::new(
        Arc::clone(&catalog),
        Arc::clone(&provider),
        Arc::clone(&cache),
        Arc::clone(&fetcher),
        config.browse.clone(),
        &config.cache,
    ));

    // Wish-list manager
    let wishlists = Arc::new(WishlistManager::new(
        Arc::clone(&wishlist_store),
        Arc::clone(&catalog),
        fetcher,
    ));

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        catalog,
        wishlist_store,
        wishlists,
        browse,
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
