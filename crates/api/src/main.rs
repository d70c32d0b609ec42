use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use illustra_api::cache::ResponseCache;
use illustra_api::config::ServerConfig;
use illustra_api::handlers::operators::ensure_operator;
use illustra_api::router::build_app_router;
use illustra_api::state::AppState;
use illustra_api::storage::LocalStorage;
use illustra_db::store::PgCatalogStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "illustra_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = illustra_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    illustra_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    illustra_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgCatalogStore::new(pool));

    // --- Bootstrap operator ---
    if let (Ok(name), Ok(password)) = (
        std::env::var("BOOTSTRAP_OPERATOR_NAME"),
        std::env::var("BOOTSTRAP_OPERATOR_PASSWORD"),
    ) {
        let created = ensure_operator(store.as_ref(), &name, &password)
            .await
            .expect("Failed to create bootstrap operator");
        tracing::info!(operator = %name, created, "Bootstrap operator ensured");
    }

    // --- Response cache ---
    let cache = Arc::new(ResponseCache::new(Duration::from_secs(config.cache_ttl_secs)));
    tracing::info!(
        ttl_secs = config.cache_ttl_secs,
        enabled = cache.is_enabled(),
        "Response cache ready",
    );

    // --- Object storage ---
    tokio::fs::create_dir_all(&config.storage_dir)
        .await
        .expect("Failed to create storage directory");
    let storage = Arc::new(LocalStorage::new(config.storage_dir.clone()));
    tracing::info!(dir = %config.storage_dir.display(), "Local image storage ready");

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        cache,
        storage,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
