//! Till API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use till_core::cache::LocalCache;
use till_core::clock::SystemClock;
use till_core::document::DocumentStore;
use till_store::file_cache::JsonFileCache;
use till_store::memory_document_store::InMemoryDocumentStore;
use till_store::pg_document_store::PgDocumentStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use till_api::config::Config;
use till_api::error::AppError;
use till_api::routes;
use till_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Till API server");

    let config = Config::from_env()?;

    // Select the document store.
    let (document_store, relay) = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await?;
            let store = PgDocumentStore::new(pool);
            store.migrate().await?;
            let relay = store.listen().await?;
            tracing::info!("Using PostgreSQL document store");
            let store: Arc<dyn DocumentStore> = Arc::new(store);
            (store, Some(relay))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory document store");
            let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
            (store, None)
        }
    };

    let cache: Arc<dyn LocalCache> = Arc::new(JsonFileCache::open(config.cache_dir.clone())?);
    tracing::info!(cache_dir = %config.cache_dir.display(), "Local cache ready");
    tracing::info!(reporting_zone = ?config.reporting_zone, "Reporting time zone selected");

    // Build application state and start following the store.
    let app_state = AppState::new(
        Arc::new(SystemClock),
        document_store,
        &cache,
        config.sales_feed_limit,
        config.reporting_zone,
    );
    app_state.start_views();

    // TODO: Restrict CORS to the till front end's origin once it is hosted.
    let app = routes::app_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state.clone());

    // Start server.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    app_state.stop_views();
    if let Some(relay) = relay {
        relay.abort();
    }
    tracing::info!("Till API server stopped");

    Ok(())
}
