use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use what2watch_api::{
    config::{Config, StorageBackend},
    db::{
        create_pool, create_redis_client, run_migrations, Cache, CollectionStore,
        InMemoryCollectionStore, PgCollectionStore,
    },
    routes::{create_router, AppState, PaginationSettings},
    services::TmdbProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "what2watch_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let collections: Arc<dyn CollectionStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            run_migrations(&pool).await?;
            tracing::info!("Database connected");
            Arc::new(PgCollectionStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory collection store; data is lost on restart");
            Arc::new(InMemoryCollectionStore::new())
        }
    };

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client).await;

    let catalog = Arc::new(TmdbProvider::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    let state = Arc::new(AppState::new(
        collections,
        catalog,
        PaginationSettings::from(&config),
    ));
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_handle.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
