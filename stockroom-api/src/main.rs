//! Stockroom API Server Entry Point
//!
//! Bootstraps configuration and the store/cache client handles, then
//! starts the Axum HTTP server. Both handles are constructed exactly once
//! here and injected into the router state; they are torn down when the
//! server task finishes after a shutdown signal.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;

use stockroom_api::telemetry::init_tracing;
use stockroom_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, CacheSettings, DbConfig,
    PgItemStore,
};
use stockroom_storage::{
    CacheAsideConfig, CacheBackend, CachedItemStore, InMemoryCacheBackend, LmdbCacheBackend,
};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing();

    let db_config = DbConfig::from_env();
    let store = PgItemStore::from_config(&db_config)?;
    store.ensure_schema().await?;

    let cache_settings = CacheSettings::from_env();
    let cache: Arc<dyn CacheBackend> = match &cache_settings.dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using LMDB cache backend");
            Arc::new(
                LmdbCacheBackend::new(dir, cache_settings.max_size_mb)
                    .map_err(|e| ApiError::cache_error(format!("Failed to open cache: {}", e)))?,
            )
        }
        None => {
            tracing::info!("STOCKROOM_CACHE_DIR unset, using in-memory cache backend");
            Arc::new(InMemoryCacheBackend::new())
        }
    };

    let items = CachedItemStore::new(
        Arc::new(store),
        cache,
        CacheAsideConfig::new()
            .with_ttl(cache_settings.ttl)
            .with_op_timeout(cache_settings.op_timeout),
    );
    let state = AppState::new(items);

    let api_config = ApiConfig::from_env();
    let app: Router = create_api_router(state, &api_config);

    let addr = resolve_bind_addr(&api_config)?;
    tracing::info!(%addr, "Starting stockroom API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.host, config.port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
