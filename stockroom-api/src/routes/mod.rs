//! REST API Routes Module
//!
//! Route handlers organized by concern:
//! - Item CRUD routes (the cache-aside core behind a thin HTTP surface)
//! - Health check endpoints (Kubernetes-compatible)
//! - OpenAPI document
//!
//! CORS and request tracing are applied as tower layers over the whole
//! router.

pub mod health;
pub mod item;

use axum::{
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;

// Re-export route creation functions for convenience
pub use health::create_router as health_router;
pub use item::create_router as item_router;

/// Build the CORS layer from configuration. An empty origin list allows
/// every origin (dev mode).
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if config.cors_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// GET /api-docs/openapi.json - the OpenAPI document
async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Assemble the full API router.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    Router::new()
        .nest("/items", item_router(state.clone()))
        .nest("/health", health_router(state))
        .route("/api-docs/openapi.json", get(openapi_spec))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stockroom_storage::{CachedItemStore, InMemoryCacheBackend, InMemoryItemStore};

    #[test]
    fn test_router_assembles_with_defaults() {
        let state = AppState::new(CachedItemStore::with_defaults(
            Arc::new(InMemoryItemStore::new()),
            Arc::new(InMemoryCacheBackend::new()),
        ));
        let _router = create_api_router(state, &ApiConfig::default());
    }

    #[test]
    fn test_openapi_document_includes_item_paths() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths;
        assert!(paths.contains_key("/items"));
        assert!(paths.contains_key("/items/{id}"));
        assert!(paths.contains_key("/health/ready"));
    }
}
