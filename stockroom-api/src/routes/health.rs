//! Health Check Endpoints
//!
//! Kubernetes-compatible health check endpoints:
//! - /health/ping - Simple liveness check
//! - /health/live - Process alive check
//! - /health/ready - Store connectivity check plus cache statistics
//!
//! No authentication exists at this boundary.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockroom_storage::{CacheStats, ItemStore};

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct HealthDetails {
    pub store: ComponentHealth,
    #[schema(value_type = Object)]
    pub cache: CacheStats,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping - Simple pong response
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = String),
    ),
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live - Process liveness check
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is alive", body = HealthResponse),
    ),
)]
pub async fn live() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        message: None,
        details: None,
    })
}

/// GET /health/ready - Store connectivity check
///
/// Probes the store through the capability interface with a lookup for
/// the nil id (cheap; no such item is ever stored) and reports cache
/// statistics alongside.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Store is unreachable", body = HealthResponse),
    ),
)]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = std::time::Instant::now();
    let store_result = state.items.store().find_one(Uuid::nil()).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let store_health = match &store_result {
        Ok(_) => ComponentHealth {
            status: HealthStatus::Healthy,
            latency_ms: Some(latency_ms),
            error: None,
        },
        Err(e) => ComponentHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: Some(latency_ms),
            error: Some(e.to_string()),
        },
    };

    let cache = state.items.cache_stats().await.unwrap_or_default();

    let status = match store_health.status {
        HealthStatus::Healthy => HealthStatus::Healthy,
        _ => HealthStatus::Unhealthy,
    };
    let http_status = match status {
        HealthStatus::Healthy => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        http_status,
        Json(HealthResponse {
            status,
            message: None,
            details: Some(HealthDetails {
                store: store_health,
                cache,
                uptime_seconds: state.start_time.elapsed().as_secs(),
            }),
        }),
    )
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the health routes router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(live))
        .route("/ready", get(ready))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stockroom_storage::{CachedItemStore, InMemoryCacheBackend, InMemoryItemStore};

    fn test_state() -> AppState {
        AppState::new(CachedItemStore::with_defaults(
            Arc::new(InMemoryItemStore::new()),
            Arc::new(InMemoryCacheBackend::new()),
        ))
    }

    #[tokio::test]
    async fn test_live_reports_healthy() {
        let Json(response) = live().await;
        assert_eq!(response.status, HealthStatus::Healthy);
        assert!(response.details.is_none());
    }

    #[tokio::test]
    async fn test_ready_reports_store_and_cache() {
        let (status, Json(response)) = ready(State(test_state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.status, HealthStatus::Healthy);

        let details = response.details.expect("details present");
        assert_eq!(details.store.status, HealthStatus::Healthy);
        assert_eq!(details.cache.entry_count, 0);
    }
}
