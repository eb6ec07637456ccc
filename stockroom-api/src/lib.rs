//! Stockroom API - REST API Layer
//!
//! Axum HTTP surface over the cache-aside record service. This crate
//! contains the transport plumbing (routing, request decoding, response
//! encoding, error mapping), the production PostgreSQL store adapter, and
//! the server binary; the consistency protocol itself lives in
//! stockroom-storage.

pub mod config;
pub mod db;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, CacheSettings};
pub use db::{DbConfig, PgItemStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use types::{DeleteItemResponse, ListItemsRequest};
