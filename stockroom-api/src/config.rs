//! API Configuration Module
//!
//! Configuration for the HTTP surface and the cache layer, loaded from
//! environment variables with sensible defaults for development.

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration: bind address and CORS.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: Vec::new(), // Empty = allow all
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `STOCKROOM_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `STOCKROOM_API_PORT`: Bind port (default: 8000)
    /// - `STOCKROOM_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    pub fn from_env() -> Self {
        let host =
            std::env::var("STOCKROOM_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("STOCKROOM_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(8000);

        let cors_origins = std::env::var("STOCKROOM_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host,
            port,
            cors_origins,
        }
    }
}

// ============================================================================
// CACHE CONFIGURATION
// ============================================================================

/// Cache layer configuration.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Directory for the LMDB environment. `None` selects the in-memory
    /// backend (entries do not survive restarts).
    pub dir: Option<PathBuf>,

    /// Maximum LMDB map size in megabytes.
    pub max_size_mb: usize,

    /// TTL applied to every populated cache entry.
    pub ttl: Duration,

    /// Upper bound on each individual store/cache call.
    pub op_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: None,
            max_size_mb: 256,
            ttl: Duration::from_secs(300), // 5 minutes
            op_timeout: Duration::from_secs(5),
        }
    }
}

impl CacheSettings {
    /// Create CacheSettings from environment variables.
    ///
    /// Environment variables:
    /// - `STOCKROOM_CACHE_DIR`: LMDB directory (unset = in-memory backend)
    /// - `STOCKROOM_CACHE_SIZE_MB`: LMDB map size (default: 256)
    /// - `STOCKROOM_CACHE_TTL_SECS`: Entry TTL (default: 300)
    /// - `STOCKROOM_OP_TIMEOUT_SECS`: Per-call timeout (default: 5)
    pub fn from_env() -> Self {
        let dir = std::env::var("STOCKROOM_CACHE_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let max_size_mb = std::env::var("STOCKROOM_CACHE_SIZE_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256);

        let ttl = Duration::from_secs(
            std::env::var("STOCKROOM_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        );

        let op_timeout = Duration::from_secs(
            std::env::var("STOCKROOM_OP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        );

        Self {
            dir,
            max_size_mb,
            ttl,
            op_timeout,
        }
    }
}
