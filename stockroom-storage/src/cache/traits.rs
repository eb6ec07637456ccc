//! Cache backend trait and statistics.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stockroom_core::{ItemId, StockroomResult};

/// Capability interface for the TTL key/value cache.
///
/// Keys are item ids; values are opaque bytes (the record service stores
/// JSON serializations). Implementations must be thread-safe and support
/// concurrent access; the handle is long-lived and shared by every
/// request worker.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Look up a key.
    ///
    /// Returns `Ok(Some(bytes))` on a hit, `Ok(None)` when the key is
    /// absent or expired, and `Err` only for genuine backend failures.
    async fn get(&self, key: ItemId) -> StockroomResult<Option<Vec<u8>>>;

    /// Store a value under `key`, expiring after `ttl`.
    async fn set(&self, key: ItemId, value: &[u8], ttl: Duration) -> StockroomResult<()>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: ItemId) -> StockroomResult<()>;

    /// Current cache statistics.
    async fn stats(&self) -> StockroomResult<CacheStats>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (absent or expired keys).
    pub misses: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
