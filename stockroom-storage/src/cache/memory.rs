//! In-memory cache backend.
//!
//! HashMap behind an RwLock with per-entry expiry instants. Used by tests
//! and by deployments that run without a cache directory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use stockroom_core::{CacheError, ItemId, StockroomResult};

use super::traits::{CacheBackend, CacheStats};

struct Entry {
    expires_at: Instant,
    value: Vec<u8>,
}

/// In-memory TTL cache.
#[derive(Default)]
pub struct InMemoryCacheBackend {
    entries: RwLock<HashMap<ItemId, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_failure() -> CacheError {
        CacheError::Backend {
            reason: "cache lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: ItemId) -> StockroomResult<Option<Vec<u8>>> {
        {
            let entries = self.entries.read().map_err(|_| Self::lock_failure())?;
            if let Some(entry) = entries.get(&key) {
                if entry.expires_at > Instant::now() {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(Some(entry.value.clone()));
                }
                // Expired: fall through and drop it under the write lock.
            } else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().map_err(|_| Self::lock_failure())?;
        if let Some(entry) = entries.get(&key) {
            if entry.expires_at <= Instant::now() {
                entries.remove(&key);
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn set(&self, key: ItemId, value: &[u8], ttl: Duration) -> StockroomResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::lock_failure())?;
        entries.insert(
            key,
            Entry {
                expires_at: Instant::now() + ttl,
                value: value.to_vec(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: ItemId) -> StockroomResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::lock_failure())?;
        entries.remove(&key);
        Ok(())
    }

    async fn stats(&self) -> StockroomResult<CacheStats> {
        let entries = self.entries.read().map_err(|_| Self::lock_failure())?;
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: entries.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_absent_key_is_none_not_error() {
        let cache = InMemoryCacheBackend::new();
        let result = cache.get(Uuid::now_v7()).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let cache = InMemoryCacheBackend::new();
        let key = Uuid::now_v7();
        cache
            .set(key, b"payload", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get(key).await.unwrap(), Some(b"payload".to_vec()));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCacheBackend::new();
        let key = Uuid::now_v7();
        cache
            .set(key, b"payload", Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get(key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_absent_key_succeeds() {
        let cache = InMemoryCacheBackend::new();
        cache.delete(Uuid::now_v7()).await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_misses() {
        let cache = InMemoryCacheBackend::new();
        let key = Uuid::now_v7();
        cache.get(key).await.unwrap();
        cache
            .set(key, b"x", Duration::from_secs(60))
            .await
            .unwrap();
        cache.get(key).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
    }
}
