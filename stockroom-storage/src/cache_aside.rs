//! Cache-aside record service.
//!
//! [`CachedItemStore`] orchestrates the consistency protocol between the
//! persistent store and the TTL cache:
//!
//! - **create**: store only. The cache is not written; the first read
//!   populates it.
//! - **get**: cache first. A hit is returned without consulting the
//!   store; a miss fetches from the store and populates the cache with a
//!   fixed TTL. A cache *failure* (as opposed to an absent key) aborts
//!   the read - the store is not used as a fallback.
//! - **update / delete**: mutate the store, then delete the cache entry
//!   for the id. The entry is deleted, not rewritten, so the next read
//!   repopulates from the store.
//! - **list**: store only. Listing results are never cached; the
//!   filter/sort/page key space is combinatorial.
//!
//! The protocol is best-effort and eventually consistent: a reader
//! racing a writer may observe a cache entry that is stale for up to the
//! TTL window. Concurrent misses for the same id may both populate the
//! cache; both writes carry the same serialization, so last-write-wins
//! is harmless.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use stockroom_core::{
    CacheError, Item, ItemFilter, ItemId, ItemSort, ItemUpdate, NewItem, Page, StockroomError,
    StockroomResult, StorageError,
};

use crate::cache::{CacheBackend, CacheStats};
use crate::ItemStore;

/// Configuration for the cache-aside service.
#[derive(Debug, Clone)]
pub struct CacheAsideConfig {
    /// TTL applied to every populated cache entry.
    pub ttl: Duration,
    /// Upper bound on each individual store/cache call.
    pub op_timeout: Duration,
}

impl Default for CacheAsideConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300), // 5 minutes
            op_timeout: Duration::from_secs(5),
        }
    }
}

impl CacheAsideConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the per-call timeout.
    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }
}

/// The record service: cache-aside reads, invalidate-on-write mutations.
///
/// Holds the two adapter handles as injected trait objects so tests can
/// substitute fakes without a mocking framework. Stateless across calls;
/// cloning shares the underlying handles.
pub struct CachedItemStore {
    store: Arc<dyn ItemStore>,
    cache: Arc<dyn CacheBackend>,
    config: CacheAsideConfig,
}

impl Clone for CachedItemStore {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            config: self.config.clone(),
        }
    }
}

impl CachedItemStore {
    /// Create a new cache-aside service over the given adapters.
    pub fn new(
        store: Arc<dyn ItemStore>,
        cache: Arc<dyn CacheBackend>,
        config: CacheAsideConfig,
    ) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// Create a service with default configuration.
    pub fn with_defaults(store: Arc<dyn ItemStore>, cache: Arc<dyn CacheBackend>) -> Self {
        Self::new(store, cache, CacheAsideConfig::default())
    }

    /// The active configuration.
    pub fn config(&self) -> &CacheAsideConfig {
        &self.config
    }

    /// The underlying store adapter (for connectivity probes).
    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    /// The underlying cache adapter.
    pub fn cache(&self) -> &Arc<dyn CacheBackend> {
        &self.cache
    }

    /// Cache statistics, for observability endpoints.
    pub async fn cache_stats(&self) -> StockroomResult<CacheStats> {
        self.bounded_cache("stats", self.cache.stats()).await
    }

    /// Bound a store call by the configured per-call timeout.
    async fn bounded_store<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = StockroomResult<T>>,
    ) -> StockroomResult<T> {
        match tokio::time::timeout(self.config.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout {
                operation: operation.to_string(),
            }
            .into()),
        }
    }

    /// Bound a cache call by the configured per-call timeout.
    async fn bounded_cache<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = StockroomResult<T>>,
    ) -> StockroomResult<T> {
        match tokio::time::timeout(self.config.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                operation: operation.to_string(),
            }
            .into()),
        }
    }

    /// Delete the cache entry for `id`, tolerating backend failure.
    ///
    /// Invalidation failure leaves the entry stale for at most the
    /// remaining TTL - an accepted degraded state, never fatal.
    async fn invalidate(&self, id: ItemId) {
        if let Err(e) = self.bounded_cache("delete", self.cache.delete(id)).await {
            tracing::warn!(%id, error = %e, "cache invalidation failed; entry may stay stale until TTL expiry");
        }
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// Create an item: assign a fresh id and timestamps, persist, echo
    /// the stored record.
    ///
    /// No cache write happens here; the first read for the new id
    /// populates the cache.
    pub async fn create(&self, payload: NewItem) -> StockroomResult<Item> {
        let item = Item::create(payload);
        self.bounded_store("insert", self.store.insert(&item))
            .await?;
        tracing::debug!(id = %item.id, "item created");
        Ok(item)
    }

    /// Read an item by id through the cache.
    ///
    /// Cache hit: return the cached serialization without any freshness
    /// check against the store. Cache miss: fetch from the store,
    /// populate the cache with the configured TTL, return the record.
    /// A cache lookup *failure* is surfaced as-is; the store is not
    /// consulted as a fallback.
    pub async fn get(&self, id: ItemId) -> StockroomResult<Item> {
        if let Some(bytes) = self.bounded_cache("get", self.cache.get(id)).await? {
            // A hit that does not deserialize is a backend failure, not a
            // miss: reading through would silently mask cache corruption.
            let item: Item = serde_json::from_slice(&bytes).map_err(|e| {
                StockroomError::from(CacheError::Serialization {
                    reason: format!("corrupt cache entry for {id}: {e}"),
                })
            })?;
            tracing::trace!(%id, "cache hit");
            return Ok(item);
        }

        let item = self
            .bounded_store("find_one", self.store.find_one(id))
            .await?
            .ok_or(StorageError::NotFound { id })?;

        // At most one populate per miss. A failed populate is logged and
        // swallowed: the caller still gets the store result.
        match serde_json::to_vec(&item) {
            Ok(bytes) => {
                if let Err(e) = self
                    .bounded_cache("set", self.cache.set(id, &bytes, self.config.ttl))
                    .await
                {
                    tracing::warn!(%id, error = %e, "cache populate failed; serving store result");
                }
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "cache serialization failed; skipping populate");
            }
        }

        tracing::trace!(%id, "cache miss, populated from store");
        Ok(item)
    }

    /// Replace the mutable fields of an item and refresh `updated_at`,
    /// then delete the cache entry for the id (unconditionally - whether
    /// or not one existed).
    ///
    /// The store is not re-read: the returned record is built from the
    /// input payload, so `created_at` carries the zero value and
    /// concurrent writes or server-side defaults are not reflected.
    /// A zero modified count (unknown id) is not an error.
    pub async fn update(&self, id: ItemId, payload: NewItem) -> StockroomResult<Item> {
        let updated_at = Utc::now();
        let update = ItemUpdate::replace_with(payload.clone(), updated_at);

        self.bounded_store("update_one", self.store.update_one(id, &update))
            .await?;

        self.invalidate(id).await;
        tracing::debug!(%id, "item updated, cache entry invalidated");

        Ok(Item {
            id,
            name: payload.name,
            description: payload.description,
            price: payload.price,
            created_at: DateTime::UNIX_EPOCH,
            updated_at,
        })
    }

    /// Delete an item by id and drop its cache entry.
    ///
    /// No existence check: deleting an id that was never stored (or was
    /// already deleted) succeeds.
    pub async fn delete(&self, id: ItemId) -> StockroomResult<()> {
        self.bounded_store("delete_one", self.store.delete_one(id))
            .await?;
        self.invalidate(id).await;
        tracing::debug!(%id, "item deleted, cache entry invalidated");
        Ok(())
    }

    /// List items with filter/sort/pagination. Bypasses the cache
    /// entirely in both directions.
    pub async fn list(
        &self,
        filter: &ItemFilter,
        sort: Option<&ItemSort>,
        page: &Page,
    ) -> StockroomResult<Vec<Item>> {
        self.bounded_store("find_many", self.store.find_many(filter, sort, page))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheBackend;
    use crate::memory::InMemoryItemStore;
    use async_trait::async_trait;

    fn service_with(
        config: CacheAsideConfig,
    ) -> (Arc<InMemoryItemStore>, Arc<InMemoryCacheBackend>, CachedItemStore) {
        let store = Arc::new(InMemoryItemStore::new());
        let cache = Arc::new(InMemoryCacheBackend::new());
        let service = CachedItemStore::new(store.clone(), cache.clone(), config);
        (store, cache, service)
    }

    fn service() -> (Arc<InMemoryItemStore>, Arc<InMemoryCacheBackend>, CachedItemStore) {
        service_with(CacheAsideConfig::default())
    }

    fn widget() -> NewItem {
        NewItem {
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: 9.99,
        }
    }

    #[tokio::test]
    async fn test_create_does_not_write_cache() {
        let (_store, cache, service) = service();
        let created = service.create(widget()).await.unwrap();

        assert_eq!(cache.get(created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_miss_populates_cache_and_hit_skips_store() {
        let (store, cache, service) = service();
        let created = service.create(widget()).await.unwrap();

        let first = service.get(created.id).await.unwrap();
        assert_eq!(first, created);
        assert_eq!(store.find_one_calls(), 1);
        assert!(cache.get(created.id).await.unwrap().is_some());

        let second = service.get(created.id).await.unwrap();
        assert_eq!(second, created);
        // Store-call counter stuck at 1: the second read was a cache hit.
        assert_eq!(store.find_one_calls(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let (_store, _cache, service) = service();
        let err = service.get(uuid::Uuid::now_v7()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_invalidates_cache() {
        let (_store, cache, service) = service();
        let created = service.create(widget()).await.unwrap();

        service.get(created.id).await.unwrap();
        assert!(cache.get(created.id).await.unwrap().is_some());

        let updated = service
            .update(
                created.id,
                NewItem {
                    price: 12.0,
                    ..widget()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, 12.0);
        assert_eq!(updated.id, created.id);

        // Invalidation on write: the entry is gone regardless of prior state.
        assert_eq!(cache.get(created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_after_update_returns_new_price() {
        let (store, cache, service) = service();
        let created = service.create(widget()).await.unwrap();

        // First read misses and populates; second hits.
        service.get(created.id).await.unwrap();
        service.get(created.id).await.unwrap();
        assert_eq!(store.find_one_calls(), 1);

        service
            .update(
                created.id,
                NewItem {
                    price: 12.0,
                    ..widget()
                },
            )
            .await
            .unwrap();

        // The next read misses again and reflects the store state.
        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched.price, 12.0);
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(store.find_one_calls(), 2);
        assert!(cache.get(created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_unknown_id_echoes_payload() {
        let (_store, _cache, service) = service();
        let id = uuid::Uuid::now_v7();
        let updated = service.update(id, widget()).await.unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.created_at, DateTime::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache_and_is_idempotent() {
        let (_store, cache, service) = service();
        let created = service.create(widget()).await.unwrap();
        service.get(created.id).await.unwrap();

        service.delete(created.id).await.unwrap();
        assert_eq!(cache.get(created.id).await.unwrap(), None);
        assert!(service.get(created.id).await.unwrap_err().is_not_found());

        // Second delete of the same id succeeds.
        service.delete(created.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_ttl_expiry_forces_store_refetch() {
        let (store, _cache, service) =
            service_with(CacheAsideConfig::new().with_ttl(Duration::from_millis(30)));
        let created = service.create(widget()).await.unwrap();

        service.get(created.id).await.unwrap();
        assert_eq!(store.find_one_calls(), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;

        service.get(created.id).await.unwrap();
        assert_eq!(store.find_one_calls(), 2);
    }

    #[tokio::test]
    async fn test_list_bypasses_cache() {
        let (_store, cache, service) = service();
        for price in [1.0, 2.0, 3.0] {
            service
                .create(NewItem {
                    price,
                    ..widget()
                })
                .await
                .unwrap();
        }

        let listed = service
            .list(&ItemFilter::default(), None, &Page::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 3);

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.hits + stats.misses, 0);
    }

    // ------------------------------------------------------------------
    // Cache failure policy
    // ------------------------------------------------------------------

    /// Cache whose lookups always fail; writes and deletes succeed.
    struct BrokenGetCache;

    #[async_trait]
    impl CacheBackend for BrokenGetCache {
        async fn get(&self, _key: ItemId) -> StockroomResult<Option<Vec<u8>>> {
            Err(CacheError::Backend {
                reason: "connection refused".to_string(),
            }
            .into())
        }

        async fn set(&self, _key: ItemId, _value: &[u8], _ttl: Duration) -> StockroomResult<()> {
            Ok(())
        }

        async fn delete(&self, _key: ItemId) -> StockroomResult<()> {
            Ok(())
        }

        async fn stats(&self) -> StockroomResult<CacheStats> {
            Ok(CacheStats::default())
        }
    }

    #[tokio::test]
    async fn test_cache_lookup_failure_does_not_fall_back_to_store() {
        let store = Arc::new(InMemoryItemStore::new());
        let service =
            CachedItemStore::with_defaults(store.clone(), Arc::new(BrokenGetCache));

        let created = service.create(widget()).await.unwrap();
        let err = service.get(created.id).await.unwrap_err();

        assert!(matches!(err, StockroomError::Cache(_)));
        // Fail-fast: the store was never consulted.
        assert_eq!(store.find_one_calls(), 0);
    }

    /// Cache that accepts reads but fails every write and delete.
    struct ReadOnlyCache {
        inner: InMemoryCacheBackend,
    }

    #[async_trait]
    impl CacheBackend for ReadOnlyCache {
        async fn get(&self, key: ItemId) -> StockroomResult<Option<Vec<u8>>> {
            self.inner.get(key).await
        }

        async fn set(&self, _key: ItemId, _value: &[u8], _ttl: Duration) -> StockroomResult<()> {
            Err(CacheError::Backend {
                reason: "read-only".to_string(),
            }
            .into())
        }

        async fn delete(&self, _key: ItemId) -> StockroomResult<()> {
            Err(CacheError::Backend {
                reason: "read-only".to_string(),
            }
            .into())
        }

        async fn stats(&self) -> StockroomResult<CacheStats> {
            self.inner.stats().await
        }
    }

    #[tokio::test]
    async fn test_populate_and_invalidation_failures_are_non_fatal() {
        let store = Arc::new(InMemoryItemStore::new());
        let cache = Arc::new(ReadOnlyCache {
            inner: InMemoryCacheBackend::new(),
        });
        let service = CachedItemStore::with_defaults(store.clone(), cache);

        let created = service.create(widget()).await.unwrap();

        // Populate write fails, the read still serves the store result.
        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched, created);

        // Invalidation failures on update/delete are swallowed too.
        service.update(created.id, widget()).await.unwrap();
        service.delete(created.id).await.unwrap();
    }
}
