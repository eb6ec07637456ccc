//! Stockroom Storage - Capability Traits and the Cache-Aside Core
//!
//! Defines the two capability interfaces the record service consumes -
//! [`ItemStore`] for the persistent document store and
//! [`cache::CacheBackend`] for the TTL key/value cache - together with
//! in-memory implementations of both, the LMDB cache backend, and
//! [`CachedItemStore`], which orchestrates the cache-aside consistency
//! protocol on top of the two adapters.
//!
//! Concrete production adapters live with their clients (the PostgreSQL
//! store adapter is in `stockroom-api`); everything here is
//! backend-agnostic.

pub mod cache;
pub mod cache_aside;
pub mod memory;

pub use cache::{CacheBackend, CacheStats, InMemoryCacheBackend, LmdbCacheBackend, LmdbCacheError};
pub use cache_aside::{CacheAsideConfig, CachedItemStore};
pub use memory::InMemoryItemStore;

use async_trait::async_trait;
use stockroom_core::{Item, ItemFilter, ItemId, ItemSort, ItemUpdate, Page, StockroomResult};

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Capability interface for the persistent document store.
///
/// Implementations must be safe for concurrent use; the handle is
/// long-lived, constructed once at startup, and shared by every request
/// worker. All methods are fallible; `find_one` distinguishes "absent"
/// (`Ok(None)`) from a lookup failure (`Err`).
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert a new item.
    async fn insert(&self, item: &Item) -> StockroomResult<()>;

    /// Fetch a single item by id.
    async fn find_one(&self, id: ItemId) -> StockroomResult<Option<Item>>;

    /// Fetch items matching `filter`, sorted by `sort` when present,
    /// windowed by `page`. The adapter drains its result cursor into an
    /// ordered sequence.
    async fn find_many(
        &self,
        filter: &ItemFilter,
        sort: Option<&ItemSort>,
        page: &Page,
    ) -> StockroomResult<Vec<Item>>;

    /// Apply field updates to the item with the given id. Returns the
    /// modified count (0 when the id does not exist).
    async fn update_one(&self, id: ItemId, update: &ItemUpdate) -> StockroomResult<u64>;

    /// Delete the item with the given id. Returns the deleted count
    /// (0 when the id does not exist - not an error).
    async fn delete_one(&self, id: ItemId) -> StockroomResult<u64>;
}
