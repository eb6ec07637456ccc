//! Shared application state for Axum routers.

use stockroom_storage::CachedItemStore;

/// Application-wide state shared across all routes.
///
/// The store and cache handles inside `items` are long-lived, constructed
/// once at startup, and shared read/write by every concurrent request
/// worker; both are safe for concurrent use by their own contracts, so no
/// additional locking happens here.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside record service. Routes go through this for every item
    /// operation; reads are transparently served from the cache when
    /// possible.
    pub items: CachedItemStore,
    /// Server start time, for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(items: CachedItemStore) -> Self {
        Self {
            items,
            start_time: std::time::Instant::now(),
        }
    }
}
