//! Cache layer: the TTL key/value capability interface and its backends.
//!
//! The cache never decides policy. When entries are written, how long
//! they live, and when they are invalidated is the record service's call
//! ([`crate::CachedItemStore`]); backends only honor get/set-with-expiry/
//! delete. An absent key is `Ok(None)`, a distinct outcome from a lookup
//! failure - the cache-aside protocol branches on exactly that
//! distinction.

pub mod lmdb;
pub mod memory;
pub mod traits;

pub use lmdb::{LmdbCacheBackend, LmdbCacheError};
pub use memory::InMemoryCacheBackend;
pub use traits::{CacheBackend, CacheStats};
