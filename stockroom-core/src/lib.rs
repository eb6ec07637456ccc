//! Stockroom Core - Entity Types
//!
//! Pure data structures with no behavior beyond constructors. All other
//! crates depend on this. This crate contains ONLY data types and the
//! error taxonomy - no storage or transport logic.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod error;
pub mod item;
pub mod query;

pub use error::{CacheError, StockroomError, StockroomResult, StorageError};
pub use item::{Item, ItemUpdate, NewItem};
pub use query::{ItemFilter, ItemSort, Page, SortField, SortOrder};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Item identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type ItemId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 ItemId (timestamp-sortable).
pub fn new_item_id() -> ItemId {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_ids_are_unique() {
        let a = new_item_id();
        let b = new_item_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_item_ids_sort_by_creation() {
        // UUIDv7 embeds a millisecond timestamp, so ids minted in
        // different milliseconds compare in creation order.
        let earlier = new_item_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let later = new_item_id();
        assert!(earlier < later);
    }
}
