//! In-memory item store.
//!
//! Reference implementation of [`ItemStore`] used by tests and cache-less
//! development. Evaluates filter/sort/pagination in process with the
//! semantics the production adapters push down to their backends, and
//! counts `find_one` calls so tests can observe whether a read was served
//! from the cache or the store.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::RwLock;

use async_trait::async_trait;

use stockroom_core::{
    Item, ItemFilter, ItemId, ItemSort, ItemUpdate, Page, SortField, SortOrder, StockroomResult,
    StorageError,
};

use crate::ItemStore;

/// In-memory store keeping items in insertion order.
#[derive(Default)]
pub struct InMemoryItemStore {
    items: RwLock<Vec<Item>>,
    find_one_calls: AtomicU64,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `find_one` calls served so far. A cache hit leaves this
    /// counter untouched.
    pub fn find_one_calls(&self) -> u64 {
        self.find_one_calls.load(AtomicOrdering::Relaxed)
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_failure() -> StorageError {
        StorageError::QueryFailed {
            reason: "item store lock poisoned".to_string(),
        }
    }
}

fn compare_by(a: &Item, b: &Item, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Description => a.description.cmp(&b.description),
        SortField::Price => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn insert(&self, item: &Item) -> StockroomResult<()> {
        let mut items = self.items.write().map_err(|_| Self::lock_failure())?;
        items.push(item.clone());
        Ok(())
    }

    async fn find_one(&self, id: ItemId) -> StockroomResult<Option<Item>> {
        self.find_one_calls.fetch_add(1, AtomicOrdering::Relaxed);
        let items = self.items.read().map_err(|_| Self::lock_failure())?;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn find_many(
        &self,
        filter: &ItemFilter,
        sort: Option<&ItemSort>,
        page: &Page,
    ) -> StockroomResult<Vec<Item>> {
        let items = self.items.read().map_err(|_| Self::lock_failure())?;

        let mut matched: Vec<Item> = items
            .iter()
            .filter(|item| filter.matches(&item.name, &item.description, item.price))
            .cloned()
            .collect();

        if let Some(sort) = sort {
            // Stable sort: ties keep insertion order, like the SQL adapter's
            // secondary ordering.
            matched.sort_by(|a, b| {
                let ordering = compare_by(a, b, sort.field);
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let offset = page.offset.max(0) as usize;
        let limit = page.limit.max(0) as usize;
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn update_one(&self, id: ItemId, update: &ItemUpdate) -> StockroomResult<u64> {
        let mut items = self.items.write().map_err(|_| Self::lock_failure())?;
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            return Ok(0);
        };
        if let Some(name) = &update.name {
            item.name = name.clone();
        }
        if let Some(description) = &update.description {
            item.description = description.clone();
        }
        if let Some(price) = update.price {
            item.price = price;
        }
        if let Some(updated_at) = update.updated_at {
            item.updated_at = updated_at;
        }
        Ok(1)
    }

    async fn delete_one(&self, id: ItemId) -> StockroomResult<u64> {
        let mut items = self.items.write().map_err(|_| Self::lock_failure())?;
        let before = items.len();
        items.retain(|item| item.id != id);
        Ok((before - items.len()) as u64)
    }
}
