//! API Request and Response Types
//!
//! Wire types specific to the REST surface. The item entity and its
//! create/replace payload live in stockroom-core; this module adds the
//! listing query parameters and the delete acknowledgement.

use serde::{Deserialize, Serialize};

use stockroom_core::{ItemFilter, ItemId, ItemSort, Page, SortField, SortOrder};

// ============================================================================
// LISTING
// ============================================================================

/// Query parameters for `GET /items`.
///
/// Every numeric parameter travels as an optional string and is parsed
/// leniently: a malformed value drops the predicate (or falls back to the
/// pagination default) instead of rejecting the request. This mirrors the
/// documented behavior of the service rather than fixing it silently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct ListItemsRequest {
    /// Maximum number of results (default 10).
    pub limit: Option<String>,
    /// 1-indexed page number (default 1).
    pub page: Option<String>,
    /// Case-insensitive substring filter on name.
    pub name: Option<String>,
    /// Case-insensitive substring filter on description.
    pub description: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<String>,
    /// Inclusive upper price bound.
    pub max_price: Option<String>,
    /// Sort field: one of name, description, price, created_at,
    /// updated_at. Unknown names are ignored.
    pub sort: Option<String>,
    /// Sort direction: `desc` descends, anything else ascends.
    pub order: Option<String>,
}

impl ListItemsRequest {
    /// Lower the raw query string into filter/sort/pagination for the
    /// store, dropping whatever does not parse.
    pub fn into_query(self) -> (ItemFilter, Option<ItemSort>, Page) {
        let filter = ItemFilter {
            name_contains: self.name,
            description_contains: self.description,
            min_price: self.min_price.and_then(|s| s.parse().ok()),
            max_price: self.max_price.and_then(|s| s.parse().ok()),
        };

        let sort = self
            .sort
            .as_deref()
            .and_then(SortField::parse)
            .map(|field| ItemSort {
                field,
                order: SortOrder::parse(self.order.as_deref()),
            });

        let page = Page::from_params(
            self.limit.and_then(|s| s.parse().ok()),
            self.page.and_then(|s| s.parse().ok()),
        );

        (filter, sort, page)
    }
}

// ============================================================================
// DELETE ACKNOWLEDGEMENT
// ============================================================================

/// Structured acknowledgement returned by `DELETE /items/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct DeleteItemResponse {
    /// Always `"deleted"`.
    pub status: String,
    #[schema(value_type = String, format = "uuid")]
    pub id: ItemId,
}

impl DeleteItemResponse {
    pub fn new(id: ItemId) -> Self {
        Self {
            status: "deleted".to_string(),
            id,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_supplied() {
        let (filter, sort, page) = ListItemsRequest::default().into_query();
        assert!(filter.is_unconstrained());
        assert!(sort.is_none());
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn test_page_and_limit_compute_offset() {
        let req = ListItemsRequest {
            limit: Some("25".to_string()),
            page: Some("3".to_string()),
            ..Default::default()
        };
        let (_, _, page) = req.into_query();
        assert_eq!(page.limit, 25);
        assert_eq!(page.offset, 50);
    }

    #[test]
    fn test_malformed_numbers_are_silently_dropped() {
        let req = ListItemsRequest {
            limit: Some("abc".to_string()),
            page: Some("".to_string()),
            min_price: Some("cheap".to_string()),
            max_price: Some("9.5".to_string()),
            ..Default::default()
        };
        let (filter, _, page) = req.into_query();
        // Unparseable limit/page fall back to the defaults.
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 0);
        // Unparseable min_price omits the predicate; max_price survives.
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, Some(9.5));
    }

    #[test]
    fn test_unknown_sort_field_is_ignored() {
        let req = ListItemsRequest {
            sort: Some("popularity".to_string()),
            order: Some("desc".to_string()),
            ..Default::default()
        };
        let (_, sort, _) = req.into_query();
        assert!(sort.is_none());
    }

    #[test]
    fn test_sort_and_order_lower_to_directive() {
        let req = ListItemsRequest {
            sort: Some("price".to_string()),
            order: Some("desc".to_string()),
            ..Default::default()
        };
        let (_, sort, _) = req.into_query();
        assert_eq!(
            sort,
            Some(ItemSort {
                field: SortField::Price,
                order: SortOrder::Desc,
            })
        );
    }

    #[test]
    fn test_order_without_sort_is_meaningless() {
        let req = ListItemsRequest {
            order: Some("desc".to_string()),
            ..Default::default()
        };
        let (_, sort, _) = req.into_query();
        assert!(sort.is_none());
    }
}
