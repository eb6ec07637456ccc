//! Query types for the list path: filtering, sorting, pagination.
//!
//! Listing bypasses the cache entirely, so these types describe exactly
//! what the store adapter receives. Absent predicates mean "no
//! constraint", never "match empty".

use serde::{Deserialize, Serialize};

/// Default page size when the caller supplies none.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Conjunctive filter over item fields.
///
/// Every present predicate must hold; absent predicates are omitted from
/// the store query. Substring matches are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Case-insensitive substring match on `name`.
    pub name_contains: Option<String>,
    /// Case-insensitive substring match on `description`.
    pub description_contains: Option<String>,
    /// Inclusive lower bound on `price`.
    pub min_price: Option<f64>,
    /// Inclusive upper bound on `price`.
    pub max_price: Option<f64>,
}

impl ItemFilter {
    /// True when no predicate is present (matches everything).
    pub fn is_unconstrained(&self) -> bool {
        self.name_contains.is_none()
            && self.description_contains.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Evaluate the filter against an item in process.
    ///
    /// Store adapters that can push predicates down (SQL) do so; the
    /// in-memory store and property tests use this as the reference
    /// semantics.
    pub fn matches(&self, name: &str, description: &str, price: f64) -> bool {
        if let Some(needle) = &self.name_contains {
            if !name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(needle) = &self.description_contains {
            if !description.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if price > max {
                return false;
            }
        }
        true
    }
}

/// Sortable item fields.
///
/// A closed enum: the transport ignores sort names outside this set
/// rather than forwarding arbitrary strings to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Description,
    Price,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Parse a query-string sort name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "price" => Some(Self::Price),
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    /// Store column name for this field.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction. Ascending unless the caller asks for `desc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a query-string order value: `desc` descends, anything else
    /// ascends.
    pub fn parse(order: Option<&str>) -> Self {
        match order {
            Some("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }
}

/// Single-field sort directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSort {
    pub field: SortField,
    pub order: SortOrder,
}

/// Pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Build a window from 1-indexed `page` and `limit` parameters:
    /// `offset = (page - 1) * limit`. Missing parameters fall back to
    /// limit=10, page=1; negative values are clamped so the window is
    /// always a valid (possibly empty) range.
    pub fn from_params(limit: Option<i64>, page: Option<i64>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(0);
        let page = page.unwrap_or(1);
        Self {
            limit,
            offset: (page - 1).max(0) * limit,
        }
    }
}
