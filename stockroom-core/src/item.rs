//! Item entity and mutation payloads.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{new_item_id, ItemId, Timestamp};

/// Item - the unit of storage.
///
/// The `id` is assigned by the service at creation time (never
/// client-supplied) and is immutable afterwards. It doubles as the cache
/// key: a cached entry for an id, if present, is the JSON serialization of
/// the last-known store state at or before its insertion into the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Item {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: ItemId,
    pub name: String,
    pub description: String,
    /// Accepted as-is; no non-negativity constraint is enforced.
    pub price: f64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl Item {
    /// Materialize a new item from a candidate payload: fresh UUIDv7 id,
    /// `created_at` and `updated_at` stamped with the current time.
    pub fn create(payload: NewItem) -> Self {
        let now = Utc::now();
        Self {
            id: new_item_id(),
            name: payload.name,
            description: payload.description,
            price: payload.price,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Candidate payload for creating or replacing an item.
///
/// Fields are accepted without required-field validation; absent fields
/// default to their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
}

/// Field updates applied to a stored item by `update_one`.
///
/// `None` leaves the stored field untouched. The record service always
/// sets every mutable field plus `updated_at` (full replacement), but the
/// store contract accepts partial updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub updated_at: Option<Timestamp>,
}

impl ItemUpdate {
    /// Full replacement of the mutable fields, `updated_at` refreshed.
    pub fn replace_with(payload: NewItem, updated_at: Timestamp) -> Self {
        Self {
            name: Some(payload.name),
            description: Some(payload.description),
            price: Some(payload.price),
            updated_at: Some(updated_at),
        }
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.updated_at.is_none()
    }
}
