//! Item REST API Routes
//!
//! Axum route handlers for item CRUD. All handlers go through the
//! cache-aside record service on `AppState`; none of them talk to the
//! store or cache adapters directly.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use stockroom_core::{Item, NewItem};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    types::{DeleteItemResponse, ListItemsRequest},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /items - Create a new item
///
/// The payload is accepted without required-field validation; absent
/// fields default to their zero values. The id and timestamps are
/// assigned server-side.
#[utoipa::path(
    post,
    path = "/items",
    tag = "Items",
    request_body = NewItem,
    responses(
        (status = 200, description = "Item created successfully", body = Item),
        (status = 500, description = "Store failure", body = ApiError),
    ),
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewItem>,
) -> ApiResult<Json<Item>> {
    let item = state.items.create(payload).await?;
    Ok(Json(item))
}

/// GET /items - List items with filter/sort/pagination
///
/// This path never touches the cache. Malformed numeric parameters are
/// dropped rather than rejected.
#[utoipa::path(
    get,
    path = "/items",
    tag = "Items",
    params(
        ("limit" = Option<String>, Query, description = "Maximum number of results (default 10)"),
        ("page" = Option<String>, Query, description = "1-indexed page number (default 1)"),
        ("name" = Option<String>, Query, description = "Case-insensitive substring filter on name"),
        ("description" = Option<String>, Query, description = "Case-insensitive substring filter on description"),
        ("min_price" = Option<String>, Query, description = "Inclusive lower price bound"),
        ("max_price" = Option<String>, Query, description = "Inclusive upper price bound"),
        ("sort" = Option<String>, Query, description = "Sort field"),
        ("order" = Option<String>, Query, description = "asc (default) or desc"),
    ),
    responses(
        (status = 200, description = "Matching items, in order", body = [Item]),
        (status = 500, description = "Store failure", body = ApiError),
    ),
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ListItemsRequest>,
) -> ApiResult<Json<Vec<Item>>> {
    let (filter, sort, page) = params.into_query();
    let items = state.items.list(&filter, sort.as_ref(), &page).await?;
    Ok(Json(items))
}

/// GET /items/{id} - Get item by ID (cache-aside)
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "Items",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = Item),
        (status = 404, description = "Item not found", body = ApiError),
        (status = 500, description = "Store or cache failure", body = ApiError),
    ),
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Item>> {
    let item = state.items.get(id).await?;
    Ok(Json(item))
}

/// PUT /items/{id} - Replace the mutable fields of an item
///
/// Responds with the record as constructed from the input payload; the
/// store is not re-read after the write.
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "Items",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = NewItem,
    responses(
        (status = 200, description = "Item updated, cache entry invalidated", body = Item),
        (status = 500, description = "Store failure", body = ApiError),
    ),
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewItem>,
) -> ApiResult<Json<Item>> {
    let item = state.items.update(id, payload).await?;
    Ok(Json(item))
}

/// DELETE /items/{id} - Delete item
///
/// Idempotent: deleting an id that does not exist also succeeds.
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "Items",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item deleted, cache entry invalidated", body = DeleteItemResponse),
        (status = 500, description = "Store failure", body = ApiError),
    ),
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteItemResponse>> {
    state.items.delete(id).await?;
    Ok(Json(DeleteItemResponse::new(id)))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the item routes router.
pub fn create_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::post(create_item))
        .route("/", axum::routing::get(list_items))
        .route("/:id", axum::routing::get(get_item))
        .route("/:id", axum::routing::put(update_item))
        .route("/:id", axum::routing::delete(delete_item))
        .with_state(state)
}
