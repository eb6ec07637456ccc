//! OpenAPI Specification for the Stockroom API
//!
//! Generated with utoipa from Rust types and route annotations.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{health, item};
use crate::types::{DeleteItemResponse, ListItemsRequest};
use stockroom_core::{Item, NewItem};

/// OpenAPI document for the Stockroom API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.1.0",
        description = "CRUD item service with a cache-aside read path over a persistent store",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "http://localhost:8000", description = "Local Development")
    ),
    tags(
        (name = "Items", description = "Item CRUD with cache-aside reads and filtered, paginated listing"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        // === Item Routes ===
        item::create_item,
        item::list_items,
        item::get_item,
        item::update_item,
        item::delete_item,
        // === Health Routes ===
        health::ping,
        health::live,
        health::ready,
    ),
    components(schemas(
        Item,
        NewItem,
        ListItemsRequest,
        DeleteItemResponse,
        ApiError,
        ErrorCode,
        health::HealthResponse,
        health::HealthStatus,
        health::HealthDetails,
        health::ComponentHealth,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_serializes() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("Stockroom API"));
        assert!(json.contains("/items/{id}"));
    }
}
