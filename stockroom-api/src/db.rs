//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and
//! `PgItemStore`, the production implementation of the `ItemStore`
//! capability interface. Filter, sort, and pagination are pushed down to
//! SQL; `find_many` drains the row stream returned by `query_raw` into an
//! ordered sequence.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use futures_util::TryStreamExt;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

use stockroom_core::{
    Item, ItemFilter, ItemId, ItemSort, ItemUpdate, Page, SortOrder, StockroomError,
    StockroomResult, StorageError,
};
use stockroom_storage::ItemStore;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "stockroom".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("STOCKROOM_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("STOCKROOM_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("STOCKROOM_DB_NAME")
                .unwrap_or_else(|_| "stockroom".to_string()),
            user: std::env::var("STOCKROOM_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("STOCKROOM_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("STOCKROOM_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("STOCKROOM_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// POSTGRES ITEM STORE
// ============================================================================

/// PostgreSQL-backed item store.
#[derive(Clone)]
pub struct PgItemStore {
    pool: Pool,
}

impl PgItemStore {
    /// Create a new store with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new store from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        let status = self.pool.status();
        status.size
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> StockroomResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            StockroomError::Storage(StorageError::Pool {
                reason: e.to_string(),
            })
        })
    }

    /// Idempotent schema bootstrap, run once at startup.
    ///
    /// Not a migration system (the service has none); it only creates
    /// the items table when it is missing.
    pub async fn ensure_schema(&self) -> StockroomResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(
            "CREATE TABLE IF NOT EXISTS items (
                id          UUID PRIMARY KEY,
                name        TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                price       DOUBLE PRECISION NOT NULL DEFAULT 0,
                created_at  TIMESTAMPTZ NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL
            )",
        )
        .await
        .map_err(query_failed)?;
        Ok(())
    }
}

fn query_failed(e: tokio_postgres::Error) -> StockroomError {
    StockroomError::Storage(StorageError::QueryFailed {
        reason: e.to_string(),
    })
}

fn row_to_item(row: &Row) -> StockroomResult<Item> {
    Ok(Item {
        id: row.try_get("id").map_err(query_failed)?,
        name: row.try_get("name").map_err(query_failed)?,
        description: row.try_get("description").map_err(query_failed)?,
        price: row.try_get("price").map_err(query_failed)?,
        created_at: row.try_get("created_at").map_err(query_failed)?,
        updated_at: row.try_get("updated_at").map_err(query_failed)?,
    })
}

/// Escape LIKE metacharacters so a user-supplied needle matches as a
/// literal substring (Postgres defaults the escape character to `\`).
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// ORDER BY clause for a listing.
///
/// The sort column comes from the closed `SortField` enum, never from raw
/// client input. Id is always the final key so pagination windows are
/// deterministic, with or without a caller-supplied sort.
fn order_by_clause(sort: Option<&ItemSort>) -> String {
    match sort {
        Some(sort) => {
            let direction = match sort.order {
                SortOrder::Asc => "ASC",
                SortOrder::Desc => "DESC",
            };
            format!(" ORDER BY {} {}, id ASC", sort.field.column(), direction)
        }
        None => " ORDER BY id ASC".to_string(),
    }
}

/// Adapter from a param slice to the iterator shape `query_raw` expects.
fn slice_iter<'a>(
    params: &'a [&'a (dyn ToSql + Sync)],
) -> impl ExactSizeIterator<Item = &'a dyn ToSql> + 'a {
    params.iter().map(|p| *p as _)
}

const ITEM_COLUMNS: &str = "id, name, description, price, created_at, updated_at";

#[async_trait]
impl ItemStore for PgItemStore {
    async fn insert(&self, item: &Item) -> StockroomResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO items (id, name, description, price, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &item.id,
                &item.name,
                &item.description,
                &item.price,
                &item.created_at,
                &item.updated_at,
            ],
        )
        .await
        .map_err(|e| {
            StockroomError::Storage(StorageError::InsertFailed {
                reason: e.to_string(),
            })
        })?;
        Ok(())
    }

    async fn find_one(&self, id: ItemId) -> StockroomResult<Option<Item>> {
        let conn = self.get_conn().await?;
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");
        let row = conn
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(query_failed)?;

        match row {
            Some(row) => Ok(Some(row_to_item(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_many(
        &self,
        filter: &ItemFilter,
        sort: Option<&ItemSort>,
        page: &Page,
    ) -> StockroomResult<Vec<Item>> {
        let conn = self.get_conn().await?;

        // Owned pattern strings must outlive the borrowed param slice.
        let name_pattern = filter
            .name_contains
            .as_deref()
            .map(|n| format!("%{}%", escape_like(n)));
        let description_pattern = filter
            .description_contains
            .as_deref()
            .map(|d| format!("%{}%", escape_like(d)));

        let mut sql = format!("SELECT {ITEM_COLUMNS} FROM items");
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        let mut conditions: Vec<String> = Vec::new();

        if let Some(pattern) = &name_pattern {
            params.push(pattern);
            conditions.push(format!("name ILIKE ${}", params.len()));
        }
        if let Some(pattern) = &description_pattern {
            params.push(pattern);
            conditions.push(format!("description ILIKE ${}", params.len()));
        }
        if let Some(min_price) = &filter.min_price {
            params.push(min_price);
            conditions.push(format!("price >= ${}", params.len()));
        }
        if let Some(max_price) = &filter.max_price {
            params.push(max_price);
            conditions.push(format!("price <= ${}", params.len()));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(&order_by_clause(sort));

        params.push(&page.limit);
        sql.push_str(&format!(" LIMIT ${}", params.len()));
        params.push(&page.offset);
        sql.push_str(&format!(" OFFSET ${}", params.len()));

        // Drain the row cursor into an ordered sequence.
        let stream = conn
            .query_raw(sql.as_str(), slice_iter(&params))
            .await
            .map_err(query_failed)?;
        futures_util::pin_mut!(stream);

        let mut items = Vec::new();
        while let Some(row) = stream.try_next().await.map_err(query_failed)? {
            items.push(row_to_item(&row)?);
        }
        Ok(items)
    }

    async fn update_one(&self, id: ItemId, update: &ItemUpdate) -> StockroomResult<u64> {
        if update.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn().await?;

        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        let mut assignments: Vec<String> = Vec::new();

        if let Some(name) = &update.name {
            params.push(name);
            assignments.push(format!("name = ${}", params.len()));
        }
        if let Some(description) = &update.description {
            params.push(description);
            assignments.push(format!("description = ${}", params.len()));
        }
        if let Some(price) = &update.price {
            params.push(price);
            assignments.push(format!("price = ${}", params.len()));
        }
        if let Some(updated_at) = &update.updated_at {
            params.push(updated_at);
            assignments.push(format!("updated_at = ${}", params.len()));
        }

        params.push(&id);
        let sql = format!(
            "UPDATE items SET {} WHERE id = ${}",
            assignments.join(", "),
            params.len()
        );

        let modified = conn.execute(sql.as_str(), &params).await.map_err(|e| {
            StockroomError::Storage(StorageError::UpdateFailed {
                id,
                reason: e.to_string(),
            })
        })?;
        Ok(modified)
    }

    async fn delete_one(&self, id: ItemId) -> StockroomResult<u64> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM items WHERE id = $1", &[&id])
            .await
            .map_err(|e| {
                StockroomError::Storage(StorageError::DeleteFailed {
                    id,
                    reason: e.to_string(),
                })
            })?;
        Ok(deleted)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::SortField;

    #[test]
    fn test_escape_like_neutralizes_metacharacters() {
        assert_eq!(escape_like("50%_off\\now"), "50\\%\\_off\\\\now");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_order_by_defaults_to_id() {
        assert_eq!(order_by_clause(None), " ORDER BY id ASC");
    }

    #[test]
    fn test_order_by_uses_whitelisted_column_and_direction() {
        let sort = ItemSort {
            field: SortField::Price,
            order: SortOrder::Desc,
        };
        assert_eq!(order_by_clause(Some(&sort)), " ORDER BY price DESC, id ASC");
    }

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "stockroom");
        assert_eq!(config.max_size, 16);
    }
}
