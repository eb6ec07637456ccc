//! Error types for stockroom operations

use crate::ItemId;
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Item not found: {id}")]
    NotFound { id: ItemId },

    #[error("Insert failed: {reason}")]
    InsertFailed { reason: String },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Update failed for {id}: {reason}")]
    UpdateFailed { id: ItemId, reason: String },

    #[error("Delete failed for {id}: {reason}")]
    DeleteFailed { id: ItemId, reason: String },

    #[error("Connection pool error: {reason}")]
    Pool { reason: String },

    #[error("Storage operation '{operation}' timed out")]
    Timeout { operation: String },
}

/// Cache layer errors.
///
/// An absent key is NOT an error: cache lookups return `Ok(None)` for
/// absence. These variants cover genuine backend failures only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache backend error: {reason}")]
    Backend { reason: String },

    #[error("Cache serialization error: {reason}")]
    Serialization { reason: String },

    #[error("Cache operation '{operation}' timed out")]
    Timeout { operation: String },
}

/// Master error type for all stockroom operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockroomError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl StockroomError {
    /// True when this error is a not-found outcome rather than a genuine
    /// backend failure. The transport maps the two to different statuses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StockroomError::Storage(StorageError::NotFound { .. }))
    }
}

/// Result type alias for stockroom operations.
pub type StockroomResult<T> = Result<T, StockroomError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound { id: Uuid::nil() };
        let msg = format!("{}", err);
        assert!(msg.contains("Item not found"));
    }

    #[test]
    fn test_not_found_is_distinguishable() {
        let not_found: StockroomError = StorageError::NotFound { id: Uuid::nil() }.into();
        let backend: StockroomError = StorageError::QueryFailed {
            reason: "connection refused".to_string(),
        }
        .into();
        assert!(not_found.is_not_found());
        assert!(!backend.is_not_found());
    }

    #[test]
    fn test_cache_error_wraps_into_master() {
        let err: StockroomError = CacheError::Backend {
            reason: "env closed".to_string(),
        }
        .into();
        assert!(matches!(err, StockroomError::Cache(_)));
        assert!(!err.is_not_found());
    }
}
