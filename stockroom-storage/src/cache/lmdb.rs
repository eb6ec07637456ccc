//! LMDB-backed cache implementation.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a
//! memory-mapped key/value store that survives process restarts. Entries
//! are stored as `[expiry-millis: 8 bytes][json value]`; expiry is
//! checked on read, so stale entries surface as misses and are
//! overwritten by the next populate for that key.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The backend uses read transactions
//! for `get` and write transactions for `set` and `delete`; statistics
//! are tracked with atomic counters.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use stockroom_core::{CacheError, ItemId, StockroomResult};

use super::traits::{CacheBackend, CacheStats};

/// Error type for LMDB cache operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbCacheError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Malformed cache entry.
    #[error("Malformed cache entry: {0}")]
    MalformedEntry(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbCacheError> for stockroom_core::StockroomError {
    fn from(e: LmdbCacheError) -> Self {
        stockroom_core::StockroomError::Cache(CacheError::Backend {
            reason: e.to_string(),
        })
    }
}

/// LMDB-backed TTL cache.
pub struct LmdbCacheBackend {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LmdbCacheBackend {
    /// Create a new LMDB cache backend.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the LMDB
    /// environment cannot be opened, or the database cannot be created.
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbCacheError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbCacheError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbCacheError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(Self {
            env,
            db,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl CacheBackend for LmdbCacheBackend {
    async fn get(&self, key: ItemId) -> StockroomResult<Option<Vec<u8>>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        match self.db.get(&rtxn, key.as_bytes()) {
            Ok(Some(bytes)) => {
                // Format: [expiry-millis: 8 bytes][json value]
                if bytes.len() < 8 {
                    return Err(LmdbCacheError::MalformedEntry(format!(
                        "entry for {key} is {} bytes",
                        bytes.len()
                    ))
                    .into());
                }

                let expiry_bytes: [u8; 8] = bytes[0..8]
                    .try_into()
                    .map_err(|_| LmdbCacheError::MalformedEntry("invalid expiry".into()))?;
                let expires_at_millis = i64::from_le_bytes(expiry_bytes);

                if Utc::now().timestamp_millis() >= expires_at_millis {
                    self.record_miss();
                    return Ok(None);
                }

                self.record_hit();
                Ok(Some(bytes[8..].to_vec()))
            }
            Ok(None) => {
                self.record_miss();
                Ok(None)
            }
            Err(e) => Err(LmdbCacheError::Transaction(e.to_string()).into()),
        }
    }

    async fn set(&self, key: ItemId, value: &[u8], ttl: Duration) -> StockroomResult<()> {
        let expires_at = Utc::now().timestamp_millis().saturating_add(ttl.as_millis() as i64);

        let mut full_bytes = Vec::with_capacity(8 + value.len());
        full_bytes.extend_from_slice(&expires_at.to_le_bytes());
        full_bytes.extend_from_slice(value);

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, key.as_bytes(), &full_bytes)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: ItemId) -> StockroomResult<()> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        // delete() reports whether the key existed; absence is fine here.
        self.db
            .delete(&mut wtxn, key.as_bytes())
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn stats(&self) -> StockroomResult<CacheStats> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        let entry_count = self
            .db
            .len(&rtxn)
            .map_err(|e| LmdbCacheError::Transaction(e.to_string()))?;

        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_backend() -> (tempfile::TempDir, LmdbCacheBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = LmdbCacheBackend::new(dir.path(), 10).unwrap();
        (dir, backend)
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let (_dir, cache) = temp_backend();
        let key = Uuid::now_v7();

        cache
            .set(key, b"payload", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get(key).await.unwrap(), Some(b"payload".to_vec()));
    }

    #[tokio::test]
    async fn test_absent_key_is_none() {
        let (_dir, cache) = temp_backend();
        assert_eq!(cache.get(Uuid::now_v7()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let (_dir, cache) = temp_backend();
        let key = Uuid::now_v7();

        cache
            .set(key, b"payload", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get(key).await.unwrap(), None);

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_entry_and_tolerates_absence() {
        let (_dir, cache) = temp_backend();
        let key = Uuid::now_v7();

        cache
            .set(key, b"payload", Duration::from_secs(60))
            .await
            .unwrap();
        cache.delete(key).await.unwrap();
        assert_eq!(cache.get(key).await.unwrap(), None);

        // Second delete of the same key is not an error.
        cache.delete(key).await.unwrap();
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value_and_expiry() {
        let (_dir, cache) = temp_backend();
        let key = Uuid::now_v7();

        cache
            .set(key, b"old", Duration::from_millis(10))
            .await
            .unwrap();
        cache
            .set(key, b"new", Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get(key).await.unwrap(), Some(b"new".to_vec()));
    }
}
