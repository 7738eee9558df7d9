//! In-memory cache repository.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::error::{AdapterError, Result};
use crate::repository::CacheRepository;

/// [`CacheRepository`] backed by a locked [`CacheStore`].
///
/// Expiry is lazy: entries are dropped when an operation touches them or
/// scans the key space. [`InMemoryCacheRepository::purge_expired`] runs the
/// same sweep on demand for the background task.
#[derive(Debug)]
pub struct InMemoryCacheRepository {
    store: RwLock<CacheStore>,
}

impl Default for InMemoryCacheRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCacheRepository {
    pub fn new() -> Self {
        info!(storage = "in-memory", "cache_repository_initialized");
        Self {
            store: RwLock::new(CacheStore::new()),
        }
    }

    /// Removes every expired entry now and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        self.store.write().await.purge_expired()
    }

    /// Snapshot of hit, miss and expiry counters.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}

#[async_trait]
impl CacheRepository for InMemoryCacheRepository {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let value = self.store.write().await.get(key);
        debug!(key, hit = value.is_some(), "cache_get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<u64>) -> Result<bool> {
        self.store.write().await.set(key, value, ttl);
        debug!(key, has_ttl = ttl.is_some(), "cache_set");
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let deleted = self.store.write().await.delete(key);
        debug!(key, deleted, "cache_delete");
        Ok(deleted)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let exists = self.store.read().await.contains(key);
        debug!(key, exists, "cache_exists_check");
        Ok(exists)
    }

    async fn expire(&self, key: &str, ttl: u64) -> Result<bool> {
        let applied = self.store.write().await.expire(key, ttl);
        debug!(key, ttl, applied, "cache_expire");
        Ok(applied)
    }

    async fn get_ttl(&self, key: &str) -> Result<Option<u64>> {
        let ttl = self.store.read().await.ttl(key);
        debug!(key, ?ttl, "cache_ttl_retrieved");
        Ok(ttl)
    }

    async fn increment(&self, key: &str, amount: i64) -> Result<i64> {
        let value = self.store.write().await.increment(key, amount)?;
        debug!(key, amount, new_value = value, "cache_incremented");
        Ok(value)
    }

    async fn decrement(&self, key: &str, amount: i64) -> Result<i64> {
        let value = self.store.write().await.decrement(key, amount)?;
        debug!(key, amount, new_value = value, "cache_decremented");
        Ok(value)
    }

    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Value>> {
        let found = self.store.write().await.get_many(keys);
        debug!(requested = keys.len(), found = found.len(), "cache_get_many");
        Ok(found)
    }

    async fn set_many(&self, items: HashMap<String, Value>, ttl: Option<u64>) -> Result<bool> {
        let count = items.len();
        self.store.write().await.set_many(items, ttl);
        debug!(count, has_ttl = ttl.is_some(), "cache_set_many");
        Ok(true)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize> {
        let deleted = self.store.write().await.delete_many(keys);
        debug!(requested = keys.len(), deleted, "cache_delete_many");
        Ok(deleted)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let keys = self.store.write().await.keys(pattern);
        debug!(pattern, count = keys.len(), "cache_keys_pattern");
        Ok(keys)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize> {
        let deleted = self.store.write().await.delete_pattern(pattern);
        debug!(pattern, deleted, "cache_delete_pattern");
        Ok(deleted)
    }

    async fn flush_all(&self) -> Result<bool> {
        let count = self.store.write().await.flush_all();
        debug!(count, "cache_flushed");
        Ok(true)
    }

    async fn get_structured(&self, key: &str) -> Result<Option<Value>> {
        let decoded = self.store.write().await.get_structured(key);
        match decoded {
            Ok(value) => Ok(value),
            Err(AdapterError::Decode(reason)) => {
                warn!(key, %reason, "cache_json_decode_error");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn set_structured(&self, key: &str, value: Value, ttl: Option<u64>) -> Result<bool> {
        self.store.write().await.set_structured(key, value, ttl);
        debug!(key, has_ttl = ttl.is_some(), "cache_set_structured");
        Ok(true)
    }
}
