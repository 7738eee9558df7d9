use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Key/value cache with optional per-key expiration.
///
/// Expired keys behave exactly like missing keys for every operation.
#[async_trait]
pub trait CacheRepository: Send + Sync {
    /// Live value for `key`, or None if missing or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Unconditionally stores `value`; `ttl` of None means no expiration.
    async fn set(&self, key: &str, value: Value, ttl: Option<u64>) -> Result<bool>;

    /// True iff a live key was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Resets the TTL of an existing key relative to now. Never creates a key.
    async fn expire(&self, key: &str, ttl: u64) -> Result<bool>;

    /// Remaining whole seconds, or None when the key is missing or has no TTL.
    async fn get_ttl(&self, key: &str) -> Result<Option<u64>>;

    /// Atomically adds `amount`; an absent key starts from zero.
    async fn increment(&self, key: &str, amount: i64) -> Result<i64>;

    /// Atomically subtracts `amount`; an absent key starts from zero.
    async fn decrement(&self, key: &str, amount: i64) -> Result<i64>;

    /// Live values among `keys`; absent keys are omitted.
    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Value>>;

    /// Stores every item with the same TTL.
    async fn set_many(&self, items: HashMap<String, Value>, ttl: Option<u64>) -> Result<bool>;

    /// Number of live keys removed.
    async fn delete_many(&self, keys: &[String]) -> Result<usize>;

    /// Live keys matching `pattern`, where `*` matches any run of characters.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    async fn delete_pattern(&self, pattern: &str) -> Result<usize>;

    async fn flush_all(&self) -> Result<bool>;

    /// Structured value for `key`. Strings are decoded as JSON; undecodable
    /// payloads yield None.
    async fn get_structured(&self, key: &str) -> Result<Option<Value>>;

    /// Stores a structured value. External backends serialize it.
    async fn set_structured(&self, key: &str, value: Value, ttl: Option<u64>) -> Result<bool>;
}
