//! Cache Store Module
//!
//! Key/value engine with lazy TTL expiration, atomic counters, wildcard key
//! scans and structured value helpers. The store itself is not synchronized;
//! callers share it behind a lock.

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, KeyPattern};
use crate::error::{AdapterError, Result};

// == Cache Store ==
/// In-memory cache storage with per-key optional expiration.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty CacheStore.
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry and its TTL.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL in seconds, None = never expires
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Option<u64>) {
        self.entries.insert(key.into(), CacheEntry::new(value, ttl));
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// An expired entry is removed and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.remove_if_expired(key);
        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Returns a live value without touching statistics or purging.
    pub fn peek(&self, key: &str) -> Option<&Value> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| &entry.value)
    }

    // == Exists ==
    /// Returns true if the key holds a live entry.
    pub fn contains(&self, key: &str) -> bool {
        self.peek(key).is_some()
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns true only if a live entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) if entry.is_expired() => {
                self.stats.record_expired(1);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    // == Expire ==
    /// Resets the TTL of a live entry relative to now.
    ///
    /// Returns false without creating anything when the key is absent.
    pub fn expire(&mut self, key: &str, ttl_seconds: u64) -> bool {
        self.remove_if_expired(key);
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.expire_in(ttl_seconds);
                true
            }
            None => false,
        }
    }

    // == TTL ==
    /// Remaining whole seconds for a live entry, None if it has no TTL or is absent.
    pub fn ttl(&self, key: &str) -> Option<u64> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(CacheEntry::ttl_remaining)
    }

    // == Increment ==
    /// Adds `amount` to an integer value as one read-modify-write step.
    ///
    /// An absent key starts from zero and gets no TTL; an existing entry keeps
    /// its expiration. Fails with `TypeMismatch` if the stored value is not an
    /// integer and with `Overflow` if the result leaves the i64 range. The
    /// stored value is unchanged on failure.
    pub fn increment(&mut self, key: &str, amount: i64) -> Result<i64> {
        self.remove_if_expired(key);
        if let Some(entry) = self.entries.get_mut(key) {
            let current = entry
                .value
                .as_i64()
                .ok_or_else(|| AdapterError::TypeMismatch(key.to_string()))?;
            let next = current
                .checked_add(amount)
                .ok_or_else(|| AdapterError::Overflow(key.to_string()))?;
            entry.value = Value::from(next);
            return Ok(next);
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(Value::from(amount), None));
        Ok(amount)
    }

    // == Decrement ==
    /// Subtracts `amount`; see [`CacheStore::increment`].
    pub fn decrement(&mut self, key: &str, amount: i64) -> Result<i64> {
        let negated = amount
            .checked_neg()
            .ok_or_else(|| AdapterError::Overflow(key.to_string()))?;
        self.increment(key, negated)
    }

    // == Get Many ==
    /// Returns the live entries among `keys`; missing keys are omitted.
    pub fn get_many(&mut self, keys: &[String]) -> HashMap<String, Value> {
        self.purge_expired();
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            match self.entries.get(key) {
                Some(entry) => {
                    self.stats.record_hit();
                    found.insert(key.clone(), entry.value.clone());
                }
                None => self.stats.record_miss(),
            }
        }
        found
    }

    // == Set Many ==
    /// Stores every item with the same TTL.
    pub fn set_many<I>(&mut self, items: I, ttl: Option<u64>)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (key, value) in items {
            self.set(key, value, ttl);
        }
    }

    // == Delete Many ==
    /// Deletes every listed key and returns how many live entries were removed.
    pub fn delete_many(&mut self, keys: &[String]) -> usize {
        keys.iter().filter(|key| self.delete(key)).count()
    }

    // == Keys ==
    /// Lists live keys matching `pattern`, sorted.
    pub fn keys(&mut self, pattern: &str) -> Vec<String> {
        self.purge_expired();
        let pattern = KeyPattern::new(pattern);
        let mut keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.matches_everything() || pattern.matches(key))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    // == Delete Pattern ==
    /// Deletes every live key matching `pattern`.
    pub fn delete_pattern(&mut self, pattern: &str) -> usize {
        let keys = self.keys(pattern);
        self.delete_many(&keys)
    }

    // == Flush ==
    /// Removes every entry and returns how many there were.
    pub fn flush_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Structured Values ==
    /// Stores a structured value.
    ///
    /// A top-level string is stored JSON-encoded so that `get_structured`
    /// decodes it back to the same string.
    pub fn set_structured(&mut self, key: impl Into<String>, value: Value, ttl: Option<u64>) {
        let value = match value {
            Value::String(_) => Value::String(value.to_string()),
            other => other,
        };
        self.set(key, value, ttl);
    }

    /// Reads a value as structured data.
    ///
    /// A string is decoded as JSON and yields `Decode` if that fails. Every
    /// other value is already structured and is returned as stored.
    pub fn get_structured(&mut self, key: &str) -> Result<Option<Value>> {
        match self.get(key) {
            Some(Value::String(raw)) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AdapterError::Decode(format!("{key}: {e}"))),
            other => Ok(other),
        }
    }

    // == Purge Expired ==
    /// Removes all expired entries and returns the number removed.
    ///
    /// This is the single sweep used by key-space scans and by the optional
    /// background sweep task.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();
        self.stats.record_expired(removed);
        removed
    }

    fn remove_if_expired(&mut self, key: &str) {
        if self.entries.get(key).is_some_and(CacheEntry::is_expired) {
            self.entries.remove(key);
            self.stats.record_expired(1);
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new();

        store.set("key1", json!("value1"), None);

        assert_eq!(store.get("key1"), Some(json!("value1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new();
        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let mut store = CacheStore::new();

        store.set("key1", json!("value1"), Some(10));
        store.set("key1", json!("value2"), None);

        assert_eq!(store.get("key1"), Some(json!("value2")));
        assert_eq!(store.ttl("key1"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = CacheStore::new();

        store.set("key1", json!(1), None);

        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = CacheStore::new();

        store.set("key1", json!("value1"), Some(1));
        assert!(store.contains("key1"));

        sleep(Duration::from_millis(1100));

        assert!(!store.contains("key1"));
        assert_eq!(store.get("key1"), None);
        assert!(store.is_empty(), "get should purge the expired entry");
    }

    #[test]
    fn test_store_ttl_reporting() {
        let mut store = CacheStore::new();

        store.set("forever", json!(1), None);
        store.set("short", json!(1), Some(30));

        assert_eq!(store.ttl("forever"), None);
        assert_eq!(store.ttl("missing"), None);
        let remaining = store.ttl("short").unwrap();
        assert!(remaining <= 30);
        assert!(remaining >= 29);
    }

    #[test]
    fn test_store_expire_existing_and_missing() {
        let mut store = CacheStore::new();
        store.set("key", json!("v"), None);

        assert!(store.expire("key", 100));
        assert!(store.ttl("key").unwrap() <= 100);

        assert!(!store.expire("ghost", 100));
        assert!(!store.contains("ghost"));
    }

    #[test]
    fn test_store_expire_zero_removes_on_next_access() {
        let mut store = CacheStore::new();
        store.set("key", json!("v"), None);

        assert!(store.expire("key", 0));
        assert_eq!(store.get("key"), None);
    }

    #[test]
    fn test_increment_absent_key_starts_at_amount() {
        let mut store = CacheStore::new();

        assert_eq!(store.increment("hits", 5).unwrap(), 5);
        assert_eq!(store.get("hits"), Some(json!(5)));
        assert_eq!(store.ttl("hits"), None);
    }

    #[test]
    fn test_increment_then_decrement_restores_value() {
        let mut store = CacheStore::new();
        store.set("counter", json!(10), None);

        assert_eq!(store.increment("counter", 7).unwrap(), 17);
        assert_eq!(store.decrement("counter", 7).unwrap(), 10);
    }

    #[test]
    fn test_decrement_absent_key_goes_negative() {
        let mut store = CacheStore::new();
        assert_eq!(store.decrement("counter", 1).unwrap(), -1);
    }

    #[test]
    fn test_increment_keeps_existing_ttl() {
        let mut store = CacheStore::new();
        store.set("counter", json!(1), Some(60));

        store.increment("counter", 1).unwrap();

        assert!(store.ttl("counter").is_some());
    }

    #[test]
    fn test_increment_non_numeric_is_type_mismatch() {
        let mut store = CacheStore::new();
        store.set("name", json!("alice"), None);
        store.set("ratio", json!(0.5), None);

        assert_eq!(
            store.increment("name", 1),
            Err(AdapterError::TypeMismatch("name".to_string()))
        );
        assert!(matches!(store.increment("ratio", 1), Err(AdapterError::TypeMismatch(_))));
        assert_eq!(store.get("name"), Some(json!("alice")));
    }

    #[test]
    fn test_increment_overflow_leaves_value() {
        let mut store = CacheStore::new();
        store.set("big", json!(i64::MAX), None);

        assert!(matches!(store.increment("big", 1), Err(AdapterError::Overflow(_))));
        assert!(matches!(store.decrement("big", i64::MIN), Err(AdapterError::Overflow(_))));
        assert_eq!(store.get("big"), Some(json!(i64::MAX)));
    }

    #[test]
    fn test_increment_on_expired_key_restarts() {
        let mut store = CacheStore::new();
        store.set("counter", json!(41), Some(1));

        sleep(Duration::from_millis(1100));

        assert_eq!(store.increment("counter", 1).unwrap(), 1);
    }

    #[test]
    fn test_get_many_omits_missing() {
        let mut store = CacheStore::new();
        store.set_many(
            vec![("a".to_string(), json!(1)), ("b".to_string(), json!(2))],
            Some(60),
        );

        let found = store.get_many(&["a".to_string(), "b".to_string(), "c".to_string()]);

        assert_eq!(found.len(), 2);
        assert_eq!(found["a"], json!(1));
        assert!(store.ttl("b").is_some());
    }

    #[test]
    fn test_delete_many_counts_removed() {
        let mut store = CacheStore::new();
        store.set("a", json!(1), None);
        store.set("b", json!(2), None);

        let removed = store.delete_many(&["a".to_string(), "b".to_string(), "zz".to_string()]);
        assert_eq!(removed, 2);
    }

    #[test]
    fn test_keys_and_delete_pattern() {
        let mut store = CacheStore::new();
        for key in ["a", "ab", "abc", "b"] {
            store.set(key, json!(key), None);
        }

        assert_eq!(store.keys("ab*"), vec!["ab".to_string(), "abc".to_string()]);
        assert_eq!(store.keys("*").len(), 4);

        assert_eq!(store.delete_pattern("ab*"), 2);
        assert_eq!(store.keys("*"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_keys_skip_expired() {
        let mut store = CacheStore::new();
        store.set("run:1", json!(1), Some(1));
        store.set("run:2", json!(2), None);

        sleep(Duration::from_millis(1100));

        assert_eq!(store.keys("run:*"), vec!["run:2".to_string()]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().expired, 1);
    }

    #[test]
    fn test_flush_all() {
        let mut store = CacheStore::new();
        store.set("a", json!(1), None);
        store.set("b", json!(2), Some(5));

        assert_eq!(store.flush_all(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_structured_values() {
        let mut store = CacheStore::new();
        let payload = json!({"runs": [1, 2, {"ok": true}], "rate": 0.75});

        store.set("native", payload.clone(), None);
        store.set("encoded", Value::String(payload.to_string()), None);
        store.set("broken", json!("{not json"), None);
        store.set("scalar", json!(3), None);

        assert_eq!(store.get_structured("native").unwrap(), Some(payload.clone()));
        assert_eq!(store.get_structured("encoded").unwrap(), Some(payload));
        assert!(matches!(store.get_structured("broken"), Err(AdapterError::Decode(_))));
        assert_eq!(store.get_structured("scalar").unwrap(), Some(json!(3)));
        assert_eq!(store.get_structured("missing").unwrap(), None);
    }

    #[test]
    fn test_structured_top_level_scalars() {
        let mut store = CacheStore::new();

        for (key, value) in [
            ("number", json!(42)),
            ("float", json!(0.5)),
            ("flag", json!(false)),
            ("null", Value::Null),
            ("text", json!("plain text")),
        ] {
            store.set_structured(key, value.clone(), None);
            assert_eq!(store.get_structured(key).unwrap(), Some(value));
        }
    }

    #[test]
    fn test_purge_expired() {
        let mut store = CacheStore::new();
        store.set("key1", json!(1), Some(1));
        store.set("key2", json!(2), Some(10));

        sleep(Duration::from_millis(1100));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.contains("key2"));
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new();

        store.set("key1", json!(1), None);
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
