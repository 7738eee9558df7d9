//! Cache Module
//!
//! Provides the in-memory key/value engine with lazy TTL expiration.

mod entry;
mod pattern;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use pattern::KeyPattern;
pub use stats::CacheStats;
pub use store::CacheStore;
