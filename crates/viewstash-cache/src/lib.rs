//! Bounded, thread-safe LRU cache.
//!
//! This crate provides the storage primitive used by viewstash sessions:
//! - A fixed capacity enforced by least-recently-used eviction
//! - An optional eviction listener, invoked outside the internal lock
//! - Point-in-time value snapshots for bulk teardown
//!
//! # Example
//!
//! ```rust
//! use viewstash_cache::BoundedCache;
//!
//! let cache = BoundedCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get("a");
//! cache.put("c", 3); // evicts "b"
//!
//! assert!(!cache.contains_key("b"));
//! ```

mod cache;
mod stats;

pub use cache::{BoundedCache, EvictionListener};
pub use stats::CacheStats;
