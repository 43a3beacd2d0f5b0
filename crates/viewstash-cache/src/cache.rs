//! Bounded LRU cache with an eviction listener.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::stats::CacheStats;

/// Callback invoked with every entry pushed out to make room for a new key.
///
/// The listener runs on the thread that performed the insertion, after the
/// cache lock has been released, so it may call back into the cache.
pub type EvictionListener<K, V> = Arc<dyn Fn(K, V) + Send + Sync>;

/// Inner state protected by the mutex.
struct CacheInner<K: Hash + Eq, V> {
    /// Recency-ordered entries.
    lru: LruCache<K, V>,

    /// Lookups through [`BoundedCache::get`] that found a value.
    hits: u64,

    /// Lookups through [`BoundedCache::get`] that found nothing.
    misses: u64,

    /// Entries removed to honour the capacity bound.
    evictions: u64,
}

/// Capacity-limited, thread-safe key/value store with LRU eviction.
///
/// - `get` and `put` count as accesses and move the key to the
///   most-recently-used position.
/// - `contains_key`, `peek` and `values` never change recency.
/// - `remove` and `clear` never notify the eviction listener; only
///   capacity-driven eviction does.
///
/// A capacity of `0` means unbounded. Cloning the cache yields another
/// handle onto the same entries.
pub struct BoundedCache<K: Hash + Eq, V> {
    inner: Arc<Mutex<CacheInner<K, V>>>,
    listener: Option<EvictionListener<K, V>>,
    capacity: usize,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries (`0` = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, None)
    }

    /// Create a cache that reports every evicted entry to `listener`.
    pub fn with_listener<F>(capacity: usize, listener: F) -> Self
    where
        F: Fn(K, V) + Send + Sync + 'static,
    {
        Self::build(capacity, Some(Arc::new(listener)))
    }

    fn build(capacity: usize, listener: Option<EvictionListener<K, V>>) -> Self {
        // Eviction is done by `LruCache::push` itself, so the bounded variant
        // only needs the right cap; zero maps onto the unbounded variant.
        let lru = match std::num::NonZeroUsize::new(capacity) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };

        let inner = CacheInner {
            lru,
            hits: 0,
            misses: 0,
            evictions: 0,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            listener,
            capacity,
        }
    }

    /// Configured capacity (`0` = unbounded).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    /// Get a value, marking the key as most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.lock();
        match inner.lru.get(key).cloned() {
            Some(value) => {
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Read a value without touching recency or hit counters.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().lru.peek(key).cloned()
    }

    /// Insert or overwrite a value, returning the previous one.
    ///
    /// When `key` is new and the cache is full, the least recently used entry
    /// is removed first and handed to the eviction listener once the lock has
    /// been released. Overwriting an existing key never evicts.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let evicted = {
            let mut inner = self.inner.lock();

            if let Some(slot) = inner.lru.get_mut(&key) {
                let previous = std::mem::replace(slot, value);
                trace!(size = inner.lru.len(), "Cache entry overwritten");
                return Some(previous);
            }

            // The key is new, so anything handed back is the evicted LRU entry.
            let evicted = inner.lru.push(key, value);
            if evicted.is_some() {
                inner.evictions += 1;
            }

            trace!(size = inner.lru.len(), "Cache entry inserted");
            evicted
        };

        if let Some((evicted_key, evicted_value)) = evicted {
            debug!(capacity = self.capacity, "Evicted least recently used entry");
            if let Some(listener) = &self.listener {
                listener(evicted_key, evicted_value);
            }
        }

        None
    }

    /// Membership test. Does not count as an access.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().lru.contains(key)
    }

    /// Remove an entry without notifying the eviction listener.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().lru.pop(key)
    }

    /// Point-in-time copy of all values, most recently used first.
    ///
    /// The lock is held only while copying, so callers can walk the result
    /// (e.g. to tear every value down) while other threads keep using the cache.
    pub fn values(&self) -> Vec<V> {
        self.inner
            .lock()
            .lru
            .iter()
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Point-in-time copy of all entries, most recently used first.
    ///
    /// Like [`values`](Self::values), this does not change recency.
    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
    {
        self.inner
            .lock()
            .lru
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Drop every entry without notifying the eviction listener.
    pub fn clear(&self) {
        self.inner.lock().lru.clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            size: inner.lru.len(),
            capacity: self.capacity,
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
        }
    }
}

impl<K: Hash + Eq, V> Clone for BoundedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            listener: self.listener.clone(),
            capacity: self.capacity,
        }
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("len", &self.inner.lock().lru.len())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
