//! Point-in-time cache counters.

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries.
    pub size: usize,

    /// Maximum capacity (`0` = unbounded).
    pub capacity: usize,

    /// Reads that found a value.
    pub hits: u64,

    /// Reads that found nothing.
    pub misses: u64,

    /// Entries evicted to honour the capacity bound.
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of reads that found a value (0.0 when nothing was read).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Check if the cache has reached its capacity.
    pub fn is_full(&self) -> bool {
        self.capacity != 0 && self.size >= self.capacity
    }
}
