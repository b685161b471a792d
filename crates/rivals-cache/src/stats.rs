//! Cache statistics
//!
//! Counters are updated lock-free from any task and read as a point-in-time
//! [`CacheStats`] snapshot.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of get operations
    pub get_count: u64,
    /// Gets that returned a live entry (including cached absences)
    pub hit_count: u64,
    /// Gets that found nothing or an expired entry
    pub miss_count: u64,
    /// Total number of set operations
    pub put_count: u64,
    /// Entries dropped to respect the entry bound
    pub eviction_count: u64,
    /// Expired entries removed on read or by the sweep
    pub expiration_count: u64,
    /// Current number of entries in cache
    pub entry_count: usize,
    /// Bytes held by present payloads
    pub memory_usage_bytes: usize,
}

impl CacheStats {
    /// Hit rate in `0.0..=1.0`
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        if self.get_count == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let rate = self.hit_count as f64 / self.get_count as f64;
            rate
        }
    }
}

/// Thread-safe counters backing [`CacheStats`].
#[derive(Debug, Default)]
pub struct AtomicCacheMetrics {
    get_count: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    put_count: AtomicU64,
    eviction_count: AtomicU64,
    expiration_count: AtomicU64,
    entry_count: AtomicUsize,
    memory_usage_bytes: AtomicUsize,
}

impl AtomicCacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_get(&self, hit: bool) {
        self.get_count.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.miss_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// `replaced` is the size of the overwritten entry, if any.
    #[inline]
    pub fn record_put(&self, size_bytes: usize, replaced: Option<usize>) {
        self.put_count.fetch_add(1, Ordering::Relaxed);
        match replaced {
            Some(old) => {
                self.memory_usage_bytes.fetch_sub(old, Ordering::Relaxed);
            }
            None => {
                self.entry_count.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.memory_usage_bytes
            .fetch_add(size_bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_remove(&self, size_bytes: usize) {
        self.entry_count.fetch_sub(1, Ordering::Relaxed);
        self.memory_usage_bytes
            .fetch_sub(size_bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_eviction(&self, size_bytes: usize) {
        self.eviction_count.fetch_add(1, Ordering::Relaxed);
        self.record_remove(size_bytes);
    }

    #[inline]
    pub fn record_expiration(&self, size_bytes: usize) {
        self.expiration_count.fetch_add(1, Ordering::Relaxed);
        self.record_remove(size_bytes);
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            get_count: self.get_count.load(Ordering::Relaxed),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            put_count: self.put_count.load(Ordering::Relaxed),
            eviction_count: self.eviction_count.load(Ordering::Relaxed),
            expiration_count: self.expiration_count.load(Ordering::Relaxed),
            entry_count: self.entry_count.load(Ordering::Relaxed),
            memory_usage_bytes: self.memory_usage_bytes.load(Ordering::Relaxed),
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        for counter in [
            &self.get_count,
            &self.hit_count,
            &self.miss_count,
            &self.put_count,
            &self.eviction_count,
            &self.expiration_count,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.entry_count.store(0, Ordering::Relaxed);
        self.memory_usage_bytes.store(0, Ordering::Relaxed);
    }
}
