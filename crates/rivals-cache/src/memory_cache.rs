//! In-process expiring cache
//!
//! This module provides the default cache backend:
//! - DashMap for concurrent access with minimal lock contention
//! - Lazy eviction of expired entries on read
//! - Optional background sweep of expired entries
//! - A soft entry bound that drops expired entries first, then the entry
//!   closest to expiry

use crate::{
    config::MemoryCacheConfig,
    error::{CacheError, CacheResult},
    stats::{AtomicCacheMetrics, CacheStats},
    traits::{CachedValue, ResponseCache},
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::{sync::Arc, time::Duration};
use tokio::time::{Instant, interval};

/// Roughly thirty years
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

#[derive(Debug)]
struct MemoryCacheEntry {
    value: CachedValue,
    expires_at: Instant,
}

impl MemoryCacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process implementation of [`ResponseCache`].
pub struct MemoryCache {
    storage: Arc<DashMap<String, MemoryCacheEntry>>,
    config: MemoryCacheConfig,
    metrics: Arc<AtomicCacheMetrics>,
    cleanup_handle: Option<tokio::task::JoinHandle<()>>,
}

impl MemoryCache {
    /// Create a new memory cache with the given configuration
    pub fn new(config: MemoryCacheConfig) -> CacheResult<Self> {
        config
            .validate()
            .map_err(CacheError::InvalidConfiguration)?;

        Ok(Self {
            storage: Arc::new(DashMap::with_capacity(config.max_entries.min(1024))),
            config,
            metrics: Arc::new(AtomicCacheMetrics::new()),
            cleanup_handle: None,
        })
    }

    /// Create a new memory cache and start the background sweep.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new_with_cleanup(config: MemoryCacheConfig) -> CacheResult<Self> {
        let cleanup_interval = config.cleanup_interval;
        let mut cache = Self::new(config)?;

        if cleanup_interval > Duration::ZERO {
            cache.start_cleanup_task(cleanup_interval);
        }

        Ok(cache)
    }

    pub fn config(&self) -> &MemoryCacheConfig {
        &self.config
    }

    fn start_cleanup_task(&mut self, cleanup_interval: Duration) {
        let storage = Arc::clone(&self.storage);
        let metrics = Arc::clone(&self.metrics);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(cleanup_interval);

            loop {
                ticker.tick().await;
                let removed = sweep_expired(&storage, &metrics);
                if removed > 0 {
                    tracing::debug!(removed, "swept expired cache entries");
                }
            }
        });

        self.cleanup_handle = Some(handle);
    }

    /// Make room for one more entry when the bound is reached.
    fn make_room(&self) {
        if self.storage.len() < self.config.max_entries {
            return;
        }

        if sweep_expired(&self.storage, &self.metrics) > 0 {
            return;
        }

        let soonest = self
            .storage
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = soonest
            && let Some((_, entry)) = self.storage.remove(&key)
        {
            self.metrics.record_eviction(entry.value.size_bytes());
        }
    }

    /// Drops the entry under `key` if it has expired. Returns true when dropped.
    fn drop_if_expired(&self, key: &str, now: Instant) -> bool {
        if let Some((_, entry)) = self
            .storage
            .remove_if(key, |_, entry| entry.is_expired(now))
        {
            self.metrics.record_expiration(entry.value.size_bytes());
            true
        } else {
            false
        }
    }
}

/// `now + ttl`, clamped to a far-future instant when the sum overflows.
fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

fn sweep_expired(storage: &DashMap<String, MemoryCacheEntry>, metrics: &AtomicCacheMetrics) -> usize {
    let now = Instant::now();
    let expired: Vec<String> = storage
        .iter()
        .filter(|entry| entry.value().is_expired(now))
        .map(|entry| entry.key().clone())
        .collect();

    let mut removed = 0;
    for key in expired {
        if let Some((_, entry)) = storage.remove_if(&key, |_, entry| entry.is_expired(now)) {
            metrics.record_expiration(entry.value.size_bytes());
            removed += 1;
        }
    }
    removed
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<CachedValue>> {
        let now = Instant::now();

        let live = self.storage.get(key).and_then(|entry| {
            (!entry.is_expired(now)).then(|| entry.value.clone())
        });

        if live.is_none() {
            self.drop_if_expired(key, now);
        }

        self.metrics.record_get(live.is_some());
        Ok(live)
    }

    async fn set(&self, key: &str, value: CachedValue, ttl: Duration) -> CacheResult<()> {
        if !self.storage.contains_key(key) {
            self.make_room();
        }

        let size_bytes = value.size_bytes();
        let entry = MemoryCacheEntry {
            value,
            expires_at: expiry(Instant::now(), ttl),
        };

        let replaced = self
            .storage
            .insert(key.to_string(), entry)
            .map(|old| old.value.size_bytes());
        self.metrics.record_put(size_bytes, replaced);
        Ok(())
    }

    async fn has(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        let live = self
            .storage
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now));
        Ok(live)
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        if let Some((_, entry)) = self.storage.remove(key) {
            self.metrics.record_remove(entry.value.size_bytes());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn clear(&self) -> CacheResult<()> {
        self.storage.clear();
        self.metrics.reset();
        Ok(())
    }

    async fn stats(&self) -> CacheResult<CacheStats> {
        Ok(self.metrics.snapshot())
    }

    async fn size(&self) -> CacheResult<usize> {
        Ok(self.storage.len())
    }
}

impl Drop for MemoryCache {
    fn drop(&mut self) {
        if let Some(handle) = self.cleanup_handle.take() {
            handle.abort();
        }
    }
}
