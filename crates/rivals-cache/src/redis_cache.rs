//! Redis-backed cache
//!
//! Entries are written with `SET key value EX <secs>`, so lifetime is enforced
//! by Redis rather than by this process. Values use [`CachedValue::encode`].

use crate::{
    error::CacheResult,
    external::{decode_entry, expiry_seconds, namespaced},
    stats::{AtomicCacheMetrics, CacheStats},
    traits::{CachedValue, ResponseCache},
};
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use std::time::Duration;

/// [`ResponseCache`] shared between processes through Redis.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    prefix: String,
    metrics: std::sync::Arc<AtomicCacheMetrics>,
}

impl RedisCache {
    /// Connect to `url` (for example `redis://127.0.0.1/`). Every key is
    /// stored under `prefix` so several deployments can share one database.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> CacheResult<Self> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection,
            prefix: prefix.into(),
            metrics: std::sync::Arc::new(AtomicCacheMetrics::new()),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        namespaced(&self.prefix, key)
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<CachedValue>> {
        let mut connection = self.connection.clone();
        let raw: Option<Vec<u8>> = connection.get(self.namespaced(key)).await?;

        let value = raw.map(|raw| decode_entry(key, &raw)).transpose()?;

        self.metrics.record_get(value.is_some());
        Ok(value)
    }

    async fn set(&self, key: &str, value: CachedValue, ttl: Duration) -> CacheResult<()> {
        let mut connection = self.connection.clone();
        let () = connection
            .set_ex(self.namespaced(key), value.encode().to_vec(), expiry_seconds(ttl))
            .await?;
        // SET does not report whether it replaced a live entry
        self.metrics.record_put(value.size_bytes(), None);
        Ok(())
    }

    async fn has(&self, key: &str) -> CacheResult<bool> {
        let mut connection = self.connection.clone();
        Ok(connection.exists(self.namespaced(key)).await?)
    }

    async fn remove(&self, key: &str) -> CacheResult<bool> {
        let mut connection = self.connection.clone();
        let removed: usize = connection.del(self.namespaced(key)).await?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> CacheResult<()> {
        let mut connection = self.connection.clone();
        let keys: Vec<String> = connection.keys(format!("{}*", self.prefix)).await?;
        if !keys.is_empty() {
            let _: usize = connection.del(keys).await?;
        }
        self.metrics.reset();
        Ok(())
    }

    async fn stats(&self) -> CacheResult<CacheStats> {
        let mut stats = self.metrics.snapshot();
        stats.entry_count = self.size().await?;
        Ok(stats)
    }

    async fn size(&self) -> CacheResult<usize> {
        let mut connection = self.connection.clone();
        let keys: Vec<String> = connection.keys(format!("{}*", self.prefix)).await?;
        Ok(keys.len())
    }
}
