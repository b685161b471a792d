//! Expiring response cache for the rivals stats client
//!
//! The fetch pipeline in `rivals-api` talks to a [`ResponseCache`]: a string
//! keyed store where every entry carries its own time-to-live. Two backends
//! are provided:
//!
//! - [`MemoryCache`]: in-process, DashMap based, lazily evicting on read
//! - `RedisCache` (feature `redis`): shared between processes, lifetime
//!   enforced by Redis `EX`
//!
//! Entries are [`CachedValue`]s. A confirmed upstream absence is stored as
//! [`CachedValue::Absent`], which is distinct from "no entry":
//!
//! ```rust
//! use rivals_cache::{CachedValue, MemoryCache, MemoryCacheConfig, ResponseCache};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = MemoryCache::new(MemoryCacheConfig::default())?;
//!
//! cache
//!     .set("v1:find-player/nobody", CachedValue::Absent, Duration::from_secs(900))
//!     .await?;
//!
//! assert_eq!(cache.get("v1:find-player/nobody").await?, Some(CachedValue::Absent));
//! assert_eq!(cache.get("v1:find-player/somebody").await?, None);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod memory_cache;
#[cfg(feature = "redis")]
pub mod redis_cache;
pub mod stats;
pub mod traits;

pub use config::MemoryCacheConfig;
pub use error::{CacheError, CacheResult};
pub use memory_cache::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;
pub use stats::CacheStats;
pub use traits::{CachedValue, ResponseCache};
