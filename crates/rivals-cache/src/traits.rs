//! Core cache trait and value type
//!
//! Every backend stores [`CachedValue`]s under string keys with a per-entry
//! time-to-live. The pipeline never sees which backend it talks to.

use crate::{error::CacheResult, stats::CacheStats};
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use std::time::Duration;

const TAG_ABSENT: u8 = 0;
const TAG_PRESENT: u8 = 1;

/// A cached upstream result.
///
/// `Absent` records a confirmed 404 and is distinct from "no entry".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    /// Serialized, already validated payload
    Present(Bytes),
    /// Upstream confirmed the resource does not exist
    Absent,
}

impl CachedValue {
    pub fn present(value: impl Into<Bytes>) -> Self {
        Self::Present(value.into())
    }

    /// Payload size used for memory accounting.
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Present(bytes) => bytes.len(),
            Self::Absent => 0,
        }
    }

    /// Byte form for stores that only hold opaque strings.
    pub fn encode(&self) -> Bytes {
        match self {
            Self::Absent => Bytes::from_static(&[TAG_ABSENT]),
            Self::Present(payload) => {
                let mut buf = BytesMut::with_capacity(payload.len() + 1);
                buf.put_u8(TAG_PRESENT);
                buf.put_slice(payload);
                buf.freeze()
            }
        }
    }

    /// Inverse of [`encode`](Self::encode). Returns `None` for unknown tags.
    pub fn decode(raw: &[u8]) -> Option<Self> {
        match raw.split_first() {
            Some((&TAG_ABSENT, [])) => Some(Self::Absent),
            Some((&TAG_PRESENT, payload)) => Some(Self::Present(Bytes::copy_from_slice(payload))),
            _ => None,
        }
    }
}

/// Expiring key-value store used by the fetch pipeline.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns None if missing or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<CachedValue>>;

    /// Overwrites any existing entry.
    async fn set(&self, key: &str, value: CachedValue, ttl: Duration) -> CacheResult<()>;

    /// Returns false for expired entries.
    async fn has(&self, key: &str) -> CacheResult<bool>;

    /// Returns true if the key was present and removed.
    async fn remove(&self, key: &str) -> CacheResult<bool>;

    async fn clear(&self) -> CacheResult<()>;

    async fn stats(&self) -> CacheResult<CacheStats>;

    /// Entry count, not byte size.
    async fn size(&self) -> CacheResult<usize>;

    async fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.size().await? == 0)
    }
}
