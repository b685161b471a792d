//! Key and value layout for external key-value stores
//!
//! Kept separate from any particular client so the layout can be checked
//! without a running store.

use crate::{
    error::{CacheError, CacheResult},
    traits::CachedValue,
};
use std::time::Duration;

/// Store key for `key` under a deployment prefix.
pub fn namespaced(prefix: &str, key: &str) -> String {
    format!("{prefix}{key}")
}

/// Whole seconds for an `EX` expiry. Rounds up and never returns zero,
/// which stores reject.
pub fn expiry_seconds(ttl: Duration) -> u64 {
    let seconds = ttl.as_secs();
    let seconds = if ttl.subsec_nanos() > 0 {
        seconds.saturating_add(1)
    } else {
        seconds
    };
    seconds.max(1)
}

/// Decode a stored value, reporting unknown tags as corruption of `key`.
pub fn decode_entry(key: &str, raw: &[u8]) -> CacheResult<CachedValue> {
    CachedValue::decode(raw).ok_or_else(|| CacheError::Corruption {
        key: key.to_string(),
        reason: "unknown value tag".to_string(),
    })
}
