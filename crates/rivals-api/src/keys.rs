//! Round-robin credential rotation

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ApiError, Result};

/// Cycles through a fixed pool of API keys, one per dispatched request.
#[derive(Debug)]
pub struct KeyRotator {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl KeyRotator {
    /// Fails if the pool is empty.
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(ApiError::Config(
                "key rotator needs at least one key".to_string(),
            ));
        }
        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn next_key(&self) -> &str {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        &self.keys[i]
    }
}
