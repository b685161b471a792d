//! Error types for cache operations

use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Invalid cache configuration
    #[error("Invalid cache configuration: {0}")]
    InvalidConfiguration(String),

    /// A stored entry could not be decoded
    #[error("Corrupted cache entry for key {key}: {reason}")]
    Corruption {
        /// Key of the unreadable entry
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// Cache backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
