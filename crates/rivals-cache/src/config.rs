//! Cache configuration

use std::time::Duration;

/// In-process cache configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryCacheConfig {
    /// Soft bound on the number of entries
    pub max_entries: usize,
    /// Sweep interval for expired entries (zero disables the sweep task)
    pub cleanup_interval: Duration,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl MemoryCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MemoryCacheConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_entries_rejected() {
        let config = MemoryCacheConfig::new().with_max_entries(0);
        assert_eq!(
            config.validate(),
            Err("max_entries must be greater than 0".to_string())
        );
    }
}
