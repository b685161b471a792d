//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{ApiError, Result};
use crate::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://marvelrivalsapi.com";
pub const DEFAULT_TRACKER_URL: &str = "https://api.tracker.gg/api/v2/marvel-rivals/standard";
pub const DEFAULT_TRACKER_METADATA_URL: &str = "https://api.tracker.gg/api/v1/marvel-rivals";
pub const DEFAULT_SEASON: &str = "13";

/// Configuration for [`Api`](crate::Api)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Stats API v1 root
    pub v1_url: String,

    /// Stats API v2 root (match history)
    pub v2_url: String,

    /// Tracking-service profile root
    pub tracker_url: String,

    /// Tracking-service metadata root
    pub tracker_metadata_url: String,

    /// Prefix for relative image paths
    pub image_cdn_url: String,

    /// Stats API keys, rotated per request
    pub api_keys: Vec<String>,

    /// Tracking-service keys. Requests go out unauthenticated when empty.
    pub tracker_api_keys: Vec<String>,

    /// Season sent when the caller does not pick one
    pub default_season: String,

    pub cache_ttls: CacheTtls,

    pub retry_policy: RetryPolicy,

    pub connect_timeout: Duration,

    pub request_timeout: Duration,

    /// Upper bound on waiting for an exhausted route quota to reset
    pub max_quota_wait: Duration,

    pub user_agent: String,
}

/// Time-to-live for each cached endpoint family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTtls {
    pub player: Duration,
    pub heroes: Duration,
    pub leaderboard: Duration,
    pub patch_notes: Duration,
    pub maps: Duration,
    pub autocomplete: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            player: Duration::from_secs(15 * 60),
            heroes: Duration::from_secs(24 * 60 * 60),
            leaderboard: Duration::from_secs(15 * 60),
            patch_notes: Duration::from_secs(60 * 60),
            maps: Duration::from_secs(60 * 60),
            autocomplete: Duration::from_secs(5 * 60),
        }
    }
}

impl CacheTtls {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            player: secs_var("RIVALS_PLAYER_TTL").unwrap_or(defaults.player),
            heroes: secs_var("RIVALS_HEROES_TTL").unwrap_or(defaults.heroes),
            leaderboard: secs_var("RIVALS_LEADERBOARD_TTL").unwrap_or(defaults.leaderboard),
            patch_notes: secs_var("RIVALS_PATCH_NOTES_TTL").unwrap_or(defaults.patch_notes),
            maps: secs_var("RIVALS_MAPS_TTL").unwrap_or(defaults.maps),
            autocomplete: secs_var("RIVALS_AUTOCOMPLETE_TTL").unwrap_or(defaults.autocomplete),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            v1_url: format!("{DEFAULT_BASE_URL}/api/v1"),
            v2_url: format!("{DEFAULT_BASE_URL}/api/v2"),
            tracker_url: DEFAULT_TRACKER_URL.to_string(),
            tracker_metadata_url: DEFAULT_TRACKER_METADATA_URL.to_string(),
            image_cdn_url: format!("{DEFAULT_BASE_URL}/rivals"),
            api_keys: Vec::new(),
            tracker_api_keys: Vec::new(),
            default_season: DEFAULT_SEASON.to_string(),
            cache_ttls: CacheTtls::default(),
            retry_policy: RetryPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_quota_wait: Duration::from_secs(60),
            user_agent: format!("rivals-api/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// Default endpoints with the given key pool
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            api_keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Point every domain at one root, e.g. a local mock server.
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.v1_url = format!("{base}/api/v1");
        self.v2_url = format!("{base}/api/v2");
        self.tracker_url = format!("{base}/tracker/v2/marvel-rivals/standard");
        self.tracker_metadata_url = format!("{base}/tracker/v1/marvel-rivals");
        self.image_cdn_url = format!("{base}/rivals");
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_default_season(mut self, season: impl Into<String>) -> Self {
        self.default_season = season.into();
        self
    }

    pub fn with_cache_ttls(mut self, ttls: CacheTtls) -> Self {
        self.cache_ttls = ttls;
        self
    }

    pub fn with_max_quota_wait(mut self, wait: Duration) -> Self {
        self.max_quota_wait = wait;
        self
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            v1_url: std::env::var("RIVALS_V1_URL").unwrap_or(defaults.v1_url),
            v2_url: std::env::var("RIVALS_V2_URL").unwrap_or(defaults.v2_url),
            tracker_url: std::env::var("RIVALS_TRACKER_URL").unwrap_or(defaults.tracker_url),
            tracker_metadata_url: std::env::var("RIVALS_TRACKER_METADATA_URL")
                .unwrap_or(defaults.tracker_metadata_url),
            image_cdn_url: std::env::var("RIVALS_IMAGE_CDN_URL").unwrap_or(defaults.image_cdn_url),
            api_keys: std::env::var("RIVALS_API_KEYS")
                .map(|s| split_keys(&s))
                .unwrap_or_default(),
            tracker_api_keys: std::env::var("RIVALS_TRACKER_API_KEYS")
                .map(|s| split_keys(&s))
                .unwrap_or_default(),
            default_season: std::env::var("RIVALS_DEFAULT_SEASON")
                .unwrap_or(defaults.default_season),
            cache_ttls: CacheTtls::from_env(),
            retry_policy: RetryPolicy::from_env(),
            connect_timeout: secs_var("RIVALS_CONNECT_TIMEOUT").unwrap_or(defaults.connect_timeout),
            request_timeout: secs_var("RIVALS_REQUEST_TIMEOUT").unwrap_or(defaults.request_timeout),
            max_quota_wait: secs_var("RIVALS_MAX_QUOTA_WAIT").unwrap_or(defaults.max_quota_wait),
            user_agent: std::env::var("RIVALS_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }

    /// Reject configurations that cannot serve a single request.
    pub fn validate(&self) -> Result<()> {
        if self.api_keys.is_empty() {
            return Err(ApiError::Config("API key pool is empty".to_string()));
        }
        if self.api_keys.iter().any(|k| k.trim().is_empty()) {
            return Err(ApiError::Config("API key pool contains a blank key".to_string()));
        }
        for (name, url) in [
            ("v1_url", &self.v1_url),
            ("v2_url", &self.v2_url),
            ("tracker_url", &self.tracker_url),
            ("tracker_metadata_url", &self.tracker_metadata_url),
            ("image_cdn_url", &self.image_cdn_url),
        ] {
            let parsed = Url::parse(url)?;
            if parsed.cannot_be_a_base() {
                return Err(ApiError::Config(format!("{name} cannot be used as a base: {url}")));
            }
        }
        Ok(())
    }
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn secs_var(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = ApiConfig::default();
        assert_eq!(config.v1_url, "https://marvelrivalsapi.com/api/v1");
        assert_eq!(config.image_cdn_url, "https://marvelrivalsapi.com/rivals");
        assert_eq!(config.default_season, "13");
        assert_eq!(config.cache_ttls.player, Duration::from_secs(900));
        assert_eq!(config.retry_policy.max_attempts, 3);
    }

    #[test]
    fn test_empty_key_pool_is_rejected() {
        let err = ApiConfig::default().validate();
        assert!(matches!(err, Err(ApiError::Config(_))));
        assert!(ApiConfig::with_keys(["a", "b"]).validate().is_ok());
    }

    #[test]
    fn test_malformed_url_is_rejected() {
        let mut config = ApiConfig::with_keys(["a"]);
        config.v2_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ApiError::InvalidUrl(_))));

        config.v2_url = "mailto:nobody@example.com".to_string();
        assert!(matches!(config.validate(), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_base_url_override() {
        let config = ApiConfig::with_keys(["k"]).with_base_url("http://127.0.0.1:4000/");
        assert_eq!(config.v1_url, "http://127.0.0.1:4000/api/v1");
        assert_eq!(config.v2_url, "http://127.0.0.1:4000/api/v2");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_key_list_from_env() {
        unsafe {
            std::env::set_var("RIVALS_API_KEYS", " one, two ,,three");
            std::env::set_var("RIVALS_PLAYER_TTL", "60");
        }

        let config = ApiConfig::from_env();
        assert_eq!(config.api_keys, vec!["one", "two", "three"]);
        assert_eq!(config.cache_ttls.player, Duration::from_secs(60));

        unsafe {
            std::env::remove_var("RIVALS_API_KEYS");
            std::env::remove_var("RIVALS_PLAYER_TTL");
        }
    }
}
