//! Fetch, retry and validate
//!
//! [`Pipeline::fetch`] runs one logical request end to end:
//!
//! 1. probe the cache (cached absences answer `None` without I/O)
//! 2. resolve the route's [`RouteBucket`], creating it on first use
//! 3. submit each attempt through the bucket with a freshly rotated key
//! 4. map 404 to a cacheable absence and other non-2xx statuses to retryable
//!    upstream errors
//! 5. validate the decoded body, never retrying a schema violation
//! 6. write the validated value through to the cache

use dashmap::DashMap;
use reqwest::StatusCode;
use reqwest::header::{HeaderName, HeaderValue};
use rivals_cache::{CachedValue, ResponseCache};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

use crate::bucket::{QuotaSnapshot, RouteBucket};
use crate::config::ApiConfig;
use crate::endpoint::{Domain, Endpoint};
use crate::error::{ApiError, Result};
use crate::keys::KeyRotator;
use crate::retry::RetryPolicy;
use crate::transport::{HttpClient, HttpConfig, RawResponse};
use crate::validation::{Dto, validate};

enum CacheProbe<T> {
    /// Live entry, `None` for a cached absence
    Hit(Option<T>),
    Miss,
}

#[derive(Clone)]
struct Credentials {
    header: HeaderName,
    keys: Arc<KeyRotator>,
}

impl Credentials {
    fn next(&self) -> Result<(HeaderName, HeaderValue)> {
        let mut value = HeaderValue::from_str(self.keys.next_key())
            .map_err(|e| ApiError::Config(format!("API key is not a valid header value: {e}")))?;
        value.set_sensitive(true);
        Ok((self.header.clone(), value))
    }
}

/// Shared request machinery behind [`Api`](crate::Api)
pub struct Pipeline {
    http: HttpClient,
    cache: Arc<dyn ResponseCache>,
    api_keys: Credentials,
    tracker_keys: Option<Credentials>,
    buckets: DashMap<String, Arc<RouteBucket>>,
    retry: RetryPolicy,
    max_quota_wait: Duration,
    v1_url: String,
    v2_url: String,
    tracker_url: String,
    tracker_metadata_url: String,
}

impl Pipeline {
    pub fn new(config: &ApiConfig, cache: Arc<dyn ResponseCache>) -> Result<Self> {
        config.validate()?;

        let api_keys = Credentials {
            header: HeaderName::from_static(Domain::V1.auth_header()),
            keys: Arc::new(KeyRotator::new(config.api_keys.clone())?),
        };
        let tracker_keys = if config.tracker_api_keys.is_empty() {
            None
        } else {
            Some(Credentials {
                header: HeaderName::from_static(Domain::Tracker.auth_header()),
                keys: Arc::new(KeyRotator::new(config.tracker_api_keys.clone())?),
            })
        };

        Ok(Self {
            http: HttpClient::with_config(&HttpConfig::from(config))?,
            cache,
            api_keys,
            tracker_keys,
            buckets: DashMap::new(),
            retry: config.retry_policy.clone(),
            max_quota_wait: config.max_quota_wait,
            v1_url: config.v1_url.clone(),
            v2_url: config.v2_url.clone(),
            tracker_url: config.tracker_url.clone(),
            tracker_metadata_url: config.tracker_metadata_url.clone(),
        })
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    /// Quota state of every route seen so far.
    pub fn routes(&self) -> Vec<(String, QuotaSnapshot)> {
        let mut routes: Vec<_> = self
            .buckets
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().quota()))
            .collect();
        routes.sort_by(|a, b| a.0.cmp(&b.0));
        routes
    }

    fn base_url(&self, domain: Domain) -> &str {
        match domain {
            Domain::V1 => &self.v1_url,
            Domain::V2 => &self.v2_url,
            Domain::Tracker => &self.tracker_url,
            Domain::TrackerMetadata => &self.tracker_metadata_url,
        }
    }

    fn credentials(&self, domain: Domain) -> Option<Credentials> {
        if domain.is_tracker() {
            self.tracker_keys.clone()
        } else {
            Some(self.api_keys.clone())
        }
    }

    fn bucket(&self, route: &str) -> Arc<RouteBucket> {
        if let Some(bucket) = self.buckets.get(route) {
            return Arc::clone(bucket.value());
        }
        let bucket = self
            .buckets
            .entry(route.to_string())
            .or_insert_with(|| {
                debug!(route, "Creating route bucket");
                Arc::new(RouteBucket::new(route, self.max_quota_wait))
            });
        Arc::clone(bucket.value())
    }

    /// Fetch `endpoint` as `T`. `Ok(None)` means the upstream confirmed the
    /// resource does not exist.
    pub async fn fetch<T: Dto>(&self, endpoint: &Endpoint) -> Result<Option<T>> {
        let route = endpoint.route_key();
        let cache_key = endpoint.cache_key()?;

        if let Some(key) = &cache_key {
            if let CacheProbe::Hit(hit) = self.probe::<T>(key).await {
                debug!(route = %route, key = %key, absent = hit.is_none(), "Cache hit");
                return Ok(hit);
            }
        }

        let url = endpoint.url(self.base_url(endpoint.domain()))?;
        let bucket = self.bucket(&route);
        let credentials = self.credentials(endpoint.domain());

        let body = self
            .retry
            .execute(|| self.attempt(&bucket, credentials.clone(), url.clone()))
            .await?;

        let Some(body) = body else {
            debug!(route = %route, %url, "Upstream reported not found");
            if let (Some(key), Some(ttl)) = (&cache_key, endpoint.ttl()) {
                self.store(key, CachedValue::Absent, ttl).await;
            }
            return Ok(None);
        };

        let value = validate::<T>(body).into_result(&route).map_err(|err| {
            error!(
                route = %err.endpoint,
                %url,
                mismatches = err.mismatches.len(),
                "Upstream schema violation:\n{err}"
            );
            err
        })?;

        if let (Some(key), Some(ttl)) = (&cache_key, endpoint.ttl()) {
            match serde_json::to_vec(&value) {
                Ok(bytes) => self.store(key, CachedValue::present(bytes), ttl).await,
                Err(e) => warn!(key = %key, "Failed to serialize value for cache: {e}"),
            }
        }

        Ok(Some(value))
    }

    /// One dispatch through the route queue.
    async fn attempt(
        &self,
        bucket: &RouteBucket,
        credentials: Option<Credentials>,
        url: Url,
    ) -> Result<Option<Value>> {
        let http = self.http.clone();
        let route = bucket.route().to_string();

        let response = bucket
            .submit(move || async move {
                let auth = credentials.as_ref().map(Credentials::next).transpose()?;
                debug!(route = %route, %url, "Dispatching request");
                http.get(url, auth).await
            })
            .await?;

        if response.status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status.is_success() {
            let message = upstream_message(&response);
            error!(
                route = bucket.route(),
                status = response.status.as_u16(),
                "API request failed with status {}: {message}",
                response.status
            );
            return Err(ApiError::Upstream {
                status: response.status,
                message,
            });
        }

        serde_json::from_slice(&response.body).map(Some).map_err(|e| {
            warn!(route = bucket.route(), "Response body is not JSON: {e}");
            ApiError::InvalidJson(e)
        })
    }

    async fn probe<T: Dto>(&self, key: &str) -> CacheProbe<T> {
        match self.cache.get(key).await {
            Ok(Some(CachedValue::Absent)) => CacheProbe::Hit(None),
            Ok(Some(CachedValue::Present(bytes))) => match serde_json::from_slice(&bytes) {
                Ok(value) => CacheProbe::Hit(Some(value)),
                Err(e) => {
                    warn!(key, "Discarding unreadable cache entry: {e}");
                    CacheProbe::Miss
                }
            },
            Ok(None) => CacheProbe::Miss,
            Err(e) => {
                warn!(key, "Cache read failed, fetching from upstream: {e}");
                CacheProbe::Miss
            }
        }
    }

    async fn store(&self, key: &str, value: CachedValue, ttl: Duration) {
        if let Err(e) = self.cache.set(key, value, ttl).await {
            warn!(key, "Cache write failed: {e}");
        }
    }
}

/// Best-effort error text from a failed response body.
///
/// Tries a JSON `message`, then the first entry of `errors` (a string or an
/// object with `message`), then the raw body, then the status reason.
pub fn upstream_message(response: &RawResponse) -> String {
    let text = response.text();

    if let Ok(json) = serde_json::from_str::<Value>(&text) {
        if let Some(message) = json.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        let first = json
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first());
        if let Some(first) = first {
            if let Some(message) = first
                .as_str()
                .or_else(|| first.get("message").and_then(Value::as_str))
            {
                return message.to_string();
            }
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        response
            .status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}
