//! Endpoint descriptions
//!
//! An [`Endpoint`] names one logical upstream request: which base URL it
//! targets, its path template, the concrete parameter values, query
//! parameters and an optional cache TTL. Two keys are derived from it:
//!
//! - the route key (`domain:template`) groups requests for quota accounting
//! - the cache key (`domain:path?sorted-query`) identifies one response

use std::fmt;
use std::time::Duration;
use url::{Url, form_urlencoded};

use crate::error::{ApiError, Result};

/// Upstream base URL family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    V1,
    V2,
    Tracker,
    TrackerMetadata,
}

impl Domain {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::Tracker => "tracker",
            Self::TrackerMetadata => "tracker-metadata",
        }
    }

    /// Header carrying the rotated credential
    pub const fn auth_header(self) -> &'static str {
        match self {
            Self::V1 | Self::V2 => "x-api-key",
            Self::Tracker | Self::TrackerMetadata => "trn-api-key",
        }
    }

    pub const fn is_tracker(self) -> bool {
        matches!(self, Self::Tracker | Self::TrackerMetadata)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    domain: Domain,
    template: &'static str,
    params: Vec<String>,
    query: Vec<(&'static str, String)>,
    ttl: Option<Duration>,
}

impl Endpoint {
    /// `template` uses `:name` segments for path parameters.
    pub fn new(domain: Domain, template: &'static str) -> Self {
        Self {
            domain,
            template,
            params: Vec::new(),
            query: Vec::new(),
            ttl: None,
        }
    }

    /// Value for the next `:name` segment, in template order.
    pub fn param(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }

    /// `None` leaves the parameter out entirely.
    pub fn query(mut self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.query.push((name, value.into()));
        }
        self
    }

    pub fn cached(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub const fn domain(&self) -> Domain {
        self.domain
    }

    pub const fn template(&self) -> &'static str {
        self.template
    }

    pub const fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn route_key(&self) -> String {
        format!("{}:{}", self.domain, self.template)
    }

    /// Concrete path segments with parameters substituted.
    pub fn segments(&self) -> Result<Vec<&str>> {
        let mut params = self.params.iter();
        let segments = self
            .template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                if segment.starts_with(':') {
                    params.next().map(String::as_str).ok_or_else(|| {
                        ApiError::Config(format!(
                            "no value for {segment} in {}",
                            self.template
                        ))
                    })
                } else {
                    Ok(segment)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        if params.next().is_some() {
            return Err(ApiError::Config(format!(
                "too many path parameters for {}",
                self.template
            )));
        }
        Ok(segments)
    }

    /// Key under which the response is cached, if caching is enabled.
    ///
    /// Path segments and query pairs are form-encoded so values containing
    /// `/`, `?`, `&` or `=` cannot collide with another parameterization.
    pub fn cache_key(&self) -> Result<Option<String>> {
        if self.ttl.is_none() {
            return Ok(None);
        }

        let path: Vec<String> = self
            .segments()?
            .into_iter()
            .map(|segment| form_urlencoded::byte_serialize(segment.as_bytes()).collect())
            .collect();
        let mut key = format!("{}:{}", self.domain, path.join("/"));

        if !self.query.is_empty() {
            let mut pairs: Vec<(&str, &str)> = self
                .query
                .iter()
                .map(|(name, value)| (*name, value.as_str()))
                .collect();
            pairs.sort_unstable();
            key.push('?');
            key.push_str(
                &form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish(),
            );
        }
        Ok(Some(key))
    }

    /// Full request URL below `base`.
    pub fn url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base)?;
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ApiError::Config(format!("{base} cannot be used as a base URL"))
            })?;
            path.pop_if_empty().extend(self.segments()?);
        }

        if self.query.is_empty() {
            url.set_query(None);
        } else {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_route_key_ignores_parameter_values() {
        let a = Endpoint::new(Domain::V1, "player/:id").param("1");
        let b = Endpoint::new(Domain::V1, "player/:id").param("2");
        assert_eq!(a.route_key(), "v1:player/:id");
        assert_eq!(a.route_key(), b.route_key());
    }

    #[test]
    fn test_cache_key_covers_path_and_query() {
        let pc = Endpoint::new(Domain::V1, "heroes/leaderboard/:id")
            .param("12")
            .query("platform", Some("pc"))
            .cached(Duration::from_secs(60));
        let xbox = Endpoint::new(Domain::V1, "heroes/leaderboard/:id")
            .param("12")
            .query("platform", Some("xbox"))
            .cached(Duration::from_secs(60));

        assert_eq!(
            pc.cache_key().expect("Operation should succeed").as_deref(),
            Some("v1:heroes/leaderboard/12?platform=pc")
        );
        assert_ne!(
            pc.cache_key().expect("Operation should succeed"),
            xbox.cache_key().expect("Operation should succeed")
        );
    }

    #[test]
    fn test_reserved_characters_do_not_collide_in_cache_key() {
        let smuggled = Endpoint::new(Domain::V1, "heroes/leaderboard/:id")
            .param("12?platform=pc")
            .cached(Duration::from_secs(60));
        let real = Endpoint::new(Domain::V1, "heroes/leaderboard/:id")
            .param("12")
            .query("platform", Some("pc"))
            .cached(Duration::from_secs(60));
        assert_ne!(
            smuggled.cache_key().expect("Operation should succeed"),
            real.cache_key().expect("Operation should succeed")
        );

        let slash = Endpoint::new(Domain::V1, "find-player/:name")
            .param("a/b")
            .cached(Duration::from_secs(60));
        assert_eq!(
            slash.cache_key().expect("Operation should succeed").as_deref(),
            Some("v1:find-player/a%2Fb")
        );

        let joined = Endpoint::new(Domain::Tracker, "search")
            .query("query", Some("a&platform=pc"))
            .cached(Duration::from_secs(60));
        let split = Endpoint::new(Domain::Tracker, "search")
            .query("query", Some("a"))
            .query("platform", Some("pc"))
            .cached(Duration::from_secs(60));
        assert_ne!(
            joined.cache_key().expect("Operation should succeed"),
            split.cache_key().expect("Operation should succeed")
        );
    }

    #[test]
    fn test_query_order_does_not_change_cache_key() {
        let a = Endpoint::new(Domain::V2, "player/:id/match-history")
            .param("7")
            .query("season", Some("13"))
            .query("page", Some("2"))
            .cached(Duration::from_secs(1));
        let b = Endpoint::new(Domain::V2, "player/:id/match-history")
            .param("7")
            .query("page", Some("2"))
            .query("season", Some("13"))
            .cached(Duration::from_secs(1));
        assert_eq!(
            a.cache_key().expect("Operation should succeed"),
            b.cache_key().expect("Operation should succeed")
        );
    }

    #[test]
    fn test_missing_query_values_are_omitted() {
        let endpoint = Endpoint::new(Domain::V1, "maps")
            .query("page", None::<String>)
            .query("limit", Some("10"))
            .cached(Duration::from_secs(1));

        assert_eq!(
            endpoint.cache_key().expect("Operation should succeed").as_deref(),
            Some("v1:maps?limit=10")
        );
        let url = endpoint
            .url("https://marvelrivalsapi.com/api/v1")
            .expect("Operation should succeed");
        assert_eq!(url.as_str(), "https://marvelrivalsapi.com/api/v1/maps?limit=10");
    }

    #[test]
    fn test_uncached_endpoint_has_no_cache_key() {
        let endpoint = Endpoint::new(Domain::V1, "patch-note/:id").param("abc");
        assert_eq!(endpoint.cache_key().expect("Operation should succeed"), None);
    }

    #[test]
    fn test_url_escapes_parameter_values() {
        let endpoint = Endpoint::new(Domain::V1, "find-player/:name").param("Iron Fist/2");
        let url = endpoint
            .url("https://marvelrivalsapi.com/api/v1/")
            .expect("Operation should succeed");
        assert_eq!(
            url.as_str(),
            "https://marvelrivalsapi.com/api/v1/find-player/Iron%20Fist%2F2"
        );
    }

    #[test]
    fn test_parameter_count_must_match_template() {
        let missing = Endpoint::new(Domain::V1, "player/:id");
        assert!(matches!(missing.segments(), Err(ApiError::Config(_))));

        let extra = Endpoint::new(Domain::V1, "heroes").param("x");
        assert!(matches!(extra.segments(), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_tracker_domains_use_their_own_auth_header() {
        assert_eq!(Domain::V1.auth_header(), "x-api-key");
        assert_eq!(Domain::Tracker.auth_header(), "trn-api-key");
        assert!(Domain::TrackerMetadata.is_tracker());
    }
}
