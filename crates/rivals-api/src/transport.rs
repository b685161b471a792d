//! HTTP transport
//!
//! A thin wrapper around a pooled `reqwest` client. Response bodies are read
//! in full so the bucket worker can release its slot as soon as the request
//! settles.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::sync::{Arc, Once};
use std::time::Duration;
use url::Url;

use crate::config::ApiConfig;
use crate::error::Result;

static CRYPTO_PROVIDER: Once = Once::new();

/// Install the ring provider for rustls once per process.
pub fn ensure_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Another component may already have installed one.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub tcp_nodelay: bool,
    pub tcp_keepalive: Option<Duration>,
    pub enable_compression: bool,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 8,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            tcp_nodelay: true,
            tcp_keepalive: Some(Duration::from_secs(60)),
            enable_compression: true,
            user_agent: format!("rivals-api/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&ApiConfig> for HttpConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            timeout: config.request_timeout,
            connect_timeout: config.connect_timeout,
            user_agent: config.user_agent.clone(),
            ..Self::default()
        }
    }
}

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    /// Body as lossy UTF-8, for logging and error extraction.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Pooled HTTP client shared by every route worker
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        ensure_crypto_provider();

        let mut builder = ClientBuilder::new()
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .tcp_nodelay(config.tcp_nodelay)
            .tcp_keepalive(config.tcp_keepalive)
            .redirect(reqwest::redirect::Policy::limited(3))
            .user_agent(config.user_agent.clone());

        if config.enable_compression {
            builder = builder.gzip(true).brotli(true).deflate(true);
        }

        let client = builder.build()?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// GET `url` with an optional auth header and buffer the body.
    pub async fn get(&self, url: Url, auth: Option<(HeaderName, HeaderValue)>) -> Result<RawResponse> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some((name, value)) = auth {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
