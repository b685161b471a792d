//! # rivals-api
//!
//! Client for the Marvel Rivals stats API and the tracking service that
//! backs player career pages.
//!
//! Requests go through one pipeline:
//!
//! - **Cache**: responses and confirmed 404s are kept in a
//!   [`ResponseCache`](rivals_cache::ResponseCache) with per-endpoint TTLs
//! - **Route buckets**: requests against the same route template run one at
//!   a time in arrival order, guided by the upstream's quota headers
//! - **Key rotation**: each dispatched request uses the next key of the pool
//! - **Retry**: transient failures are retried on a fixed schedule
//! - **Validation**: every 2xx body is checked against the endpoint's DTO
//!   shape; mismatches fail the call and are never cached
//!
//! ```rust,no_run
//! use rivals_api::{Api, ApiConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Api::new(ApiConfig::from_env())?;
//!
//!     match api.get_player("Iron-Fist", None).await? {
//!         Some(player) => println!("{} is level {}", player.name, player.player.level),
//!         None => println!("player not found"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bucket;
pub mod config;
pub mod dto;
pub mod endpoint;
pub mod error;
pub mod keys;
pub mod pipeline;
pub mod retry;
pub mod tracker;
pub mod transport;
pub mod validation;

pub use api::{Api, MatchHistoryOptions};
pub use bucket::{QuotaSnapshot, RouteBucket};
pub use config::{ApiConfig, CacheTtls};
pub use endpoint::{Domain, Endpoint};
pub use error::{ApiError, Result};
pub use keys::KeyRotator;
pub use retry::RetryPolicy;
pub use tracker::GameMode;
pub use validation::{Dto, Mismatch, Shape, Validation, ValidationError};

pub use rivals_cache;
