//! Per-route request serialization
//!
//! Every logical route owns one [`RouteBucket`]. Requests submitted to a
//! bucket are executed by a single worker task, strictly one at a time and in
//! submission order. After each request the worker records the quota the
//! upstream reported for that route; when the quota is exhausted the next
//! request waits for the reset.

use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, trace};

use crate::error::{ApiError, Result};
use crate::transport::RawResponse;

pub const RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Header value set by the upstream's caching proxy instead of a number.
pub const CACHED_SENTINEL: &str = "cache";

type Job = Box<dyn FnOnce() -> BoxFuture<'static, Result<RawResponse>> + Send>;

struct QueuedTask {
    job: Job,
    reply: oneshot::Sender<Result<RawResponse>>,
}

/// How a single quota header read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderReading {
    Missing,
    /// Served from the proxy cache; carries no quota information
    Cached,
    Value(u64),
    Invalid,
}

fn read_header(headers: &HeaderMap, name: &str) -> HeaderReading {
    let Some(raw) = headers.get(name) else {
        return HeaderReading::Missing;
    };
    let Ok(text) = raw.to_str() else {
        return HeaderReading::Invalid;
    };
    let text = text.trim();
    if text == CACHED_SENTINEL {
        return HeaderReading::Cached;
    }
    text.parse().map_or(HeaderReading::Invalid, HeaderReading::Value)
}

#[derive(Debug, Default)]
struct RateLimitState {
    limit: Option<u64>,
    remaining: Option<u64>,
    reset_at: Option<Instant>,
}

impl RateLimitState {
    fn update(&mut self, route: &str, headers: &HeaderMap) {
        let limit = read_header(headers, RATELIMIT_LIMIT);
        let remaining = read_header(headers, RATELIMIT_REMAINING);
        let reset = read_header(headers, RATELIMIT_RESET);

        if [limit, remaining, reset].contains(&HeaderReading::Cached) {
            trace!(route, "Quota headers came from proxy cache, keeping previous state");
            return;
        }

        if let HeaderReading::Value(v) = limit {
            self.limit = Some(v);
        }
        if let HeaderReading::Value(v) = remaining {
            self.remaining = Some(v);
        }
        if let HeaderReading::Value(epoch_secs) = reset {
            let now_secs = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
            let after = Duration::from_secs(epoch_secs.saturating_sub(now_secs));
            match Instant::now().checked_add(after) {
                Some(at) => self.reset_at = Some(at),
                None => debug!(route, epoch_secs, "Ignoring out-of-range quota reset"),
            }
        }
    }

    /// Delay before the next dispatch, if the quota is spent.
    fn admission_delay(&self, ceiling: Duration) -> Option<Duration> {
        if self.remaining != Some(0) {
            return None;
        }
        let wait = self.reset_at?.saturating_duration_since(Instant::now());
        (!wait.is_zero()).then(|| wait.min(ceiling))
    }

    fn snapshot(&self) -> QuotaSnapshot {
        QuotaSnapshot {
            limit: self.limit,
            remaining: self.remaining,
            reset_after: self
                .reset_at
                .map(|at| at.saturating_duration_since(Instant::now())),
        }
    }
}

/// Last quota the upstream reported for a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub reset_after: Option<Duration>,
}

/// FIFO request queue for one route.
#[derive(Debug)]
pub struct RouteBucket {
    route: String,
    sender: mpsc::UnboundedSender<QueuedTask>,
    state: Arc<Mutex<RateLimitState>>,
}

impl RouteBucket {
    /// Spawns the route's worker on the current runtime.
    pub fn new(route: impl Into<String>, max_quota_wait: Duration) -> Self {
        let route = route.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(RateLimitState::default()));

        tokio::spawn(run_worker(
            route.clone(),
            receiver,
            Arc::clone(&state),
            max_quota_wait,
        ));

        Self {
            route,
            sender,
            state,
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn quota(&self) -> QuotaSnapshot {
        self.state.lock().snapshot()
    }

    /// Queue `job` behind everything already submitted to this route.
    ///
    /// The task is enqueued when this is called, not when the returned future
    /// is first polled. Dropping the future before the task is dispatched
    /// removes it from the queue.
    pub fn submit<F, Fut>(&self, job: F) -> impl Future<Output = Result<RawResponse>> + Send + 'static
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<RawResponse>> + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let task = QueuedTask {
            job: Box::new(move || job().boxed()),
            reply,
        };
        let queued = self.sender.send(task).is_ok();
        let route = self.route.clone();

        async move {
            if !queued {
                return Err(ApiError::QueueClosed(route));
            }
            response
                .await
                .unwrap_or_else(|_| Err(ApiError::QueueClosed(route)))
        }
    }
}

async fn run_worker(
    route: String,
    mut receiver: mpsc::UnboundedReceiver<QueuedTask>,
    state: Arc<Mutex<RateLimitState>>,
    max_quota_wait: Duration,
) {
    while let Some(task) = receiver.recv().await {
        if task.reply.is_closed() {
            debug!(route = %route, "Skipping request abandoned by its caller");
            continue;
        }

        let delay = state.lock().admission_delay(max_quota_wait);
        if let Some(delay) = delay {
            debug!(route = %route, ?delay, "Route quota exhausted, waiting for reset");
            tokio::time::sleep(delay).await;
        }

        let outcome = match AssertUnwindSafe((task.job)()).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(route = %route, "Request panicked, continuing with the next one");
                Err(ApiError::Aborted(route.clone()))
            }
        };
        if let Ok(response) = &outcome {
            state.lock().update(&route, &response.headers);
        }

        // The caller may have given up while the request was in flight.
        let _ = task.reply.send(outcome);
    }
    trace!(route = %route, "Route worker stopped");
}
