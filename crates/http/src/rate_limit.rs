//! Per-client sliding-window request limiting.
//!
//! Each client address keeps a log of the instants of its admitted requests.
//! A request is admitted while fewer than `max_requests` entries fall inside
//! the trailing window. Rejected requests are not logged, so a client that
//! keeps hammering a route regains access once its oldest admitted request
//! ages out.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderName, HeaderValue, Request, Response},
    response::IntoResponse,
};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::time::Instant;
use tower::{Layer, Service};

use catalog_kernel::settings::RateLimitSettings;

use crate::error::AppError;

pub static RATE_LIMIT_LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub static RATE_LIMIT_REMAINING_HEADER: HeaderName =
    HeaderName::from_static("x-ratelimit-remaining");

/// Bucket shared by requests that carry no peer address.
const UNKNOWN_CLIENT: &str = "unknown";

/// Number of checks between sweeps of idle buckets.
const SWEEP_INTERVAL: u64 = 1024;

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: usize },
    Limited { retry_after: Duration },
}

#[derive(Debug, Default)]
struct Buckets {
    hits: HashMap<String, VecDeque<Instant>>,
    checks: u64,
}

fn expire(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while log
        .front()
        .is_some_and(|oldest| now.duration_since(*oldest) >= window)
    {
        log.pop_front();
    }
}

/// Sliding-window counter keyed by client.
#[derive(Debug)]
pub struct SlidingWindow {
    window: Duration,
    max_requests: usize,
    message: String,
    buckets: Mutex<Buckets>,
}

impl SlidingWindow {
    pub fn new(window: Duration, max_requests: usize, message: impl Into<String>) -> Self {
        Self {
            window,
            max_requests,
            message: message.into(),
            buckets: Mutex::new(Buckets::default()),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(
            Duration::from_secs(settings.window_secs),
            settings.max_requests,
            settings.message.clone(),
        )
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Admit or reject one request from `client` at the current instant.
    pub fn check(&self, client: &str) -> Decision {
        let now = Instant::now();
        let mut buckets = self.buckets.lock();

        buckets.checks = buckets.checks.wrapping_add(1);
        if buckets.checks % SWEEP_INTERVAL == 0 {
            let window = self.window;
            buckets.hits.retain(|_, log| {
                expire(log, now, window);
                !log.is_empty()
            });
        }

        let log = buckets.hits.entry(client.to_string()).or_default();
        expire(log, now, self.window);

        if log.len() >= self.max_requests {
            let retry_after = log
                .front()
                .map_or(self.window, |oldest| {
                    self.window.saturating_sub(now.duration_since(*oldest))
                });
            return Decision::Limited { retry_after };
        }

        log.push_back(now);
        Decision::Allowed {
            remaining: self.max_requests - log.len(),
        }
    }

    /// Number of clients currently holding a non-empty bucket entry.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().hits.len()
    }
}

/// Layer applying a [`SlidingWindow`] to the wrapped routes.
///
/// The client is identified by the peer IP from `ConnectInfo<SocketAddr>`, so the
/// server must be run with `into_make_service_with_connect_info::<SocketAddr>()`.
#[derive(Debug, Clone)]
pub struct RateLimitLayer {
    limiter: Arc<SlidingWindow>,
}

impl RateLimitLayer {
    pub fn new(limiter: Arc<SlidingWindow>) -> Self {
        Self { limiter }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(Arc::new(SlidingWindow::from_settings(settings)))
    }
}

impl<InnerService> Layer<InnerService> for RateLimitLayer {
    type Service = RateLimitService<InnerService>;

    fn layer(&self, inner: InnerService) -> Self::Service {
        RateLimitService {
            inner,
            limiter: Arc::clone(&self.limiter),
        }
    }
}

/// Service produced by [`RateLimitLayer`].
#[derive(Debug, Clone)]
pub struct RateLimitService<InnerService> {
    inner: InnerService,
    limiter: Arc<SlidingWindow>,
}

fn client_key<RequestBody>(request: &Request<RequestBody>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(
            || UNKNOWN_CLIENT.to_string(),
            |ConnectInfo(addr)| addr.ip().to_string(),
        )
}

impl<InnerService, RequestBody> Service<Request<RequestBody>> for RateLimitService<InnerService>
where
    InnerService: Service<Request<RequestBody>, Response = Response<Body>> + Clone + Send + 'static,
    InnerService::Future: Send,
    RequestBody: Send + 'static,
{
    type Response = Response<Body>;
    type Error = InnerService::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, context: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(context)
    }

    fn call(&mut self, request: Request<RequestBody>) -> Self::Future {
        let client = client_key(&request);
        let limit = self.limiter.max_requests();

        let remaining = match self.limiter.check(&client) {
            Decision::Allowed { remaining } => remaining,
            Decision::Limited { retry_after } => {
                tracing::warn!(%client, limit, "rate limit exceeded");
                let mut response =
                    AppError::too_many_requests(self.limiter.message.clone(), retry_after)
                        .into_response();
                set_budget_headers(&mut response, limit, 0);
                return Box::pin(async move { Ok(response) });
            }
        };

        // Drive the instance that was polled ready; keep a fresh clone for the next call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            set_budget_headers(&mut response, limit, remaining);
            Ok(response)
        })
    }
}

fn set_budget_headers(response: &mut Response<Body>, limit: usize, remaining: usize) {
    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT_HEADER.clone(), HeaderValue::from(limit));
    headers.insert(
        RATE_LIMIT_REMAINING_HEADER.clone(),
        HeaderValue::from(remaining),
    );
}
