//! Fixed-window request rate limiting.
//!
//! Quota is tracked per client key in a sharded concurrent map. Counters
//! reset at fixed intervals rather than sliding, so a burst straddling a
//! window boundary can briefly see up to twice the nominal rate; that
//! trade buys O(1) time and memory per client on the hot path. State is
//! process-local and lost on restart.

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::error::ErrorBody;
use crate::models::AppState;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Fallback identity when the transport supplies no client address.
const UNKNOWN_CLIENT: &str = "unknown";

/// Immutable rate limiting policy, injected at construction.
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    pub max_calls: u32,
    pub window_seconds: i64,
    pub exempt_paths: HashSet<String>,
}

impl From<&RateLimitConfig> for LimiterConfig {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            max_calls: config.max_calls,
            window_seconds: config.window_seconds,
            exempt_paths: config.exempt_paths.iter().cloned().collect(),
        }
    }
}

/// Per-client quota state. `window_start` only moves forward across resets.
#[derive(Debug)]
struct ClientWindow {
    count: u32,
    window_start: i64,
}

/// Outcome of a quota check, carrying the values the caller needs for the
/// `X-RateLimit-*` response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Admit {
        limit: u32,
        remaining: u32,
        reset: i64,
    },
    Reject {
        limit: u32,
        remaining: u32,
        reset: i64,
        retry_after: u64,
    },
}

impl Decision {
    pub fn is_admit(&self) -> bool {
        matches!(self, Decision::Admit { .. })
    }
}

pub struct RateLimiter {
    config: LimiterConfig,
    clients: DashMap<String, ClientWindow>,
}

impl RateLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            config,
            clients: DashMap::new(),
        }
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.config.exempt_paths.contains(path)
    }

    /// Decide whether to admit a request observed at `now` (unix seconds).
    ///
    /// Total over its inputs: never fails, never blocks beyond the map
    /// shard lock. Concurrent calls for the same key serialize on the
    /// entry, so counts are never lost.
    pub fn check(&self, client_key: &str, path: &str, now: i64) -> Decision {
        if self.is_exempt(path) {
            return Decision::Admit {
                limit: self.config.max_calls,
                remaining: self.config.max_calls,
                reset: now + self.config.window_seconds,
            };
        }

        let key = if client_key.is_empty() {
            UNKNOWN_CLIENT
        } else {
            client_key
        };

        let mut window = self
            .clients
            .entry(key.to_string())
            .or_insert(ClientWindow {
                count: 0,
                window_start: now,
            });

        if now - window.window_start >= self.config.window_seconds {
            window.count = 0;
            window.window_start = now;
        }

        let limit = self.config.max_calls;
        let reset = window.window_start + self.config.window_seconds;

        if window.count >= limit {
            let retry_after = (self.config.window_seconds - (now - window.window_start)).max(0);
            return Decision::Reject {
                limit,
                remaining: 0,
                reset,
                retry_after: retry_after as u64,
            };
        }

        window.count += 1;
        Decision::Admit {
            limit,
            remaining: limit - window.count,
            reset,
        }
    }

    /// Drop client entries whose window has aged out; they would reset on
    /// next access anyway. Returns the number of evicted entries.
    pub fn purge(&self, now: i64) -> usize {
        let before = self.clients.len();
        self.clients
            .retain(|_, window| now - window.window_start < self.config.window_seconds);
        before - self.clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

/// Middleware entry point: admit or short-circuit with 429.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    // Exempt routes bypass the limiter before any state lookup
    if state.limiter.is_exempt(&path) {
        return next.run(req).await;
    }

    let client_key = client_key(&req);
    let now = chrono::Utc::now().timestamp();

    match state.limiter.check(&client_key, &path, now) {
        Decision::Admit {
            limit,
            remaining,
            reset,
        } => {
            let mut response = next.run(req).await;
            set_quota_headers(&mut response, limit, remaining, reset);
            response
        }
        Decision::Reject {
            limit,
            remaining,
            reset,
            retry_after,
        } => {
            tracing::warn!(client = %client_key, %path, retry_after, "rate limit exceeded");

            let body = ErrorBody::new(
                "RATE_LIMIT_EXCEEDED",
                format!(
                    "Rate limit exceeded: {} requests per {} seconds",
                    limit, state.config.rate_limit.window_seconds
                ),
            )
            .with_retry_after(retry_after);

            let mut response =
                (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            set_quota_headers(&mut response, limit, remaining, reset);
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
            response
        }
    }
}

/// Client identity: first `X-Forwarded-For` hop, else the peer address,
/// else the sentinel.
fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn set_quota_headers(response: &mut Response, limit: u32, remaining: u32, reset: i64) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&limit.to_string()) {
        headers.insert(X_RATELIMIT_LIMIT, value);
    }
    if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
        headers.insert(X_RATELIMIT_REMAINING, value);
    }
    if let Ok(value) = HeaderValue::from_str(&reset.to_string()) {
        headers.insert(X_RATELIMIT_RESET, value);
    }
}
