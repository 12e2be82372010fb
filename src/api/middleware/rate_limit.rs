//! Fixed-window rate limiting for the public verification routes
//!
//! Each client key gets `max_requests` per window. The key is the peer
//! address when the server runs with connect info, otherwise the first
//! `X-Forwarded-For` hop, otherwise `"anonymous"`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;
use crate::error::{ServerError, ServerResult};

/// Buckets are swept once the map grows past this many keys
const SWEEP_THRESHOLD: usize = 10_000;

/// Rate limiter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window, 0 disables the limiter
    pub max_requests: u32,

    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    /// Create config from environment variables
    ///
    /// `CERTIFY_VERIFY_RATE_LIMIT` requests per `CERTIFY_VERIFY_RATE_WINDOW_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: std::env::var("CERTIFY_VERIFY_RATE_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window_secs: std::env::var("CERTIFY_VERIFY_RATE_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.window_secs),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    window_start: Instant,
}

/// Shared per-key request counters
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.max_requests > 0
    }

    /// Count one request for `key`
    ///
    /// # Errors
    /// * `RateLimited` - window exhausted, carries the seconds until it resets
    /// * `Internal` - lock poisoned
    pub fn check(&self, key: &str) -> ServerResult<()> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> ServerResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let window = self.config.window();
        let mut buckets = self
            .buckets
            .lock()
            .map_err(|_| ServerError::Internal("rate limit lock poisoned".into()))?;

        if buckets.len() >= SWEEP_THRESHOLD {
            buckets.retain(|_, b| now.duration_since(b.window_start) < window);
        }

        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            window_start: now,
        });

        let elapsed = now.duration_since(bucket.window_start);
        if elapsed >= window {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= self.config.max_requests {
            let remaining = window.saturating_sub(now.duration_since(bucket.window_start));
            // Round up so clients never retry a moment too early
            let retry_after_secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
            return Err(ServerError::RateLimited {
                retry_after_secs: retry_after_secs.max(1),
            });
        }

        bucket.count += 1;
        Ok(())
    }
}

/// Rate limiting middleware for the verification routes
///
/// Returns 429 `RATE_LIMITED` with `Retry-After` once the client's
/// window is used up.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let key = client_key(&req);

    if let Err(e) = state.verify_limiter.check(&key) {
        if matches!(e, ServerError::RateLimited { .. }) {
            tracing::warn!(client = %key, path = %req.uri().path(), "Verification rate limit hit");
        }
        return Err(e);
    }

    Ok(next.run(req).await)
}

fn client_key(req: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}
