use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use prodlens_core::AppConfig;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Caller-supplied ids longer than this are replaced with a generated one.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id for one request, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Fixed-window throttle in front of the scrape, ask, and compare routes.
///
/// Every scrape or compare call fans out to third-party storefronts, so the
/// budget is process-wide rather than per caller.
#[derive(Debug, Clone)]
pub struct ApiRateLimiter {
    max_requests: usize,
    window: Duration,
    current: Arc<Mutex<Window>>,
}

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    admitted: usize,
}

/// Outcome of asking the limiter for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Admitted,
    Throttled { retry_after: Duration },
}

impl ApiRateLimiter {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            current: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                admitted: 0,
            })),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            config.api_rate_limit_requests,
            Duration::from_secs(config.api_rate_limit_window_secs),
        )
    }

    async fn admit(&self) -> Admission {
        let mut window = self.current.lock().await;
        let elapsed = window.opened_at.elapsed();
        if elapsed >= self.window {
            window.opened_at = Instant::now();
            window.admitted = 0;
        }
        if window.admitted >= self.max_requests {
            return Admission::Throttled {
                retry_after: self.window.saturating_sub(window.opened_at.elapsed()),
            };
        }
        window.admitted += 1;
        Admission::Admitted
    }
}

/// Tags each request with a [`RequestId`] and echoes it on the response.
///
/// A non-blank `x-request-id` from the caller is reused so logs line up with
/// the presentation layer; otherwise a `UUIDv4` is minted.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}

/// Rejects API calls past the window budget with `429 rate_limited` and a
/// `Retry-After` header, in the same envelope as every other API error.
pub async fn throttle_api(
    State(limiter): State<ApiRateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let Admission::Throttled { retry_after } = limiter.admit().await else {
        return next.run(req).await;
    };

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    // Round up so a client never retries before the window reopens.
    let retry_after_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    tracing::warn!(
        request_id = %request_id,
        route = %req.uri().path(),
        limit = limiter.max_requests,
        retry_after_secs,
        "api request throttled"
    );

    let mut res = ApiError::new(
        request_id,
        "rate_limited",
        format!("too many requests; retry in {retry_after_secs}s"),
    )
    .into_response();
    res.headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    res
}
