//! Retry with exponential back-off for page fetches.
//!
//! Transient failures (timeouts, connection resets, 5xx) are retried.
//! Blocking signals (403, 429, CAPTCHA pages) and parse failures are returned
//! immediately: hammering a storefront that already pushed back only makes the
//! block stickier.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable:
/// - [`ScraperError::Http`] — timeout, connect failure, reset mid-body.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else is a hard stop, in particular [`ScraperError::Blocked`].
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(e) => !e.is_builder() && !e.is_redirect(),
        ScraperError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        ScraperError::Blocked { .. }
        | ScraperError::NotFound { .. }
        | ScraperError::BodyTooLarge { .. }
        | ScraperError::Parse { .. }
        | ScraperError::InvalidUrl { .. }
        | ScraperError::Normalization { .. }
        | ScraperError::ExtractionFailed { .. } => false,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times.
///
/// The wait before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 % jitter,
/// capped at 30 s. With `max_retries = 2` the operation runs at most 3 times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient fetch error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
