//! HTML fetcher for product and search pages.
//!
//! Sends browser-like headers, follows redirects, bounds every request with a
//! timeout and the body with a size cap, and classifies anti-bot responses as
//! [`ScraperError::Blocked`] so callers never retry into a block.

mod block;
mod headers;

use std::time::Duration;

use prodlens_core::AppConfig;
use reqwest::{Client, StatusCode, Url};

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

/// Fetch policy knobs, usually taken from [`AppConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    /// Additional attempts after the first for transient failures.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub max_body_bytes: usize,
}

impl FetchSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.fetch_timeout_secs,
            max_retries: config.fetch_max_retries,
            backoff_base_ms: config.fetch_backoff_base_ms,
            max_body_bytes: config.fetch_max_body_bytes,
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_retries: 2,
            backoff_base_ms: 500,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// A complete HTML payload and the URL it was finally served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub requested_url: String,
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub html: String,
}

impl RawDocument {
    /// Wraps HTML obtained elsewhere (a saved page, a test fixture).
    #[must_use]
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            requested_url: url.clone(),
            final_url: url,
            status: 200,
            html: html.into(),
        }
    }
}

/// HTTP client for storefront pages. Cheap to clone; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    settings: FetchSettings,
}

impl Fetcher {
    /// Creates a `Fetcher` with the configured timeout and redirect policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: FetchSettings) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client, settings })
    }

    #[must_use]
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Fetches `url` and returns the full HTML body.
    ///
    /// Transient failures (network errors, 5xx) are retried with backoff.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] — `url` is not an absolute http(s) URL.
    /// - [`ScraperError::Blocked`] — 403, 429, or a CAPTCHA interstitial (not retried).
    /// - [`ScraperError::NotFound`] — 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] — other non-2xx status (5xx retried).
    /// - [`ScraperError::BodyTooLarge`] — body exceeded `max_body_bytes`.
    /// - [`ScraperError::Parse`] — empty body or a non-HTML content type.
    /// - [`ScraperError::Http`] — network failure after all retries.
    pub async fn fetch(&self, url: &str) -> Result<RawDocument, ScraperError> {
        let parsed = parse_page_url(url)?;
        let settings = &self.settings;

        retry_with_backoff(settings.max_retries, settings.backoff_base_ms, || {
            self.fetch_once(parsed.clone())
        })
        .await
    }

    async fn fetch_once(&self, url: Url) -> Result<RawDocument, ScraperError> {
        let requested_url = url.to_string();
        tracing::debug!(url = %requested_url, "fetching page");

        let mut response = self
            .client
            .get(url)
            .headers(headers::browser_headers())
            .send()
            .await?;
        let status = response.status();
        let final_url = response.url().to_string();

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(url = %requested_url, status = status.as_u16(), "storefront blocked request");
            return Err(ScraperError::Blocked {
                url: requested_url,
                status: Some(status.as_u16()),
                reason: format!("HTTP {status}"),
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound { url: requested_url });
        }
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: requested_url,
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html_content_type(content_type) {
                return Err(ScraperError::Parse {
                    url: requested_url,
                    reason: format!("expected an HTML document, got content-type {content_type}"),
                });
            }
        }

        let limit = self.settings.max_body_bytes;
        if response
            .content_length()
            .is_some_and(|len| usize::try_from(len).map_or(true, |len| len > limit))
        {
            return Err(ScraperError::BodyTooLarge {
                url: requested_url,
                limit,
            });
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(ScraperError::BodyTooLarge {
                    url: requested_url,
                    limit,
                });
            }
            body.extend_from_slice(&chunk);
        }

        let html = String::from_utf8_lossy(&body).into_owned();
        if html.trim().is_empty() {
            return Err(ScraperError::Parse {
                url: requested_url,
                reason: "empty response body".to_owned(),
            });
        }

        if let Some(marker) = block::detect_block_page(&html) {
            tracing::warn!(url = %requested_url, marker, "challenge page served");
            return Err(ScraperError::Blocked {
                url: requested_url,
                status: Some(status.as_u16()),
                reason: format!("challenge page ({marker})"),
            });
        }

        Ok(RawDocument {
            requested_url,
            final_url,
            status: status.as_u16(),
            html,
        })
    }
}

/// Parses an absolute http(s) URL.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] for anything else.
pub fn parse_page_url(url: &str) -> Result<Url, ScraperError> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: "expected an http(s) URL with a host".to_owned(),
        });
    }
    Ok(parsed)
}

fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("html") || lower.contains("xml") || lower.starts_with("text/plain")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_page_url_rejects_relative_and_non_http() {
        assert!(matches!(
            parse_page_url("/dp/B0"),
            Err(ScraperError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_page_url("ftp://shop.example/p"),
            Err(ScraperError::InvalidUrl { .. })
        ));
        assert!(parse_page_url(" https://shop.example/p/1 ").is_ok());
    }

    #[test]
    fn html_content_types() {
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(!is_html_content_type("application/json"));
        assert!(!is_html_content_type("image/png"));
    }

    #[test]
    fn from_html_uses_url_for_both_fields() {
        let doc = RawDocument::from_html("https://shop.example/p/1", "<html></html>");
        assert_eq!(doc.requested_url, doc.final_url);
        assert_eq!(doc.status, 200);
    }
}
