use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// Network failure or timeout from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The storefront answered with an anti-scraping response (403, 429, or a
    /// CAPTCHA interstitial). Never retried automatically.
    #[error("blocked by {url} ({reason})")]
    Blocked {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response from {url} exceeded {limit} bytes")]
    BodyTooLarge { url: String, limit: usize },

    /// The document is empty or is not HTML at all.
    #[error("could not parse document from {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("normalization error: {reason}")]
    Normalization { reason: String },

    /// Every extractor ran and none produced a title, price, or description.
    #[error("could not extract product from {url}")]
    ExtractionFailed { url: String },
}

impl ScraperError {
    /// `true` for anti-scraping responses, which callers should not retry.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, ScraperError::Blocked { .. })
    }

    /// `true` for network-level failures (the fetch error family).
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_)
                | ScraperError::NotFound { .. }
                | ScraperError::UnexpectedStatus { .. }
                | ScraperError::BodyTooLarge { .. }
        )
    }
}
