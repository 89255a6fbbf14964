use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Tunable weights for the comparison ranker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankSettings {
    pub title_weight: f64,
    pub price_weight: f64,
    pub rating_weight: f64,
    pub brand_weight: f64,
    /// Relative price difference beyond which price similarity decays faster.
    pub price_threshold: f64,
}

impl Default for RankSettings {
    fn default() -> Self {
        Self {
            title_weight: 0.55,
            price_weight: 0.30,
            rating_weight: 0.10,
            brand_weight: 0.05,
            price_threshold: 0.25,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub gemini_api_key: Option<String>,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub fetch_max_retries: u32,
    pub fetch_backoff_base_ms: u64,
    pub fetch_max_body_bytes: usize,
    pub search_site_timeout_secs: u64,
    pub search_deadline_secs: u64,
    pub search_max_concurrency: usize,
    pub search_max_candidates_per_site: usize,
    pub rank: RankSettings,
    /// Requests each client window admits across the API routes.
    pub api_rate_limit_requests: usize,
    pub api_rate_limit_window_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field("fetch_backoff_base_ms", &self.fetch_backoff_base_ms)
            .field("fetch_max_body_bytes", &self.fetch_max_body_bytes)
            .field("search_site_timeout_secs", &self.search_site_timeout_secs)
            .field("search_deadline_secs", &self.search_deadline_secs)
            .field("search_max_concurrency", &self.search_max_concurrency)
            .field(
                "search_max_candidates_per_site",
                &self.search_max_candidates_per_site,
            )
            .field("rank", &self.rank)
            .field("api_rate_limit_requests", &self.api_rate_limit_requests)
            .field(
                "api_rate_limit_window_secs",
                &self.api_rate_limit_window_secs,
            )
            .finish()
    }
}
