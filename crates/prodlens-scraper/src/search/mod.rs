//! Similarity search across other storefronts.
//!
//! One search page is fetched per target, concurrently, each under its own
//! timeout. A failing site is recorded and skipped; the others still
//! contribute. An overall deadline abandons whatever is still in flight and
//! returns what has completed.

mod query;
mod results;
mod targets;

pub use query::{build_query, encode_query, MAX_QUERY_WORDS};
pub use results::parse_search_results;
pub use targets::{regional_targets, ResultSelectors, SearchTarget, QUERY_PLACEHOLDER};

use std::time::Duration;

use futures::stream::{self, StreamExt};
use prodlens_core::{AppConfig, ProductRecord, Site};
use reqwest::Url;
use serde::Serialize;

use crate::error::ScraperError;
use crate::fetcher::Fetcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Budget for one target's fetch and parse, retries included.
    pub site_timeout: Duration,
    /// Budget for the whole fan-out.
    pub deadline: Duration,
    pub max_concurrency: usize,
    pub max_candidates_per_site: usize,
}

impl SearchSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            site_timeout: Duration::from_secs(config.search_site_timeout_secs),
            deadline: Duration::from_secs(config.search_deadline_secs),
            max_concurrency: config.search_max_concurrency,
            max_candidates_per_site: config.search_max_candidates_per_site,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            site_timeout: Duration::from_secs(10),
            deadline: Duration::from_secs(25),
            max_concurrency: 4,
            max_candidates_per_site: 3,
        }
    }
}

/// A candidate product and the storefront it was found on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarProduct {
    pub platform: String,
    pub record: ProductRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteFailureKind {
    Blocked,
    Timeout,
    /// The overall deadline passed before this site answered.
    DeadlineExceeded,
    Fetch,
}

/// Why one search target contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteFailure {
    pub platform: String,
    pub kind: SiteFailureKind,
    pub reason: String,
}

/// Outcome of a similarity search.
///
/// `products` are in target order, then result order on each page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimilarProducts {
    pub query: String,
    pub products: Vec<SimilarProduct>,
    pub sites_attempted: usize,
    pub sites_succeeded: usize,
    pub failures: Vec<SiteFailure>,
    pub deadline_exceeded: bool,
}

impl SimilarProducts {
    /// `true` when targets were tried and every one of them failed.
    #[must_use]
    pub fn no_sites_reachable(&self) -> bool {
        self.sites_attempted > 0 && self.sites_succeeded == 0
    }
}

/// Searches `targets` for products like `record`.
///
/// Targets of `exclude_site` are skipped unless it is [`Site::Generic`],
/// which names no single storefront.
pub async fn find_similar(
    fetcher: &Fetcher,
    record: &ProductRecord,
    exclude_site: Site,
    targets: &[SearchTarget],
    settings: &SearchSettings,
) -> SimilarProducts {
    let query = build_query(record);
    let mut outcome = SimilarProducts {
        query: query.clone(),
        ..SimilarProducts::default()
    };
    if query.is_empty() {
        tracing::info!(url = %record.source_url, "no title to search for");
        return outcome;
    }

    let selected: Vec<&SearchTarget> = targets
        .iter()
        .filter(|t| exclude_site.is_generic() || t.site != exclude_site)
        .collect();
    outcome.sites_attempted = selected.len();
    if selected.is_empty() {
        return outcome;
    }

    let encoded = encode_query(&query);
    let per_site = settings.max_candidates_per_site;
    let site_timeout = settings.site_timeout;

    let pipelines: Vec<_> = selected
        .iter()
        .copied()
        .enumerate()
        .map(|(index, target)| {
            let url = target.search_url(&encoded);
            async move {
                let result = tokio::time::timeout(
                    site_timeout,
                    search_target(fetcher, target, &url, per_site),
                )
                .await;
                (index, result)
            }
        })
        .collect();

    let mut finished: Vec<_> = stream::iter(pipelines)
        .buffer_unordered(settings.max_concurrency.max(1))
        .take_until(tokio::time::sleep(settings.deadline))
        .collect()
        .await;
    finished.sort_by_key(|(index, _)| *index);

    let mut answered = vec![false; selected.len()];
    for (index, result) in finished {
        answered[index] = true;
        let platform = selected[index].name.clone();
        match result {
            Ok(Ok(records)) => {
                outcome.sites_succeeded += 1;
                tracing::debug!(
                    platform = %platform,
                    results = records.len(),
                    "search target answered"
                );
                outcome
                    .products
                    .extend(records.into_iter().map(|record| SimilarProduct {
                        platform: platform.clone(),
                        record,
                    }));
            }
            Ok(Err(e)) => {
                tracing::warn!(platform = %platform, error = %e, "search target failed");
                let kind = if e.is_blocked() {
                    SiteFailureKind::Blocked
                } else {
                    SiteFailureKind::Fetch
                };
                outcome.failures.push(SiteFailure {
                    platform,
                    kind,
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                tracing::warn!(
                    platform = %platform,
                    timeout = ?site_timeout,
                    "search target timed out"
                );
                outcome.failures.push(SiteFailure {
                    platform,
                    kind: SiteFailureKind::Timeout,
                    reason: format!("no response within {site_timeout:?}"),
                });
            }
        }
    }

    for (index, target) in selected.iter().enumerate() {
        if !answered[index] {
            outcome.deadline_exceeded = true;
            outcome.failures.push(SiteFailure {
                platform: target.name.clone(),
                kind: SiteFailureKind::DeadlineExceeded,
                reason: "search deadline passed".to_owned(),
            });
        }
    }
    if outcome.deadline_exceeded {
        tracing::warn!(
            deadline = ?settings.deadline,
            sites_succeeded = outcome.sites_succeeded,
            "search deadline passed, returning partial results"
        );
    }

    outcome
}

async fn search_target(
    fetcher: &Fetcher,
    target: &SearchTarget,
    url: &str,
    max_results: usize,
) -> Result<Vec<ProductRecord>, ScraperError> {
    let document = fetcher.fetch(url).await?;
    let page_url = Url::parse(&document.final_url).map_err(|e| ScraperError::InvalidUrl {
        url: document.final_url.clone(),
        reason: e.to_string(),
    })?;
    Ok(parse_search_results(
        &document.html,
        &page_url,
        target,
        max_results,
    ))
}
