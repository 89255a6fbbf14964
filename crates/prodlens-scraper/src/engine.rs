//! The extraction engine facade used by the server and CLI.

use std::sync::Arc;

use prodlens_core::{AppConfig, ComparisonCandidate, ProductRecord, RankSettings};
use serde::Serialize;

use crate::error::ScraperError;
use crate::extract::extract_product;
use crate::fetcher::{FetchSettings, Fetcher};
use crate::rank::rank;
use crate::region::{detect_region, Region};
use crate::search::{
    find_similar, regional_targets, SearchSettings, SearchTarget, SimilarProducts, SiteFailure,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineSettings {
    pub fetch: FetchSettings,
    pub search: SearchSettings,
    pub rank: RankSettings,
}

impl EngineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            fetch: FetchSettings::from_app_config(config),
            search: SearchSettings::from_app_config(config),
            rank: config.rank,
        }
    }
}

/// How a comparison ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    /// At least one candidate was found and ranked.
    Ranked,
    /// Search pages answered but listed nothing usable.
    NoMatches,
    /// No search target answered at all.
    NoSitesReachable,
}

/// Ranked candidates plus what happened on each searched storefront.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub status: ComparisonStatus,
    pub region: Region,
    pub query: String,
    pub candidates: Vec<ComparisonCandidate>,
    pub sites_attempted: usize,
    pub sites_succeeded: usize,
    pub failures: Vec<SiteFailure>,
    pub deadline_exceeded: bool,
}

/// Scrapes product pages and compares them against other storefronts.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct ProductEngine {
    fetcher: Fetcher,
    settings: EngineSettings,
    /// Replaces the regional storefront list when set.
    fixed_targets: Option<Arc<[SearchTarget]>>,
}

impl ProductEngine {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: EngineSettings) -> Result<Self, ScraperError> {
        let fetcher = Fetcher::new(settings.fetch.clone())?;
        Ok(Self {
            fetcher,
            settings,
            fixed_targets: None,
        })
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(EngineSettings::from_app_config(config))
    }

    /// Searches `targets` for every comparison instead of the storefronts
    /// of the source record's region.
    #[must_use]
    pub fn with_search_targets(mut self, targets: Vec<SearchTarget>) -> Self {
        self.fixed_targets = Some(targets.into());
        self
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn targets_for(&self, region: Region) -> Vec<SearchTarget> {
        match &self.fixed_targets {
            Some(targets) => targets.to_vec(),
            None => regional_targets(region),
        }
    }

    /// Fetches `url` and extracts a normalized product.
    ///
    /// # Errors
    ///
    /// Any fetch error ([`ScraperError::Blocked`] included) is terminal for
    /// the request, as is [`ScraperError::ExtractionFailed`] when the page
    /// holds no recognisable product.
    pub async fn scrape(&self, url: &str) -> Result<ProductRecord, ScraperError> {
        let document = self.fetcher.fetch(url).await?;
        let record = extract_product(&document)?;
        tracing::info!(url = %record.source_url, site = %record.site, "scraped product");
        Ok(record)
    }

    /// Searches the storefronts of `record`'s region, excluding its own site.
    pub async fn find_similar(&self, record: &ProductRecord) -> SimilarProducts {
        let targets = self.targets_for(detect_region(&record.source_url));
        self.find_similar_in(record, &targets).await
    }

    /// Searches the given targets, excluding `record`'s own site.
    pub async fn find_similar_in(
        &self,
        record: &ProductRecord,
        targets: &[SearchTarget],
    ) -> SimilarProducts {
        find_similar(
            &self.fetcher,
            record,
            record.site,
            targets,
            &self.settings.search,
        )
        .await
    }

    /// Finds similar products in `record`'s region and ranks them.
    pub async fn compare(&self, record: &ProductRecord) -> ComparisonReport {
        let region = detect_region(&record.source_url);
        let targets = self.targets_for(region);
        self.compare_in(record, region, &targets).await
    }

    /// Like [`compare`](Self::compare) with an explicit target list.
    pub async fn compare_with_targets(
        &self,
        record: &ProductRecord,
        targets: &[SearchTarget],
    ) -> ComparisonReport {
        self.compare_in(record, detect_region(&record.source_url), targets)
            .await
    }

    async fn compare_in(
        &self,
        record: &ProductRecord,
        region: Region,
        targets: &[SearchTarget],
    ) -> ComparisonReport {
        let similar = self.find_similar_in(record, targets).await;
        let status = if similar.sites_succeeded == 0 {
            ComparisonStatus::NoSitesReachable
        } else if similar.products.is_empty() {
            ComparisonStatus::NoMatches
        } else {
            ComparisonStatus::Ranked
        };

        let SimilarProducts {
            query,
            products,
            sites_attempted,
            sites_succeeded,
            failures,
            deadline_exceeded,
        } = similar;
        let candidates = rank(record, products, &self.settings.rank);

        tracing::info!(
            url = %record.source_url,
            region = %region,
            status = ?status,
            candidates = candidates.len(),
            sites_succeeded,
            "comparison finished"
        );

        ComparisonReport {
            status,
            region,
            query,
            candidates,
            sites_attempted,
            sites_succeeded,
            failures,
            deadline_exceeded,
        }
    }
}
