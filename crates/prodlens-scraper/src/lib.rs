pub mod classify;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod normalize;
pub mod parse;
pub mod partial;
pub mod rank;
pub mod region;
mod retry;
pub mod search;

pub use classify::{classify, classify_host};
pub use engine::{ComparisonReport, ComparisonStatus, EngineSettings, ProductEngine};
pub use error::ScraperError;
pub use extract::{extract, extract_partials, extract_product, SiteProfile, PROFILES};
pub use fetcher::{FetchSettings, Fetcher, RawDocument};
pub use normalize::{merge_partials, normalize, record_to_partial, renormalize};
pub use partial::{ExtractorKind, PartialRecord, Scored};
pub use rank::{rank, similarity};
pub use region::{detect_region, Region};
pub use search::{
    build_query, find_similar, parse_search_results, regional_targets, SearchSettings,
    SearchTarget, SimilarProduct, SimilarProducts, SiteFailure, SiteFailureKind,
};
