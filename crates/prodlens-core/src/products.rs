use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storefronts with a dedicated extraction profile. Everything else is
/// handled by [`Site::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    Amazon,
    Ebay,
    Walmart,
    Generic,
}

impl Site {
    /// Every site in classifier priority order (specific profiles first).
    pub const ALL: [Site; 4] = [Site::Amazon, Site::Ebay, Site::Walmart, Site::Generic];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Site::Amazon => "amazon",
            Site::Ebay => "ebay",
            Site::Walmart => "walmart",
            Site::Generic => "generic",
        }
    }

    #[must_use]
    pub fn is_generic(self) -> bool {
        self == Site::Generic
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown site \"{0}\"")]
pub struct UnknownSiteError(pub String);

impl FromStr for Site {
    type Err = UnknownSiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amazon" => Ok(Site::Amazon),
            "ebay" => Ok(Site::Ebay),
            "walmart" => Ok(Site::Walmart),
            "generic" => Ok(Site::Generic),
            other => Err(UnknownSiteError(other.to_owned())),
        }
    }
}

/// Stock state after keyword classification. Unmatched text is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    #[default]
    Unknown,
}

/// A parsed price. `amount` is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Decimal,
    /// ISO 4217 code, e.g. `"USD"`.
    pub currency: String,
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Canonical product extracted from a single page.
///
/// Only `source_url` and `title` are always present (`title` may be empty
/// when nothing usable was found). Every other field is optional and its
/// absence is an expected outcome. A record is built once by the normalizer
/// and then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub source_url: String,
    pub site: Site,
    pub title: String,
    pub price: Option<Price>,
    /// Always within `[0, 5]`.
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub availability: Availability,
    /// Short customer review snippets, at most five.
    #[serde(default)]
    pub reviews: Vec<String>,
    /// Scraped key/value pairs with no typed home (`brand`, `sku`, detail-table rows).
    #[serde(default)]
    pub raw_fields: BTreeMap<String, String>,
}

impl ProductRecord {
    /// Builds a record carrying only the mandatory fields.
    #[must_use]
    pub fn new(source_url: impl Into<String>, site: Site, title: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            site,
            title: title.into(),
            price: None,
            rating: None,
            review_count: None,
            description: String::new(),
            images: Vec::new(),
            availability: Availability::Unknown,
            reviews: Vec::new(),
            raw_fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn brand(&self) -> Option<&str> {
        self.raw_field("brand")
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.raw_field("category")
    }

    /// Returns a non-empty raw field value.
    #[must_use]
    pub fn raw_field(&self, key: &str) -> Option<&str> {
        self.raw_fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// `true` when at least one of title, price, or description was found.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.title.trim().is_empty() || self.price.is_some() || !self.description.trim().is_empty()
    }
}

/// Which attribute contributed to a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Title,
    Price,
    Rating,
    Brand,
}

/// One line of a ranking rationale: the attribute and its unweighted
/// similarity in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAttribute {
    pub attribute: MatchKind,
    pub score: f64,
}

/// A product found on another storefront, scored against the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonCandidate {
    pub record: ProductRecord,
    /// Display name of the storefront it came from, e.g. `"eBay UK"`.
    pub platform: String,
    /// Weighted similarity in `[0, 1]`.
    pub similarity_score: f64,
    /// Attributes that matched, strongest first.
    pub ranking_rationale: Vec<MatchAttribute>,
}
