//! Confidence-scored partial extraction results.
//!
//! Each extractor builds its own [`PartialRecord`] and never touches anyone
//! else's. The normalizer folds them into one `ProductRecord` afterwards.

use std::collections::BTreeMap;

use prodlens_core::Site;

/// Confidence at or above which a field counts as "high confidence" for the
/// fallback decision.
pub const HIGH_CONFIDENCE: f64 = 0.7;

/// A value together with the extractor's certainty in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub value: T,
    pub confidence: f64,
}

impl<T> Scored<T> {
    pub fn new(value: T, confidence: f64) -> Self {
        Self {
            value,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn is_high(&self) -> bool {
        self.confidence >= HIGH_CONFIDENCE
    }
}

/// Which extractor produced a partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    SiteSpecific(Site),
    Generic,
}

impl ExtractorKind {
    #[must_use]
    pub fn is_site_specific(self) -> bool {
        matches!(self, ExtractorKind::SiteSpecific(_))
    }
}

/// Raw, unparsed field text pulled out of one document by one extractor.
///
/// Typed parsing (price, rating, availability) happens later in the
/// normalizer, so extractors only decide *where* a value lives and how sure
/// they are about it.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRecord {
    pub source_url: String,
    pub site: Site,
    pub extractor: ExtractorKind,
    pub title: Option<Scored<String>>,
    pub price_text: Option<Scored<String>>,
    pub rating_text: Option<Scored<String>>,
    pub review_count_text: Option<Scored<String>>,
    pub description: Option<Scored<String>>,
    pub images: Option<Scored<Vec<String>>>,
    pub availability_text: Option<Scored<String>>,
    pub reviews: Option<Scored<Vec<String>>>,
    pub raw_fields: BTreeMap<String, Scored<String>>,
    /// Page language/locale hint such as `en-GB`, used for currency fallback.
    pub locale: Option<String>,
}

impl PartialRecord {
    #[must_use]
    pub fn new(source_url: impl Into<String>, site: Site, extractor: ExtractorKind) -> Self {
        Self {
            source_url: source_url.into(),
            site,
            extractor,
            title: None,
            price_text: None,
            rating_text: None,
            review_count_text: None,
            description: None,
            images: None,
            availability_text: None,
            reviews: None,
            raw_fields: BTreeMap::new(),
            locale: None,
        }
    }

    pub fn offer_title(&mut self, text: &str, confidence: f64) {
        offer_text(&mut self.title, text, confidence);
    }

    pub fn offer_price(&mut self, text: &str, confidence: f64) {
        offer_text(&mut self.price_text, text, confidence);
    }

    pub fn offer_rating(&mut self, text: &str, confidence: f64) {
        offer_text(&mut self.rating_text, text, confidence);
    }

    pub fn offer_review_count(&mut self, text: &str, confidence: f64) {
        offer_text(&mut self.review_count_text, text, confidence);
    }

    pub fn offer_description(&mut self, text: &str, confidence: f64) {
        offer_text(&mut self.description, text, confidence);
    }

    pub fn offer_availability(&mut self, text: &str, confidence: f64) {
        offer_text(&mut self.availability_text, text, confidence);
    }

    pub fn offer_images(&mut self, urls: Vec<String>, confidence: f64) {
        offer_list(&mut self.images, urls, confidence);
    }

    pub fn offer_reviews(&mut self, reviews: Vec<String>, confidence: f64) {
        offer_list(&mut self.reviews, reviews, confidence);
    }

    pub fn offer_raw(&mut self, key: &str, text: &str, confidence: f64) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let replace = self
            .raw_fields
            .get(key)
            .is_none_or(|current| confidence > current.confidence);
        if replace {
            self.raw_fields
                .insert(key.to_owned(), Scored::new(text.to_owned(), confidence));
        }
    }

    /// Per-field confidence; `0.0` means "not found".
    #[must_use]
    pub fn field_confidences(&self) -> BTreeMap<&'static str, f64> {
        fn conf<T>(slot: Option<&Scored<T>>) -> f64 {
            slot.map_or(0.0, |s| s.confidence)
        }
        BTreeMap::from([
            ("title", conf(self.title.as_ref())),
            ("price", conf(self.price_text.as_ref())),
            ("rating", conf(self.rating_text.as_ref())),
            ("review_count", conf(self.review_count_text.as_ref())),
            ("description", conf(self.description.as_ref())),
            ("images", conf(self.images.as_ref())),
            ("availability", conf(self.availability_text.as_ref())),
            ("reviews", conf(self.reviews.as_ref())),
        ])
    }

    /// Number of typed fields extracted with high confidence.
    #[must_use]
    pub fn high_confidence_fields(&self) -> usize {
        self.field_confidences()
            .values()
            .filter(|c| **c >= HIGH_CONFIDENCE)
            .count()
    }

    #[must_use]
    pub fn has_title(&self) -> bool {
        self.title.is_some()
    }
}

/// Keeps the first value unless a strictly more confident one arrives, so
/// selectors listed first win ties.
fn offer_text(slot: &mut Option<Scored<String>>, text: &str, confidence: f64) {
    let text = text.trim();
    if text.is_empty() || confidence <= 0.0 {
        return;
    }
    if slot.as_ref().is_none_or(|s| confidence > s.confidence) {
        *slot = Some(Scored::new(text.to_owned(), confidence));
    }
}

fn offer_list(slot: &mut Option<Scored<Vec<String>>>, values: Vec<String>, confidence: f64) {
    let values: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() || confidence <= 0.0 {
        return;
    }
    if slot.as_ref().is_none_or(|s| confidence > s.confidence) {
        *slot = Some(Scored::new(values, confidence));
    }
}
