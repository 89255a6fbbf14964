//! Merging partial extractions into a canonical [`ProductRecord`].
//!
//! Merging is a pure fold: the partial with the more confident value for a
//! field wins, and site-specific partials are visited first so they win ties.
//! Typed parsing of price, rating, review count, and availability happens
//! here, after the merge, so every extractor's text goes through the same
//! rules.

use std::collections::{BTreeMap, HashSet};

use prodlens_core::{Availability, ProductRecord, Site};
use reqwest::Url;

use crate::error::ScraperError;
use crate::parse::{
    collapse_whitespace, parse_availability, parse_price, parse_rating, parse_review_count,
};
use crate::partial::{ExtractorKind, PartialRecord, Scored};
use crate::region::{currency_for_locale, region_for_host};

/// Maximum number of review snippets kept on a record.
pub const MAX_REVIEWS: usize = 5;

/// Reviews this short are rating widgets or "Helpful" buttons, not text.
const MIN_REVIEW_CHARS: usize = 11;

/// Folds partials into one, preferring the more confident value per field.
///
/// Site-specific partials are visited before generic ones (stable with
/// respect to input order), and a later value only replaces an earlier one
/// when its confidence is strictly higher. Returns `None` for an empty slice.
#[must_use]
pub fn merge_partials(partials: &[PartialRecord]) -> Option<PartialRecord> {
    let mut ordered: Vec<&PartialRecord> = partials.iter().collect();
    ordered.sort_by_key(|p| !p.extractor.is_site_specific());

    let (first, rest) = ordered.split_first()?;
    let mut merged = (*first).clone();

    for partial in rest {
        take_better(&mut merged.title, partial.title.as_ref());
        take_better(&mut merged.price_text, partial.price_text.as_ref());
        take_better(&mut merged.rating_text, partial.rating_text.as_ref());
        take_better(
            &mut merged.review_count_text,
            partial.review_count_text.as_ref(),
        );
        take_better(&mut merged.description, partial.description.as_ref());
        take_better(&mut merged.images, partial.images.as_ref());
        take_better(
            &mut merged.availability_text,
            partial.availability_text.as_ref(),
        );
        take_better(&mut merged.reviews, partial.reviews.as_ref());

        for (key, candidate) in &partial.raw_fields {
            let replace = merged
                .raw_fields
                .get(key)
                .is_none_or(|current| candidate.confidence > current.confidence);
            if replace {
                merged.raw_fields.insert(key.clone(), candidate.clone());
            }
        }

        if merged.locale.is_none() {
            merged.locale.clone_from(&partial.locale);
        }
    }

    Some(merged)
}

fn take_better<T: Clone>(slot: &mut Option<Scored<T>>, candidate: Option<&Scored<T>>) {
    let Some(candidate) = candidate else {
        return;
    };
    if slot
        .as_ref()
        .is_none_or(|current| candidate.confidence > current.confidence)
    {
        *slot = Some(candidate.clone());
    }
}

/// Merges `partials` and parses the winning text into a [`ProductRecord`].
///
/// Absent or unparsable fields stay absent; nothing is defaulted.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if `partials` is empty.
pub fn normalize(partials: &[PartialRecord]) -> Result<ProductRecord, ScraperError> {
    fn text(slot: Option<&Scored<String>>) -> Option<&str> {
        slot.map(|s| s.value.as_str())
    }

    let merged = merge_partials(partials).ok_or_else(|| ScraperError::Normalization {
        reason: "no partial records to normalize".to_owned(),
    })?;

    let fallback_currency = merged
        .locale
        .as_deref()
        .and_then(currency_for_locale)
        .or_else(|| region_for_host(&merged.source_url).map(|r| r.currency()));

    let mut record = ProductRecord::new(
        merged.source_url.clone(),
        merged.site,
        text(merged.title.as_ref())
            .map(collapse_whitespace)
            .unwrap_or_default(),
    );
    record.price =
        text(merged.price_text.as_ref()).and_then(|t| parse_price(t, fallback_currency));
    record.rating = text(merged.rating_text.as_ref()).and_then(parse_rating);
    record.review_count =
        text(merged.review_count_text.as_ref()).and_then(parse_review_count);
    record.description = text(merged.description.as_ref())
        .map(collapse_whitespace)
        .unwrap_or_default();
    record.images = merged
        .images
        .as_ref()
        .map(|s| resolve_images(&merged.source_url, &s.value))
        .unwrap_or_default();
    record.availability = text(merged.availability_text.as_ref())
        .map_or(Availability::Unknown, parse_availability);
    record.reviews = merged
        .reviews
        .as_ref()
        .map(|s| clean_reviews(&s.value))
        .unwrap_or_default();
    record.raw_fields = merged
        .raw_fields
        .iter()
        .map(|(k, v)| (k.clone(), collapse_whitespace(&v.value)))
        .filter(|(_, v)| !v.is_empty())
        .collect::<BTreeMap<_, _>>();

    Ok(record)
}

/// Resolves image references against the page URL, dropping inline `data:`
/// URIs and duplicates while keeping first-seen order.
fn resolve_images(source_url: &str, images: &[String]) -> Vec<String> {
    let base = Url::parse(source_url).ok();
    let mut seen = HashSet::new();
    images
        .iter()
        .filter_map(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.starts_with("data:") {
                return None;
            }
            let resolved = match &base {
                Some(base) => base.join(raw).ok()?,
                None => Url::parse(raw).ok()?,
            };
            matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
        })
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

fn clean_reviews(reviews: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    reviews
        .iter()
        .map(|r| collapse_whitespace(r))
        .filter(|r| r.chars().count() >= MIN_REVIEW_CHARS)
        .filter(|r| seen.insert(r.clone()))
        .take(MAX_REVIEWS)
        .collect()
}

/// Renders a normalized record back into canonical partial text.
///
/// Every typed field is written in a form the parsers read back exactly, so
/// `normalize(&[record_to_partial(&r)])` reproduces `r`. Values no parser
/// could have produced (a negative price, a rating outside 0 to 5) are left
/// out, so they come back absent.
#[must_use]
pub fn record_to_partial(record: &ProductRecord) -> PartialRecord {
    let extractor = if record.site == Site::Generic {
        ExtractorKind::Generic
    } else {
        ExtractorKind::SiteSpecific(record.site)
    };
    let mut partial = PartialRecord::new(record.source_url.clone(), record.site, extractor);

    partial.offer_title(&record.title, 1.0);
    if let Some(price) = record.price.as_ref().filter(|p| !p.amount.is_sign_negative()) {
        partial.offer_price(&format!("{} {}", price.amount, price.currency), 1.0);
    }
    if let Some(rating) = record.rating.filter(|r| (0.0..=5.0).contains(r)) {
        partial.offer_rating(&format!("{rating} out of 5"), 1.0);
    }
    if let Some(count) = record.review_count {
        partial.offer_review_count(&count.to_string(), 1.0);
    }
    partial.offer_description(&record.description, 1.0);
    partial.offer_images(record.images.clone(), 1.0);
    match record.availability {
        Availability::InStock => partial.offer_availability("in stock", 1.0),
        Availability::OutOfStock => partial.offer_availability("out of stock", 1.0),
        Availability::Unknown => {}
    }
    partial.offer_reviews(record.reviews.clone(), 1.0);
    for (key, value) in &record.raw_fields {
        partial.offer_raw(key, value, 1.0);
    }

    partial
}

/// Re-normalizes an already normalized record.
///
/// # Errors
///
/// Propagates [`normalize`] errors.
pub fn renormalize(record: &ProductRecord) -> Result<ProductRecord, ScraperError> {
    normalize(&[record_to_partial(record)])
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
