//! Field extractors and the site profile table.
//!
//! Every profile is a plain function from a parsed document to a
//! [`PartialRecord`]. Site-specific profiles are tried first; when one comes
//! back with nothing trustworthy (no title, or no high-confidence field at
//! all) the page is most likely a layout we no longer recognise, and the
//! generic extractor runs as well. Both partials then go through the same
//! merge in [`normalize`].

mod amazon;
pub(crate) mod dom;
mod ebay;
mod generic;
mod walmart;

use prodlens_core::{ProductRecord, Site};
use reqwest::Url;
use scraper::Html;

use crate::error::ScraperError;
use crate::fetcher::RawDocument;
use crate::normalize::normalize;
use crate::partial::PartialRecord;

/// A named extraction strategy.
#[derive(Debug, Clone, Copy)]
pub struct SiteProfile {
    pub site: Site,
    /// Host labels (the part before the public suffix) this profile owns.
    pub domain_matchers: &'static [&'static str],
    pub(crate) extract: fn(&Html, &Url) -> PartialRecord,
}

/// Site-specific profiles in priority order. Hosts matching none of them
/// use the generic extractor.
pub const PROFILES: &[SiteProfile] = &[
    SiteProfile {
        site: Site::Amazon,
        domain_matchers: &["amazon", "amzn"],
        extract: amazon::extract,
    },
    SiteProfile {
        site: Site::Ebay,
        domain_matchers: &["ebay"],
        extract: ebay::extract,
    },
    SiteProfile {
        site: Site::Walmart,
        domain_matchers: &["walmart"],
        extract: walmart::extract,
    },
];

#[must_use]
pub fn profile_for(site: Site) -> Option<&'static SiteProfile> {
    PROFILES.iter().find(|p| p.site == site)
}

/// Runs the extractor for `site` over `doc`. [`Site::Generic`] runs the
/// generic extractor.
#[must_use]
pub fn extract(site: Site, doc: &Html, url: &Url) -> PartialRecord {
    match profile_for(site) {
        Some(profile) => (profile.extract)(doc, url),
        None => generic::extract(doc, url, site),
    }
}

/// Partials for one document, applying the generic fallback policy.
#[must_use]
pub fn extract_partials(site: Site, doc: &Html, url: &Url) -> Vec<PartialRecord> {
    let primary = extract(site, doc, url);
    if !primary.extractor.is_site_specific() {
        return vec![primary];
    }
    if primary.high_confidence_fields() > 0 && primary.has_title() {
        return vec![primary];
    }

    tracing::info!(
        url = %url,
        site = %site,
        high_confidence_fields = primary.high_confidence_fields(),
        "site extractor came back weak, falling back to generic extraction"
    );
    let fallback = generic::extract(doc, url, site);
    vec![primary, fallback]
}

/// Extracts and normalizes a product from a fetched document.
///
/// The profile is chosen from the document's final URL, so a short link
/// that redirected to a storefront still uses that storefront's profile.
///
/// # Errors
///
/// - [`ScraperError::Parse`] — the body is empty or not HTML.
/// - [`ScraperError::InvalidUrl`] — the document URL is unusable.
/// - [`ScraperError::ExtractionFailed`] — nothing identifying a product was
///   found, even by the generic extractor.
pub fn extract_product(document: &RawDocument) -> Result<ProductRecord, ScraperError> {
    let body = document.html.trim_start_matches('\u{feff}').trim_start();
    if body.is_empty() {
        return Err(ScraperError::Parse {
            url: document.final_url.clone(),
            reason: "empty document".to_owned(),
        });
    }
    if !body.starts_with('<') {
        return Err(ScraperError::Parse {
            url: document.final_url.clone(),
            reason: "document is not HTML".to_owned(),
        });
    }

    let url = crate::fetcher::parse_page_url(&document.final_url)?;
    let site = crate::classify::classify(url.as_str());

    let partials = {
        let doc = Html::parse_document(&document.html);
        extract_partials(site, &doc, &url)
    };

    let record = normalize(&partials)?;
    if !record.has_content() {
        tracing::warn!(url = %url, site = %site, "no product data found on page");
        return Err(ScraperError::ExtractionFailed {
            url: document.final_url.clone(),
        });
    }

    tracing::debug!(
        url = %url,
        site = %site,
        has_price = record.price.is_some(),
        images = record.images.len(),
        "extracted product"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_lookup() {
        assert_eq!(profile_for(Site::Ebay).map(|p| p.site), Some(Site::Ebay));
        assert!(profile_for(Site::Generic).is_none());
    }

    #[test]
    fn site_specific_result_is_used_alone_when_strong() {
        let doc = Html::parse_document(
            r#"<span id="productTitle">Kettle</span><div id="availability">In Stock</div>
<script type="application/ld+json">{"@type":"Product","name":"LD Kettle"}</script>"#,
        );
        let url = Url::parse("https://www.amazon.com/dp/B0ACME1234").unwrap();
        let partials = extract_partials(Site::Amazon, &doc, &url);
        assert_eq!(partials.len(), 1);
        assert!(partials[0].extractor.is_site_specific());
    }

    #[test]
    fn drifted_layout_falls_back_to_generic() {
        let html = r#"<html><head>
<script type="application/ld+json">{"@type":"Product","name":"Redesigned Kettle",
  "offers":{"price":"44.00","priceCurrency":"USD"}}</script>
</head><body><h1 class="pdp-title-v2">Redesigned Kettle</h1></body></html>"#;
        let document = RawDocument::from_html("https://www.amazon.com/dp/B0ACME1234", html);
        let record = extract_product(&document).unwrap();
        assert_eq!(record.site, Site::Amazon);
        assert_eq!(record.title, "Redesigned Kettle");
        assert_eq!(record.price.as_ref().unwrap().currency, "USD");
        assert_eq!(record.raw_field("asin"), Some("B0ACME1234"));
    }

    #[test]
    fn empty_and_non_html_documents_are_parse_errors() {
        let empty = RawDocument::from_html("https://shop.example/p", "   ");
        assert!(matches!(extract_product(&empty), Err(ScraperError::Parse { .. })));
        let json = RawDocument::from_html("https://shop.example/p", r#"{"a":1}"#);
        assert!(matches!(extract_product(&json), Err(ScraperError::Parse { .. })));
    }

    #[test]
    fn page_without_product_data_fails_extraction() {
        let document = RawDocument::from_html(
            "https://shop.example/p",
            "<html><body><div></div></body></html>",
        );
        assert!(matches!(
            extract_product(&document),
            Err(ScraperError::ExtractionFailed { .. })
        ));
    }
}
