//! Parsing storefront search result pages into candidate records.

use prodlens_core::{ProductRecord, Site};
use reqwest::Url;
use scraper::Html;

use super::targets::SearchTarget;
use crate::classify::classify;
use crate::extract::dom::{attr_value, element_text, first_within, select_all};
use crate::normalize::normalize;
use crate::partial::{ExtractorKind, PartialRecord};

const RESULT_CONFIDENCE: f64 = 0.8;

/// eBay renders a sponsored placeholder card first on every results page.
const PLACEHOLDER_TITLES: &[&str] = &["shop on ebay"];

/// Parses up to `max_results` result cards from a search page.
///
/// Cards without a title or a usable link are skipped. Relative links are
/// resolved against `page_url`.
#[must_use]
pub fn parse_search_results(
    html: &str,
    page_url: &Url,
    target: &SearchTarget,
    max_results: usize,
) -> Vec<ProductRecord> {
    let doc = Html::parse_document(html);
    let sel = &target.selectors;

    select_all(&doc, &sel.container)
        .into_iter()
        .filter_map(|card| {
            let title = first_within(card, &sel.title).map(element_text)?;
            if title.is_empty() || PLACEHOLDER_TITLES.contains(&title.to_lowercase().as_str()) {
                return None;
            }

            // The title element itself is sometimes the anchor.
            let href = first_within(card, &sel.link)
                .and_then(|a| attr_value(a, "href"))
                .or_else(|| attr_value(card, "href"))?;
            let link = page_url.join(&href).ok()?;
            if !matches!(link.scheme(), "http" | "https") {
                return None;
            }

            let classified = classify(link.as_str());
            let site = if classified == Site::Generic {
                target.site
            } else {
                classified
            };
            let extractor = if site == Site::Generic {
                ExtractorKind::Generic
            } else {
                ExtractorKind::SiteSpecific(site)
            };

            let mut partial = PartialRecord::new(link.as_str(), site, extractor);
            partial.offer_title(&title, RESULT_CONFIDENCE);
            if let Some(price) = first_within(card, &sel.price).map(element_text) {
                partial.offer_price(&price, RESULT_CONFIDENCE);
            }
            if let Some(rating_sel) = &sel.rating {
                if let Some(rating) = first_within(card, rating_sel).map(element_text) {
                    partial.offer_rating(&rating, RESULT_CONFIDENCE);
                }
            }
            normalize(&[partial]).ok()
        })
        .take(max_results)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use crate::search::targets::regional_targets;
    use rust_decimal::Decimal;

    const EBAY_PAGE: &str = r#"<ul class="srp-results">
<li class="s-item"><a class="s-item__link" href="https://ebay.com/itm/0"><div class="s-item__title">Shop on eBay</div></a><span class="s-item__price">$20.00</span></li>
<li class="s-item"><a class="s-item__link" href="/itm/111111111111"><div class="s-item__title"><span>Acme Electric Kettle 1.7L</span></div></a>
  <span class="s-item__price">$31.50</span><div class="x-star-rating"><span class="clipped">4.5 out of 5 stars.</span></div></li>
<li class="s-item"><div class="s-item__title">No link here</div></li>
<li class="s-item"><a class="s-item__link" href="https://www.ebay.com/itm/222222222222"><div class="s-item__title">Acme Kettle Silver</div></a></li>
</ul>"#;

    fn ebay_target() -> SearchTarget {
        regional_targets(Region::Us)
            .into_iter()
            .find(|t| t.site == Site::Ebay)
            .unwrap()
    }

    #[test]
    fn parses_result_cards() {
        let page = Url::parse("https://www.ebay.com/sch/i.html?_nkw=acme").unwrap();
        let results = parse_search_results(EBAY_PAGE, &page, &ebay_target(), 10);

        assert_eq!(results.len(), 2);
        let first = &results[0];
        assert_eq!(first.title, "Acme Electric Kettle 1.7L");
        assert_eq!(first.source_url, "https://www.ebay.com/itm/111111111111");
        assert_eq!(first.site, Site::Ebay);
        assert_eq!(first.price.as_ref().unwrap().amount, Decimal::new(3150, 2));
        assert_eq!(first.rating, Some(4.5));

        assert_eq!(results[1].title, "Acme Kettle Silver");
        assert!(results[1].price.is_none());
    }

    #[test]
    fn respects_result_cap() {
        let page = Url::parse("https://www.ebay.com/sch/i.html?_nkw=acme").unwrap();
        let results = parse_search_results(EBAY_PAGE, &page, &ebay_target(), 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn generic_target_keeps_its_site() {
        let target = regional_targets(Region::Eg)
            .into_iter()
            .find(|t| t.name == "Jumia Egypt")
            .unwrap();
        let page = Url::parse("https://www.jumia.com.eg/catalog/?q=kettle").unwrap();
        let html = r#"<article class="prd"><a class="core" href="/acme-kettle-123.html">
<h3 class="name">Acme Kettle</h3><div class="prc">EGP 1,250.00</div></a></article>"#;
        let results = parse_search_results(html, &page, &target, 3);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].site, Site::Generic);
        assert_eq!(results[0].source_url, "https://www.jumia.com.eg/acme-kettle-123.html");
        assert_eq!(results[0].price.as_ref().unwrap().currency, "EGP");
    }
}
