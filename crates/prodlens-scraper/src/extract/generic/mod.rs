//! Site-agnostic extraction.
//!
//! Four sources are read independently, each into its own partial, and then
//! merged by confidence:
//!
//! | Source      | Confidence |
//! |-------------|------------|
//! | JSON-LD     | 0.9–0.95   |
//! | microdata   | 0.8–0.85   |
//! | OpenGraph   | 0.6–0.75   |
//! | heuristics  | 0.3–0.6    |

mod heuristics;
mod jsonld;
mod meta;
mod microdata;

use prodlens_core::Site;
use reqwest::Url;
use scraper::Html;

use super::dom::document_lang;
use crate::normalize::merge_partials;
use crate::partial::{ExtractorKind, PartialRecord};

/// Runs every generic source over `doc`. `site` is the classified site and
/// is carried onto the partial unchanged.
pub(crate) fn extract(doc: &Html, url: &Url, site: Site) -> PartialRecord {
    let sources: [fn(&mut PartialRecord, &Html); 4] = [
        jsonld::apply,
        microdata::apply,
        meta::apply,
        heuristics::apply,
    ];

    let partials: Vec<PartialRecord> = sources
        .iter()
        .map(|apply| {
            let mut p = PartialRecord::new(url.as_str(), site, ExtractorKind::Generic);
            apply(&mut p, doc);
            p
        })
        .collect();

    let mut merged = merge_partials(&partials)
        .unwrap_or_else(|| PartialRecord::new(url.as_str(), site, ExtractorKind::Generic));
    if let Some(lang) = document_lang(doc) {
        merged.locale = Some(lang);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_data_beats_heuristics() {
        let doc = Html::parse_document(
            r#"<html lang="en"><head>
<title>Cheap Kettles | Shop</title>
<meta property="og:title" content="OG Kettle">
<script type="application/ld+json">{"@type":"Product","name":"LD Kettle",
  "offers":{"price":"19.00","priceCurrency":"USD"}}</script>
</head><body>
<h1>Heading Kettle</h1><span class="price">$25.00</span>
<p>This kettle has a long enough description paragraph to be picked up by the paragraph heuristic.</p>
</body></html>"#,
        );
        let url = Url::parse("https://shop.example/p/kettle").unwrap();
        let p = extract(&doc, &url, Site::Generic);

        assert_eq!(p.extractor, ExtractorKind::Generic);
        assert_eq!(p.title.as_ref().unwrap().value, "LD Kettle");
        assert_eq!(p.price_text.as_ref().unwrap().value, "19.00 USD");
        assert!(p.description.as_ref().unwrap().value.starts_with("This kettle"));
        assert_eq!(p.locale.as_deref(), Some("en"));
    }

    #[test]
    fn keeps_classified_site() {
        let doc = Html::parse_document("<h1>Kettle</h1>");
        let url = Url::parse("https://www.amazon.com/dp/B000000000").unwrap();
        let p = extract(&doc, &url, Site::Amazon);
        assert_eq!(p.site, Site::Amazon);
        assert_eq!(p.title.unwrap().value, "Kettle");
    }

    #[test]
    fn empty_page_yields_empty_partial() {
        let doc = Html::parse_document("<html><body></body></html>");
        let url = Url::parse("https://shop.example/").unwrap();
        let p = extract(&doc, &url, Site::Generic);
        assert!(p.title.is_none());
        assert_eq!(p.high_confidence_fields(), 0);
    }
}
