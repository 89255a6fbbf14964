//! Last-resort guesses from common class names and page text.
//!
//! Everything here is scored below [`HIGH_CONFIDENCE`](crate::partial::HIGH_CONFIDENCE)
//! so structured data always wins a merge.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use crate::extract::dom::{
    attr_value, element_text, first_text, select_all, select_first, truncate_chars,
};
use crate::parse::has_currency_marker;
use crate::partial::PartialRecord;

static BODY_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:US\$|[$€£₹¥])\s?\d[\d.,]*|\d[\d.,]*\s?(?:€|USD|EUR|GBP)").expect("valid regex")
});

static BODY_RATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d(?:[.,]\d+)?\s*(?:out of|/)\s*(?:5|10)(?:\s*stars?)?").expect("valid regex")
});

const PRICE_CLASS_SELECTORS: &[&str] = &[
    r#"[class*="price"]"#,
    r#"[id*="price"]"#,
    r#"[data-price]"#,
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"[class*="product-description"]"#,
    r#"[class*="productDescription"]"#,
    r#"[id*="description"]"#,
    r#"[class*="description"]"#,
];

const AVAILABILITY_SELECTORS: &[&str] = &[
    r#"[class*="availability"]"#,
    r#"[class*="stock"]"#,
    r#"[id*="availability"]"#,
];

const IMAGE_SELECTORS: &[&str] = &[
    r#"img[class*="product"]"#,
    r#"img[id*="product"]"#,
    r#"[class*="product-image"] img"#,
    r#"[class*="gallery"] img"#,
];

/// Paragraphs shorter than this are navigation or legal text.
const MIN_PARAGRAPH_CHARS: usize = 80;
const MAX_DESCRIPTION_CHARS: usize = 500;

/// Longest price-ish element text worth parsing.
const MAX_PRICE_TEXT_CHARS: usize = 40;

pub(super) fn apply(p: &mut PartialRecord, doc: &Html) {
    if let Some(h1) = first_text(doc, &["h1"]) {
        p.offer_title(&h1, 0.6);
    }
    if let Some(title) = first_text(doc, &[".product-title", ".product-name", ".productName"]) {
        p.offer_title(&title, 0.55);
    }
    if let Some(title) = first_text(doc, &["title"]).and_then(|t| page_title_head(&t)) {
        p.offer_title(&title, 0.35);
    }

    let body_text = select_first(doc, "body")
        .map(element_text)
        .unwrap_or_default();

    if let Some(price) = price_element_text(doc) {
        p.offer_price(&price, 0.5);
    } else if let Some(m) = BODY_PRICE_RE.find(&body_text) {
        p.offer_price(m.as_str(), 0.3);
    }

    if let Some(m) = BODY_RATING_RE.find(&body_text) {
        p.offer_rating(m.as_str(), 0.4);
    }

    if let Some(desc) = first_text(doc, DESCRIPTION_SELECTORS) {
        p.offer_description(&truncate_chars(&desc, MAX_DESCRIPTION_CHARS), 0.5);
    } else if let Some(paragraph) = longest_paragraph(doc) {
        p.offer_description(&truncate_chars(&paragraph, MAX_DESCRIPTION_CHARS), 0.3);
    }

    let images: Vec<String> = IMAGE_SELECTORS
        .iter()
        .flat_map(|css| select_all(doc, css))
        .filter_map(|img| attr_value(img, "data-src").or_else(|| attr_value(img, "src")))
        .collect();
    p.offer_images(images, 0.4);

    if let Some(availability) = first_text(doc, AVAILABILITY_SELECTORS) {
        p.offer_availability(&availability, 0.5);
    }
}

/// First short price-classed element whose text names a currency.
fn price_element_text(doc: &Html) -> Option<String> {
    PRICE_CLASS_SELECTORS
        .iter()
        .flat_map(|css| select_all(doc, css))
        .map(element_text)
        .find(|t| {
            !t.is_empty()
                && t.chars().count() <= MAX_PRICE_TEXT_CHARS
                && t.chars().any(|c| c.is_ascii_digit())
                && has_currency_marker(t)
        })
}

/// `"Acme Kettle | Shop Example"` → `"Acme Kettle"`.
fn page_title_head(title: &str) -> Option<String> {
    let head = title
        .split(['|', '–', '—'])
        .next()
        .unwrap_or(title)
        .split(" - ")
        .next()
        .unwrap_or(title)
        .trim();
    (!head.is_empty()).then(|| head.to_owned())
}

fn longest_paragraph(doc: &Html) -> Option<String> {
    select_all(doc, "p")
        .into_iter()
        .map(element_text)
        .filter(|t| t.chars().count() >= MIN_PARAGRAPH_CHARS)
        .max_by_key(|t| t.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partial::{ExtractorKind, HIGH_CONFIDENCE};
    use prodlens_core::Site;

    fn run(html: &str) -> PartialRecord {
        let doc = Html::parse_document(html);
        let mut p = PartialRecord::new("https://shop.example/p/1", Site::Generic, ExtractorKind::Generic);
        apply(&mut p, &doc);
        p
    }

    #[test]
    fn guesses_from_common_markup() {
        let p = run(
            r#"<html><head><title>Acme Kettle | Shop Example</title></head><body>
<h1>Acme Kettle</h1>
<div class="product-price"><span>$</span><span>24.99</span></div>
<div class="stock-status">In stock</div>
<img class="product-main-image" src="/img/k.jpg">
<p>Rated 4.3 out of 5 stars by our customers.</p>
</body></html>"#,
        );
        assert_eq!(p.title.as_ref().unwrap().value, "Acme Kettle");
        assert_eq!(p.price_text.as_ref().unwrap().value, "$24.99");
        assert_eq!(p.availability_text.as_ref().unwrap().value, "In stock");
        assert_eq!(p.images.as_ref().unwrap().value, vec!["/img/k.jpg".to_string()]);
        assert_eq!(p.rating_text.as_ref().unwrap().value, "4.3 out of 5 stars");
        assert_eq!(p.high_confidence_fields(), 0);
        assert!(p.field_confidences().values().all(|c| *c < HIGH_CONFIDENCE));
    }

    #[test]
    fn falls_back_to_title_tag_and_body_price() {
        let p = run(
            r#"<html><head><title>Travel Mug - Example Store</title></head>
<body><div>Now only £12.50 while stocks last</div></body></html>"#,
        );
        assert_eq!(p.title.as_ref().unwrap().value, "Travel Mug");
        assert!((p.title.as_ref().unwrap().confidence - 0.35).abs() < f64::EPSILON);
        assert_eq!(p.price_text.as_ref().unwrap().value, "£12.50");
    }

    #[test]
    fn longest_paragraph_becomes_description() {
        let long = "This insulated travel mug keeps drinks hot for six hours and cold for twelve, with a leak-proof lid.";
        let p = run(&format!(
            "<html><body><p>Short intro.</p><p>{long}</p></body></html>"
        ));
        let desc = p.description.unwrap();
        assert_eq!(desc.value, long);
        assert!((desc.confidence - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn page_title_head_splits_on_separators() {
        assert_eq!(page_title_head("Kettle | Shop").as_deref(), Some("Kettle"));
        assert_eq!(page_title_head("Kettle - Shop").as_deref(), Some("Kettle"));
        assert!(page_title_head(" | Shop").is_none());
    }
}
