//! Amazon product pages (every regional storefront shares the layout).

use std::sync::LazyLock;

use prodlens_core::Site;
use regex::Regex;
use reqwest::Url;
use scraper::Html;

use super::dom::{
    all_texts, attr_value, document_lang, element_text, field_key, first_attr, first_text,
    first_within, select_all, select_first, spaced_text,
};
use crate::partial::{ExtractorKind, PartialRecord};

static ASIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:dp|gp/product|gp/aw/d)/([A-Z0-9]{10})(?:[/?]|$)").expect("valid regex")
});

const TITLE_SELECTORS: &[&str] = &["#productTitle", "#title span", "#title"];

const PRICE_SELECTORS: &[(&str, f64)] = &[
    ("#corePrice_feature_div .a-price .a-offscreen", 0.9),
    ("#corePriceDisplay_desktop_feature_div .a-price .a-offscreen", 0.9),
    ("#priceblock_ourprice", 0.85),
    ("#priceblock_dealprice", 0.85),
    ("#priceblock_saleprice", 0.85),
    ("#price_inside_buybox", 0.85),
    ("#apex_desktop .a-price .a-offscreen", 0.8),
    (".a-price .a-offscreen", 0.7),
];

const REVIEW_BODY_SELECTORS: &[&str] = &[
    r#"[data-hook="review-body"] span"#,
    ".review-text-content span",
];

const DETAIL_ROW_SELECTORS: &[&str] = &[
    "#productDetails_techSpec_section_1 tr",
    "#productDetails_detailBullets_sections1 tr",
    "#technicalSpecifications_section_1 tr",
];

pub(crate) fn extract(doc: &Html, url: &Url) -> PartialRecord {
    let mut p = PartialRecord::new(
        url.as_str(),
        Site::Amazon,
        ExtractorKind::SiteSpecific(Site::Amazon),
    );
    p.locale = document_lang(doc);

    if let Some(title) = first_text(doc, TITLE_SELECTORS) {
        p.offer_title(&title, 0.9);
    }

    for (css, confidence) in PRICE_SELECTORS {
        if let Some(price) = first_text(doc, &[*css]) {
            p.offer_price(&price, *confidence);
        }
    }
    if let Some(price) = split_price(doc) {
        p.offer_price(&price, 0.6);
    }

    if let Some(rating) = first_attr(doc, "#acrPopover", "title") {
        p.offer_rating(&rating, 0.9);
    }
    if let Some(rating) = first_text(
        doc,
        &[
            r#"[data-hook="average-star-rating"] .a-icon-alt"#,
            "#acrPopover .a-icon-alt",
        ],
    ) {
        p.offer_rating(&rating, 0.85);
    }

    if let Some(count) = first_text(
        doc,
        &["#acrCustomerReviewText", r#"[data-hook="total-review-count"]"#],
    ) {
        p.offer_review_count(&count, 0.9);
    }

    if let Some(bullets) = select_first(doc, "#feature-bullets ul") {
        p.offer_description(&spaced_text(bullets), 0.85);
    }
    if let Some(desc) = select_first(doc, "#productDescription") {
        p.offer_description(&spaced_text(desc), 0.8);
    }

    p.offer_images(landing_images(doc), 0.9);

    if let Some(availability) = first_text(doc, &["#availability", "#outOfStock"]) {
        p.offer_availability(&availability, 0.9);
    }

    if let Some(byline) = first_text(doc, &["#bylineInfo"]) {
        if let Some(brand) = brand_from_byline(&byline) {
            p.offer_raw("brand", &brand, 0.85);
        }
    }

    p.offer_reviews(all_texts(doc, REVIEW_BODY_SELECTORS), 0.85);

    for css in DETAIL_ROW_SELECTORS {
        for row in select_all(doc, css) {
            let (Some(th), Some(td)) = (first_within(row, "th"), first_within(row, "td")) else {
                continue;
            };
            let key = field_key(&element_text(th));
            if !key.is_empty() {
                p.offer_raw(&key, &element_text(td), 0.8);
            }
        }
    }

    if let Some(category) = select_all(doc, "#wayfinding-breadcrumbs_feature_div ul li a")
        .into_iter()
        .map(element_text)
        .rev()
        .find(|t| !t.is_empty())
    {
        p.offer_raw("category", &category, 0.8);
    }

    if let Some(asin) = asin_from_url(url) {
        p.offer_raw("asin", &asin, 0.95);
    } else if let Some(asin) = first_attr(doc, "input#ASIN", "value") {
        p.offer_raw("asin", &asin, 0.9);
    }

    p
}

/// Rebuilds a price from the `a-price-whole` / `a-price-fraction` spans,
/// keeping the storefront's own decimal mark (`1.299,00` on amazon.de).
fn split_price(doc: &Html) -> Option<String> {
    let whole = first_text(doc, &[".a-price-whole"])?;
    let fraction = first_text(doc, &[".a-price-fraction"]).unwrap_or_default();
    let symbol = first_text(doc, &[".a-price-symbol"]).unwrap_or_default();

    let decimal_mark = first_text(doc, &[".a-price-decimal"])
        .and_then(|t| t.chars().find(|c| matches!(c, '.' | ',')))
        .or_else(|| whole.chars().last().filter(|c| matches!(c, '.' | ',')))
        .unwrap_or('.');

    let whole = whole.trim_end_matches(['.', ',']);
    if fraction.is_empty() {
        Some(format!("{symbol}{whole}"))
    } else {
        Some(format!("{symbol}{whole}{decimal_mark}{fraction}"))
    }
}

fn landing_images(doc: &Html) -> Vec<String> {
    let mut images = Vec::new();
    if let Some(img) = select_first(doc, "#landingImage, #imgBlkFront") {
        if let Some(src) = attr_value(img, "data-old-hires").or_else(|| attr_value(img, "src")) {
            images.push(src);
        }
        // data-a-dynamic-image is a JSON object keyed by image URL.
        if let Some(dynamic) = attr_value(img, "data-a-dynamic-image") {
            if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(&dynamic) {
                images.extend(map.keys().cloned());
            }
        }
    }
    for thumb in select_all(doc, "#altImages img") {
        if let Some(src) = attr_value(thumb, "src") {
            images.push(src);
        }
    }
    images
}

/// `"Visit the Acme Store"` / `"Brand: Acme"` → `"Acme"`.
fn brand_from_byline(byline: &str) -> Option<String> {
    let trimmed = byline.trim();
    let brand = if let Some(rest) = trimmed.strip_prefix("Visit the ") {
        rest.strip_suffix(" Store").unwrap_or(rest)
    } else if let Some(rest) = trimmed.strip_prefix("Brand:") {
        rest
    } else {
        trimmed
    };
    let brand = brand.trim();
    (!brand.is_empty()).then(|| brand.to_owned())
}

fn asin_from_url(url: &Url) -> Option<String> {
    ASIN_RE
        .captures(url.path())
        .map(|caps| caps[1].to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<!doctype html>
<html lang="en-us"><head><title>Amazon.com: Acme Kettle</title></head><body>
<div id="wayfinding-breadcrumbs_feature_div"><ul>
  <li><a href="#">Home &amp; Kitchen</a></li><li><a href="#">Electric Kettles</a></li>
</ul></div>
<span id="productTitle">   Acme Stainless Steel Electric Kettle, 1.7L   </span>
<a id="bylineInfo" href="/stores/Acme">Visit the Acme Store</a>
<span id="acrPopover" title="4.6 out of 5 stars"><span class="a-icon-alt">4.6 out of 5 stars</span></span>
<span id="acrCustomerReviewText">2,341 ratings</span>
<div id="corePrice_feature_div"><span class="a-price"><span class="a-offscreen">$39.99</span>
  <span class="a-price-symbol">$</span><span class="a-price-whole">39<span class="a-price-decimal">.</span></span><span class="a-price-fraction">99</span>
</span></div>
<div id="availability"><span>In Stock</span></div>
<div id="feature-bullets"><ul><li><span>1500W rapid boil</span></li><li><span>Auto shut-off</span></li></ul></div>
<div id="imgTagWrapperId"><img id="landingImage" src="https://m.media-amazon.com/images/I/small.jpg"
  data-old-hires="https://m.media-amazon.com/images/I/large.jpg"></div>
<table id="productDetails_techSpec_section_1">
  <tr><th>Capacity</th><td>1.7 Liters</td></tr>
  <tr><th>Item Weight</th><td>2.2 Pounds</td></tr>
</table>
<div data-hook="review-body"><span>Boils water in under three minutes. Love it.</span></div>
<div data-hook="review-body"><span>Nice</span></div>
</body></html>"##;

    fn url() -> Url {
        Url::parse("https://www.amazon.com/Acme-Kettle/dp/B0ACME1234?th=1").unwrap()
    }

    #[test]
    fn extracts_core_fields_with_high_confidence() {
        let doc = Html::parse_document(PAGE);
        let p = extract(&doc, &url());
        assert_eq!(
            p.title.as_ref().unwrap().value,
            "Acme Stainless Steel Electric Kettle, 1.7L"
        );
        assert_eq!(p.price_text.as_ref().unwrap().value, "$39.99");
        assert_eq!(p.rating_text.as_ref().unwrap().value, "4.6 out of 5 stars");
        assert_eq!(p.review_count_text.as_ref().unwrap().value, "2,341 ratings");
        assert_eq!(p.availability_text.as_ref().unwrap().value, "In Stock");
        assert!(p.high_confidence_fields() >= 5);
        assert_eq!(p.locale.as_deref(), Some("en-us"));
    }

    #[test]
    fn extracts_raw_fields() {
        let doc = Html::parse_document(PAGE);
        let p = extract(&doc, &url());
        assert_eq!(p.raw_fields["brand"].value, "Acme");
        assert_eq!(p.raw_fields["asin"].value, "B0ACME1234");
        assert_eq!(p.raw_fields["category"].value, "Electric Kettles");
        assert_eq!(p.raw_fields["item_weight"].value, "2.2 Pounds");
        assert_eq!(p.raw_fields["capacity"].value, "1.7 Liters");
    }

    #[test]
    fn prefers_hi_res_image_and_bullet_description() {
        let doc = Html::parse_document(PAGE);
        let p = extract(&doc, &url());
        assert_eq!(
            p.images.as_ref().unwrap().value[0],
            "https://m.media-amazon.com/images/I/large.jpg"
        );
        assert_eq!(
            p.description.as_ref().unwrap().value,
            "1500W rapid boil Auto shut-off"
        );
    }

    #[test]
    fn collects_review_bodies() {
        let doc = Html::parse_document(PAGE);
        let p = extract(&doc, &url());
        let reviews = &p.reviews.as_ref().unwrap().value;
        assert_eq!(reviews[0], "Boils water in under three minutes. Love it.");
    }

    #[test]
    fn split_price_rebuilds_whole_and_fraction() {
        let doc = Html::parse_document(
            r#"<span class="a-price-symbol">£</span><span class="a-price-whole">1,299<span class="a-price-decimal">.</span></span><span class="a-price-fraction">00</span>"#,
        );
        assert_eq!(split_price(&doc).as_deref(), Some("£1,299.00"));
    }

    #[test]
    fn split_price_keeps_comma_decimal_mark_on_amazon_de() {
        let html = r#"<html lang="de-de"><body>
<span id="productTitle">Acme Wasserkocher 1,7 L</span>
<span class="a-price"><span class="a-price-whole">1.299<span class="a-price-decimal">,</span></span><span class="a-price-fraction">00</span><span class="a-price-symbol">€</span></span>
</body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(split_price(&doc).as_deref(), Some("€1.299,00"));

        let url = Url::parse("https://www.amazon.de/dp/B0ACME1234").unwrap();
        let record = crate::normalize(&[extract(&doc, &url)]).unwrap();
        let price = record.price.unwrap();
        assert_eq!(price.amount, "1299.00".parse().unwrap());
        assert_eq!(price.currency, "EUR");
    }

    #[test]
    fn drifted_layout_yields_no_high_confidence_fields() {
        let doc = Html::parse_document(
            "<html><body><h1 class=\"new-title\">Kettle</h1><div class=\"new-price\">$10</div></body></html>",
        );
        let p = extract(&doc, &Url::parse("https://www.amazon.com/s/x").unwrap());
        assert_eq!(p.high_confidence_fields(), 0);
        assert!(p.title.is_none());
    }

    #[test]
    fn byline_variants() {
        assert_eq!(brand_from_byline("Visit the Acme Store").as_deref(), Some("Acme"));
        assert_eq!(brand_from_byline("Brand: Acme").as_deref(), Some("Acme"));
        assert_eq!(brand_from_byline("Acme").as_deref(), Some("Acme"));
        assert!(brand_from_byline("   ").is_none());
    }
}
