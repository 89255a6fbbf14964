//! eBay listing pages (`/itm/`), current "x-" layout plus the legacy ids.

use std::sync::LazyLock;

use prodlens_core::Site;
use regex::Regex;
use reqwest::Url;
use scraper::Html;

use super::dom::{
    attr_value, document_lang, element_text, field_key, first_attr, first_text, first_within,
    select_all,
};
use crate::partial::{ExtractorKind, PartialRecord};

static ITEM_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/itm/(?:[^/]+/)?(\d{9,15})").expect("valid regex"));

const TITLE_SELECTORS: &[&str] = &[
    "h1.x-item-title__mainTitle span",
    "h1.x-item-title__mainTitle",
    "#itemTitle",
];

const PRICE_SELECTORS: &[&str] = &[
    ".x-price-primary span.ux-textspans",
    ".x-price-primary",
    "#prcIsum",
    "#mm-saleDscPrc",
    "#prcIsum_bidPrice",
];

const AVAILABILITY_SELECTORS: &[&str] = &[
    ".x-quantity__availability",
    ".d-quantity__availability",
    "#qtySubTxt",
];

pub(crate) fn extract(doc: &Html, url: &Url) -> PartialRecord {
    let mut p = PartialRecord::new(
        url.as_str(),
        Site::Ebay,
        ExtractorKind::SiteSpecific(Site::Ebay),
    );
    p.locale = document_lang(doc);

    if let Some(title) = first_text(doc, TITLE_SELECTORS) {
        p.offer_title(strip_details_prefix(&title), 0.9);
    }

    if let Some(price) = first_text(doc, PRICE_SELECTORS) {
        p.offer_price(&price, 0.9);
    } else if let Some(amount) = first_attr(doc, r#"[itemprop="price"]"#, "content") {
        let currency = first_attr(doc, r#"[itemprop="priceCurrency"]"#, "content")
            .unwrap_or_default();
        p.offer_price(&format!("{amount} {currency}"), 0.85);
    }

    if let Some(availability) = first_text(doc, AVAILABILITY_SELECTORS) {
        p.offer_availability(&availability, 0.8);
    }
    if let Some(status) = first_text(doc, &[".d-statusmessage", ".vi-msg-sts"]) {
        // "This listing was ended by the seller" / "This item is sold out"
        let status = status.to_lowercase();
        if status.contains("ended") || status.contains("sold") {
            p.offer_availability("out of stock", 0.85);
        }
    }

    if let Some(rating) = first_text(
        doc,
        &[".x-star-rating span.clipped", ".ebay-review-start-rating"],
    ) {
        p.offer_rating(&rating, 0.7);
    }
    if let Some(count) = first_text(
        doc,
        &[".x-review-details__count", ".ebay-reviews-count"],
    ) {
        p.offer_review_count(&count, 0.7);
    }

    p.offer_images(carousel_images(doc), 0.85);

    if let Some(condition) = first_text(
        doc,
        &[".x-item-condition-text .ux-textspans", "#vi-itm-cond"],
    ) {
        p.offer_raw("condition", &condition, 0.85);
    }

    for (label, value) in item_specifics(doc) {
        let key = field_key(&label);
        if !key.is_empty() {
            p.offer_raw(&key, &value, 0.8);
        }
    }

    if let Some(seller) = first_text(
        doc,
        &[
            ".x-sellercard-atf__info__about-seller a span",
            ".ux-seller-section__item--seller a",
        ],
    ) {
        p.offer_raw("seller", &seller, 0.8);
    }

    if let Some(caps) = ITEM_NUMBER_RE.captures(url.path()) {
        p.offer_raw("item_number", &caps[1], 0.95);
    }

    p
}

fn strip_details_prefix(title: &str) -> &str {
    title
        .strip_prefix("Details about")
        .map_or(title, str::trim_start)
}

fn carousel_images(doc: &Html) -> Vec<String> {
    let mut images: Vec<String> = select_all(doc, ".ux-image-carousel-item img")
        .into_iter()
        .filter_map(|img| {
            attr_value(img, "data-zoom-src")
                .or_else(|| attr_value(img, "data-src"))
                .or_else(|| attr_value(img, "src"))
        })
        .collect();
    if let Some(legacy) = first_attr(doc, "#icImg", "src") {
        images.push(legacy);
    }
    images
}

/// Label/value pairs from the "Item specifics" section.
fn item_specifics(doc: &Html) -> Vec<(String, String)> {
    select_all(doc, ".ux-labels-values")
        .into_iter()
        .filter_map(|row| {
            let label = element_text(first_within(row, ".ux-labels-values__labels")?);
            let value = element_text(first_within(row, ".ux-labels-values__values")?);
            (!label.is_empty() && !value.is_empty()).then_some((label, value))
        })
        .collect()
}
