//! Walmart product pages (`/ip/`).
//!
//! The page is a Next.js app; the hydration payload in `#__NEXT_DATA__` is
//! the most reliable source. The rendered DOM is read as a fallback.

use prodlens_core::Site;
use reqwest::Url;
use scraper::Html;
use serde_json::Value;

use super::dom::{all_texts, document_lang, first_attr, first_text, select_first, strip_tags};
use crate::partial::{ExtractorKind, PartialRecord};

const NEXT_DATA_CONFIDENCE: f64 = 0.95;

pub(crate) fn extract(doc: &Html, url: &Url) -> PartialRecord {
    let mut p = PartialRecord::new(
        url.as_str(),
        Site::Walmart,
        ExtractorKind::SiteSpecific(Site::Walmart),
    );
    p.locale = document_lang(doc);

    if let Some(data) = next_data(doc) {
        apply_next_data(&mut p, &data);
    }
    apply_dom(&mut p, doc);

    p
}

fn next_data(doc: &Html) -> Option<Value> {
    let script = select_first(doc, "script#__NEXT_DATA__")?;
    let text: String = script.text().collect();
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "unparsable __NEXT_DATA__ payload");
            None
        }
    }
}

fn apply_next_data(p: &mut PartialRecord, data: &Value) {
    let root = &data["props"]["pageProps"]["initialData"]["data"];
    let product = &root["product"];
    if !product.is_object() {
        return;
    }
    let c = NEXT_DATA_CONFIDENCE;

    if let Some(name) = product["name"].as_str() {
        p.offer_title(name, c);
    }

    let current = &product["priceInfo"]["currentPrice"];
    if let Some(text) = current["priceString"].as_str() {
        p.offer_price(text, c);
    } else if let Some(amount) = json_number_text(&current["price"]) {
        let currency = current["currencyUnit"].as_str().unwrap_or_default();
        p.offer_price(&format!("{amount} {currency}"), c);
    }

    if let Some(rating) = json_number_text(&product["averageRating"]) {
        p.offer_rating(&format!("{rating} out of 5"), c);
    }
    if let Some(count) = json_number_text(&product["numberOfReviews"]) {
        p.offer_review_count(&count, c);
    }
    if let Some(desc) = product["shortDescription"].as_str() {
        p.offer_description(&strip_tags(desc), 0.9);
    }

    let images: Vec<String> = product["imageInfo"]["allImages"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|img| img["url"].as_str().map(str::to_owned))
        .collect();
    p.offer_images(images, c);

    if let Some(status) = product["availabilityStatus"].as_str() {
        // IN_STOCK / OUT_OF_STOCK
        p.offer_availability(&status.replace('_', " "), c);
    }

    if let Some(brand) = product["brand"].as_str() {
        p.offer_raw("brand", brand, c);
    }
    if let Some(category) = category_path(&product["category"]["path"]) {
        p.offer_raw("category", &category, 0.9);
    }
    if let Some(id) = product["usItemId"]
        .as_str()
        .map(str::to_owned)
        .or_else(|| json_number_text(&product["usItemId"]))
    {
        p.offer_raw("item_id", &id, c);
    }
    if let Some(seller) = product["sellerName"].as_str() {
        p.offer_raw("seller", seller, 0.9);
    }

    let reviews: Vec<String> = root["reviews"]["customerReviews"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|r| r["reviewText"].as_str().map(str::to_owned))
        .collect();
    p.offer_reviews(reviews, 0.9);
}

/// Numbers may arrive as JSON numbers or strings.
fn json_number_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        _ => None,
    }
}

/// Deepest category name from `[{ "name": .. }, ..]`.
fn category_path(path: &Value) -> Option<String> {
    path.as_array()?
        .iter()
        .rev()
        .find_map(|node| node["name"].as_str())
        .map(str::to_owned)
}

fn apply_dom(p: &mut PartialRecord, doc: &Html) {
    if let Some(title) = first_text(doc, &[r#"h1[itemprop="name"]"#, "h1#main-title", "h1"]) {
        p.offer_title(&title, 0.8);
    }
    if let Some(price) = first_text(
        doc,
        &[r#"[itemprop="price"]"#, r#"[data-testid="price-wrap"] span"#],
    ) {
        p.offer_price(&price, 0.8);
    }
    if let Some(rating) = first_text(doc, &[".rating-number", r#"[itemprop="ratingValue"]"#]) {
        p.offer_rating(&rating, 0.75);
    }
    if let Some(count) = first_text(
        doc,
        &[r#"[itemprop="ratingCount"]"#, r#"[data-testid="item-review-section-link"]"#],
    ) {
        p.offer_review_count(&count, 0.75);
    }
    if let Some(brand) = first_text(doc, &[r#"a[data-seo-id="brand-name"]"#, r#"[itemprop="brand"]"#]) {
        p.offer_raw("brand", &brand, 0.75);
    }
    if let Some(hero) = first_attr(doc, r#"[data-testid="hero-image"] img"#, "src") {
        p.offer_images(vec![hero], 0.7);
    }
    p.offer_reviews(
        all_texts(doc, &[r#"[data-testid="enhanced-review-content"] span"#]),
        0.7,
    );
}
