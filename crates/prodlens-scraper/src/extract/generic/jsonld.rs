//! schema.org `Product` data from `<script type="application/ld+json">`.

use serde_json::Value;

use scraper::Html;

use crate::extract::dom::{select_all, strip_tags};
use crate::partial::PartialRecord;

const CONFIDENCE: f64 = 0.95;

/// Nesting depth at which the `Product` search gives up.
const MAX_DEPTH: usize = 8;

pub(super) fn apply(p: &mut PartialRecord, doc: &Html) {
    let Some(product) = find_product(doc) else {
        return;
    };

    if let Some(name) = text(&product["name"]) {
        p.offer_title(&name, CONFIDENCE);
    }
    if let Some(desc) = text(&product["description"]) {
        p.offer_description(&strip_tags(&desc), 0.9);
    }
    p.offer_images(image_urls(&product["image"]), 0.9);

    if let Some(offer) = first_offer(&product["offers"]) {
        apply_offer(p, offer);
    }

    let rating = &product["aggregateRating"];
    if let Some(value) = text(&rating["ratingValue"]) {
        let best = text(&rating["bestRating"]).unwrap_or_else(|| "5".to_owned());
        p.offer_rating(&format!("{value} out of {best}"), CONFIDENCE);
    }
    if let Some(count) = text(&rating["reviewCount"]).or_else(|| text(&rating["ratingCount"])) {
        p.offer_review_count(&count, CONFIDENCE);
    }

    let reviews: Vec<String> = as_list(&product["review"])
        .filter_map(|r| text(&r["reviewBody"]).or_else(|| text(&r["description"])))
        .collect();
    p.offer_reviews(reviews, 0.9);

    if let Some(brand) = named(&product["brand"]) {
        p.offer_raw("brand", &brand, CONFIDENCE);
    }
    if let Some(category) = text(&product["category"]) {
        p.offer_raw("category", &category, 0.9);
    }
    for key in ["sku", "mpn", "gtin", "gtin8", "gtin12", "gtin13", "gtin14", "color", "material"] {
        if let Some(value) = text(&product[key]) {
            p.offer_raw(key, &value, CONFIDENCE);
        }
    }
}

fn apply_offer(p: &mut PartialRecord, offer: &Value) {
    // AggregateOffer carries lowPrice instead of price.
    let amount = text(&offer["price"])
        .or_else(|| text(&offer["lowPrice"]))
        .or_else(|| text(&offer["priceSpecification"]["price"]));
    if let Some(amount) = amount {
        let currency = text(&offer["priceCurrency"])
            .or_else(|| text(&offer["priceSpecification"]["priceCurrency"]))
            .unwrap_or_default();
        p.offer_price(&format!("{amount} {currency}"), CONFIDENCE);
    }
    if let Some(availability) = text(&offer["availability"]) {
        // "https://schema.org/InStock" → "InStock"
        let token = availability.rsplit('/').next().unwrap_or(&availability);
        p.offer_availability(token, CONFIDENCE);
    }
    if let Some(seller) = named(&offer["seller"]) {
        p.offer_raw("seller", &seller, 0.9);
    }
    if let Some(condition) = text(&offer["itemCondition"]) {
        let token = condition.rsplit('/').next().unwrap_or(&condition);
        p.offer_raw("condition", token, 0.9);
    }
}

fn find_product(doc: &Html) -> Option<Value> {
    select_all(doc, r#"script[type="application/ld+json"]"#)
        .into_iter()
        .filter_map(|script| {
            let body: String = script.text().collect();
            serde_json::from_str::<Value>(body.trim()).ok()
        })
        .find_map(|value| search(&value, 0).cloned())
}

/// Depth-first search through arrays, `@graph` containers and nested
/// objects for the first node typed `Product`.
fn search(value: &Value, depth: usize) -> Option<&Value> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Array(items) => items.iter().find_map(|v| search(v, depth + 1)),
        Value::Object(map) => {
            if is_product(value) {
                return Some(value);
            }
            map.values().find_map(|v| search(v, depth + 1))
        }
        _ => None,
    }
}

fn is_product(value: &Value) -> bool {
    let matches = |t: &str| {
        let t = t.rsplit('/').next().unwrap_or(t);
        t.eq_ignore_ascii_case("Product") || t.eq_ignore_ascii_case("ProductGroup")
    };
    match &value["@type"] {
        Value::String(s) => matches(s),
        Value::Array(types) => types.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

/// String or number as text.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `"Acme"` or `{ "@type": "Brand", "name": "Acme" }`.
fn named(value: &Value) -> Option<String> {
    text(value).or_else(|| text(&value["name"]))
}

fn as_list(value: &Value) -> impl Iterator<Item = &Value> {
    match value {
        Value::Array(items) => items.iter().collect::<Vec<_>>().into_iter(),
        Value::Null => Vec::new().into_iter(),
        other => vec![other].into_iter(),
    }
}

fn first_offer(offers: &Value) -> Option<&Value> {
    as_list(offers).find(|o| o.is_object())
}

/// `image` may be a URL, an `ImageObject`, or a list of either.
fn image_urls(value: &Value) -> Vec<String> {
    as_list(value)
        .filter_map(|img| {
            text(img)
                .or_else(|| text(&img["url"]))
                .or_else(|| text(&img["contentUrl"]))
        })
        .collect()
}
