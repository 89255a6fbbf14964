//! OpenGraph (`og:*`) and `product:*` meta tags.

use scraper::Html;

use crate::extract::dom::{attr_value, meta_content, select_all};
use crate::partial::PartialRecord;

const CONFIDENCE: f64 = 0.75;

pub(super) fn apply(p: &mut PartialRecord, doc: &Html) {
    if let Some(title) =
        meta_content(doc, "og:title").or_else(|| meta_content(doc, "twitter:title"))
    {
        p.offer_title(&title, CONFIDENCE);
    }

    if let Some(desc) = meta_content(doc, "og:description") {
        p.offer_description(&desc, 0.7);
    } else if let Some(desc) = meta_content(doc, "description") {
        p.offer_description(&desc, 0.6);
    }

    let images: Vec<String> = ["og:image", "og:image:secure_url", "twitter:image"]
        .iter()
        .flat_map(|key| {
            select_all(doc, &format!(r#"meta[property="{key}"], meta[name="{key}"]"#))
                .into_iter()
                .filter_map(|m| attr_value(m, "content"))
        })
        .collect();
    p.offer_images(images, 0.7);

    let amount = meta_content(doc, "product:price:amount")
        .or_else(|| meta_content(doc, "og:price:amount"));
    if let Some(amount) = amount {
        let currency = meta_content(doc, "product:price:currency")
            .or_else(|| meta_content(doc, "og:price:currency"))
            .unwrap_or_default();
        p.offer_price(&format!("{amount} {currency}"), CONFIDENCE);
    }

    if let Some(availability) = meta_content(doc, "product:availability")
        .or_else(|| meta_content(doc, "og:availability"))
    {
        p.offer_availability(&availability, CONFIDENCE);
    }
    if let Some(brand) =
        meta_content(doc, "product:brand").or_else(|| meta_content(doc, "og:brand"))
    {
        p.offer_raw("brand", &brand, CONFIDENCE);
    }
    if let Some(condition) = meta_content(doc, "product:condition") {
        p.offer_raw("condition", &condition, CONFIDENCE);
    }
    if let Some(site_name) = meta_content(doc, "og:site_name") {
        p.offer_raw("site_name", &site_name, 0.7);
    }

    if p.locale.is_none() {
        p.locale = meta_content(doc, "og:locale");
    }
}
