//! schema.org microdata (`itemscope` / `itemprop`) inside a Product scope.

use scraper::{ElementRef, Html};

use crate::extract::dom::{attr_value, element_text, select_first, select_within};
use crate::partial::PartialRecord;

const CONFIDENCE: f64 = 0.85;

pub(super) fn apply(p: &mut PartialRecord, doc: &Html) {
    let Some(scope) = select_first(doc, r#"[itemscope][itemtype*="schema.org/Product"]"#) else {
        return;
    };

    if let Some(name) = own_prop(scope, "name").map(prop_value) {
        p.offer_title(&name, CONFIDENCE);
    }
    if let Some(desc) = own_prop(scope, "description") {
        p.offer_description(&element_text(desc), 0.8);
    }
    let images: Vec<String> = own_props(scope, "image")
        .into_iter()
        .filter_map(|img| attr_value(img, "src").or_else(|| attr_value(img, "href")))
        .collect();
    p.offer_images(images, 0.8);

    if let Some(brand) = own_prop(scope, "brand") {
        let name = select_within(brand, r#"[itemprop="name"]"#)
            .into_iter()
            .next()
            .map_or_else(|| prop_value(brand), prop_value);
        p.offer_raw("brand", &name, CONFIDENCE);
    }
    if let Some(sku) = own_prop(scope, "sku").map(prop_value) {
        p.offer_raw("sku", &sku, CONFIDENCE);
    }

    // Offer and rating props live in nested scopes; reading them anywhere
    // below the product is fine.
    if let Some(price) = first_prop(scope, "price") {
        let currency = first_prop(scope, "priceCurrency").unwrap_or_default();
        p.offer_price(&format!("{price} {currency}"), CONFIDENCE);
    }
    if let Some(availability) = first_prop(scope, "availability") {
        let token = availability.rsplit('/').next().unwrap_or(&availability);
        p.offer_availability(token, CONFIDENCE);
    }
    if let Some(value) = first_prop(scope, "ratingValue") {
        let best = first_prop(scope, "bestRating").unwrap_or_else(|| "5".to_owned());
        p.offer_rating(&format!("{value} out of {best}"), CONFIDENCE);
    }
    if let Some(count) =
        first_prop(scope, "reviewCount").or_else(|| first_prop(scope, "ratingCount"))
    {
        p.offer_review_count(&count, CONFIDENCE);
    }
    let reviews: Vec<String> = select_within(scope, r#"[itemprop="reviewBody"]"#)
        .into_iter()
        .map(element_text)
        .collect();
    p.offer_reviews(reviews, 0.8);
}

/// Microdata value: `content`, then `value`/`href`, then text.
fn prop_value(el: ElementRef<'_>) -> String {
    attr_value(el, "content")
        .or_else(|| attr_value(el, "value"))
        .or_else(|| attr_value(el, "href"))
        .unwrap_or_else(|| element_text(el))
}

fn first_prop(scope: ElementRef<'_>, name: &str) -> Option<String> {
    select_within(scope, &format!(r#"[itemprop="{name}"]"#))
        .into_iter()
        .map(prop_value)
        .find(|v| !v.trim().is_empty())
}

/// Props that belong to `scope` itself, not to a nested item such as a
/// review's author `name`.
fn own_props<'a>(scope: ElementRef<'a>, name: &str) -> Vec<ElementRef<'a>> {
    select_within(scope, &format!(r#"[itemprop="{name}"]"#))
        .into_iter()
        .filter(|el| nearest_scope(*el).is_some_and(|s| s.id() == scope.id()))
        .collect()
}

fn own_prop<'a>(scope: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    own_props(scope, name).into_iter().next()
}

fn nearest_scope(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().attr("itemscope").is_some())
}
