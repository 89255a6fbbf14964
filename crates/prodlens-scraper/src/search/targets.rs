//! Per-region storefront search pages and their result-list selectors.

use prodlens_core::Site;

use crate::region::Region;

/// Placeholder replaced by the encoded query in a search URL template.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// CSS selectors for one result card on a search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSelectors {
    /// One element per result.
    pub container: String,
    pub title: String,
    pub price: String,
    /// Anchor whose `href` is the product page.
    pub link: String,
    pub rating: Option<String>,
}

/// A storefront searched for similar products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    /// Display name, e.g. `"Amazon UK"`.
    pub name: String,
    pub site: Site,
    /// Search page URL containing [`QUERY_PLACEHOLDER`].
    pub url_template: String,
    pub selectors: ResultSelectors,
}

impl SearchTarget {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        site: Site,
        url_template: impl Into<String>,
        selectors: ResultSelectors,
    ) -> Self {
        Self {
            name: name.into(),
            site,
            url_template: url_template.into(),
            selectors,
        }
    }

    /// Search URL for an already percent-encoded query.
    #[must_use]
    pub fn search_url(&self, encoded_query: &str) -> String {
        self.url_template.replace(QUERY_PLACEHOLDER, encoded_query)
    }
}

fn selectors(
    container: &str,
    title: &str,
    price: &str,
    link: &str,
    rating: Option<&str>,
) -> ResultSelectors {
    ResultSelectors {
        container: container.to_owned(),
        title: title.to_owned(),
        price: price.to_owned(),
        link: link.to_owned(),
        rating: rating.map(str::to_owned),
    }
}

fn amazon(name: &str, host: &str) -> SearchTarget {
    SearchTarget::new(
        name,
        Site::Amazon,
        format!("https://{host}/s?k={QUERY_PLACEHOLDER}"),
        selectors(
            r#"[data-component-type="s-search-result"]"#,
            "h2 a span, h2 span",
            ".a-price .a-offscreen, .a-price-whole",
            "h2 a, a.a-link-normal.s-no-outline",
            Some(".a-icon-star-small .a-icon-alt, .a-icon-alt"),
        ),
    )
}

fn ebay(name: &str, host: &str) -> SearchTarget {
    SearchTarget::new(
        name,
        Site::Ebay,
        format!("https://{host}/sch/i.html?_nkw={QUERY_PLACEHOLDER}"),
        selectors(
            ".s-item",
            ".s-item__title",
            ".s-item__price",
            ".s-item__link",
            Some(".x-star-rating .clipped"),
        ),
    )
}

fn walmart() -> SearchTarget {
    SearchTarget::new(
        "Walmart",
        Site::Walmart,
        format!("https://www.walmart.com/search?q={QUERY_PLACEHOLDER}"),
        selectors(
            r#"[data-item-id], [data-testid="list-view"]"#,
            r#"[data-automation-id="product-title"]"#,
            r#"[data-automation-id="product-price"] .w_iUH7, [itemprop="price"]"#,
            r#"a[link-identifier], a"#,
            None,
        ),
    )
}

fn noon(name: &str, locale_path: &str) -> SearchTarget {
    SearchTarget::new(
        name,
        Site::Generic,
        format!("https://www.noon.com/{locale_path}/search/?q={QUERY_PLACEHOLDER}"),
        selectors(".productContainer", ".productTitle", ".currency, .price", "a", None),
    )
}

fn jumia_egypt() -> SearchTarget {
    SearchTarget::new(
        "Jumia Egypt",
        Site::Generic,
        format!("https://www.jumia.com.eg/catalog/?q={QUERY_PLACEHOLDER}"),
        selectors(".prd", ".name", ".prc", "a", Some(".stars._s")),
    )
}

fn flipkart() -> SearchTarget {
    SearchTarget::new(
        "Flipkart",
        Site::Generic,
        format!("https://www.flipkart.com/search?q={QUERY_PLACEHOLDER}"),
        selectors("._1AtVbE", "._4rR01T", "._30jeq3", "a", Some("._3LWZlK")),
    )
}

/// Search targets for shoppers in `region`. Regions without a dedicated set
/// use the US storefronts.
#[must_use]
pub fn regional_targets(region: Region) -> Vec<SearchTarget> {
    match region {
        Region::Uk => vec![
            amazon("Amazon UK", "www.amazon.co.uk"),
            ebay("eBay UK", "www.ebay.co.uk"),
        ],
        Region::In => vec![amazon("Amazon India", "www.amazon.in"), flipkart()],
        Region::Ae => vec![
            amazon("Amazon UAE", "www.amazon.ae"),
            noon("Noon UAE", "uae-en"),
        ],
        Region::Sa => vec![
            amazon("Amazon Saudi", "www.amazon.sa"),
            noon("Noon Saudi", "saudi-en"),
        ],
        Region::Eg => vec![
            amazon("Amazon Egypt", "www.amazon.eg"),
            noon("Noon Egypt", "egypt-en"),
            jumia_egypt(),
        ],
        _ => vec![
            amazon("Amazon US", "www.amazon.com"),
            ebay("eBay", "www.ebay.com"),
            walmart(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(region: Region) -> Vec<String> {
        regional_targets(region).into_iter().map(|t| t.name).collect()
    }

    #[test]
    fn regional_sets() {
        assert_eq!(names(Region::Us), ["Amazon US", "eBay", "Walmart"]);
        assert_eq!(names(Region::Uk), ["Amazon UK", "eBay UK"]);
        assert_eq!(names(Region::Eg), ["Amazon Egypt", "Noon Egypt", "Jumia Egypt"]);
        assert_eq!(names(Region::In), ["Amazon India", "Flipkart"]);
    }

    #[test]
    fn unlisted_region_uses_us_set() {
        assert_eq!(names(Region::Jp), names(Region::Us));
    }

    #[test]
    fn search_url_substitutes_query() {
        let target = &regional_targets(Region::Uk)[0];
        assert_eq!(
            target.search_url("acme%20kettle"),
            "https://www.amazon.co.uk/s?k=acme%20kettle"
        );
    }
}
