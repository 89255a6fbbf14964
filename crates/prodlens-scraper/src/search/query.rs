//! Search query construction.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use prodlens_core::ProductRecord;

/// Title words kept in a search query. Storefront search degrades quickly on
/// long titles.
pub const MAX_QUERY_WORDS: usize = 5;

/// Builds the plain-text search query for `record`: punctuation becomes
/// whitespace, the brand is prepended unless the title already starts with
/// it, and the result is capped at [`MAX_QUERY_WORDS`] words.
#[must_use]
pub fn build_query(record: &ProductRecord) -> String {
    query_from(&record.title, record.brand())
}

pub(crate) fn query_from(title: &str, brand: Option<&str>) -> String {
    let title_words = words(title);
    let mut out: Vec<String> = Vec::with_capacity(MAX_QUERY_WORDS);

    if let Some(brand) = brand {
        let brand_words = words(brand);
        let already_named = !brand_words.is_empty()
            && title_words.len() >= brand_words.len()
            && title_words
                .iter()
                .zip(&brand_words)
                .all(|(t, b)| t.to_lowercase() == b.to_lowercase());
        if !already_named {
            out.extend(brand_words);
        }
    }
    out.extend(title_words);
    out.truncate(MAX_QUERY_WORDS);
    out.join(" ")
}

fn words(text: &str) -> Vec<String> {
    text.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Percent-encodes a query for a URL query string.
#[must_use]
pub fn encode_query(query: &str) -> String {
    utf8_percent_encode(query, NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_caps_words() {
        assert_eq!(
            query_from("Acme Stainless-Steel Electric Kettle, 1.7L (Silver)", None),
            "Acme Stainless Steel Electric Kettle"
        );
    }

    #[test]
    fn prepends_brand_when_missing_from_title() {
        assert_eq!(
            query_from("Electric Kettle 1.7L", Some("Acme")),
            "Acme Electric Kettle 1 7L"
        );
    }

    #[test]
    fn does_not_repeat_brand() {
        assert_eq!(
            query_from("ACME Electric Kettle", Some("Acme")),
            "ACME Electric Kettle"
        );
    }

    #[test]
    fn empty_title_gives_empty_query() {
        assert_eq!(query_from("  --  ", None), "");
    }

    #[test]
    fn encodes_spaces_and_unicode() {
        assert_eq!(encode_query("café kettle"), "caf%C3%A9%20kettle");
    }
}
