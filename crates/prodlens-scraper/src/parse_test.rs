use super::*;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn price(text: &str) -> Option<Price> {
    parse_price(text, None)
}

// -----------------------------------------------------------------------
// parse_price
// -----------------------------------------------------------------------

#[test]
fn price_dollar_with_thousands() {
    let p = price("$1,299.00").unwrap();
    assert_eq!(p.amount, dec("1299.00"));
    assert_eq!(p.currency, "USD");
}

#[test]
fn price_euro_with_decimal_comma() {
    let p = price("€49,99").unwrap();
    assert_eq!(p.amount, dec("49.99"));
    assert_eq!(p.currency, "EUR");
}

#[test]
fn price_euro_symbol_after_amount() {
    let p = price("1.299,00 €").unwrap();
    assert_eq!(p.amount, dec("1299.00"));
    assert_eq!(p.currency, "EUR");
}

#[test]
fn price_euro_dot_thousands_without_decimals() {
    let p = price("1.299 €").unwrap();
    assert_eq!(p.amount, dec("1299"));
}

#[test]
fn price_iso_code_after_amount() {
    let p = price("1.299,00 EUR").unwrap();
    assert_eq!(p.amount, dec("1299.00"));
    assert_eq!(p.currency, "EUR");
}

#[test]
fn price_pound() {
    let p = price("£12.50").unwrap();
    assert_eq!(p.amount, dec("12.50"));
    assert_eq!(p.currency, "GBP");
}

#[test]
fn price_rupee_lakh_grouping() {
    let p = price("₹1,29,999").unwrap();
    assert_eq!(p.amount, dec("129999"));
    assert_eq!(p.currency, "INR");
}

#[test]
fn price_rs_prefix_with_dot() {
    let p = price("Rs. 499").unwrap();
    assert_eq!(p.amount, dec("499"));
    assert_eq!(p.currency, "INR");
}

#[test]
fn price_prefixed_dollar_variants() {
    assert_eq!(price("CA$25.00").unwrap().currency, "CAD");
    assert_eq!(price("R$ 1.299,90").unwrap().amount, dec("1299.90"));
    assert_eq!(price("R$ 1.299,90").unwrap().currency, "BRL");
}

#[test]
fn price_ebay_style_us_prefix() {
    let p = price("US $1,299.00").unwrap();
    assert_eq!(p.amount, dec("1299.00"));
    assert_eq!(p.currency, "USD");
}

#[test]
fn price_iso_code_disambiguates_dollar() {
    let p = price("$25 CAD").unwrap();
    assert_eq!(p.currency, "CAD");
    assert_eq!(p.amount, dec("25"));
}

#[test]
fn price_dollar_uses_fallback_in_same_family() {
    let p = parse_price("$19.99", Some("AUD")).unwrap();
    assert_eq!(p.currency, "AUD");
}

#[test]
fn price_dollar_ignores_fallback_outside_family() {
    let p = parse_price("$19.99", Some("EUR")).unwrap();
    assert_eq!(p.currency, "USD");
}

#[test]
fn price_yen_defaults_to_jpy() {
    let p = price("¥1,980").unwrap();
    assert_eq!(p.amount, dec("1980"));
    assert_eq!(p.currency, "JPY");
}

#[test]
fn price_range_takes_first_amount() {
    assert_eq!(price("$10.00 - $20.00").unwrap().amount, dec("10.00"));
}

#[test]
fn price_without_marker_needs_fallback() {
    assert!(price("19.99").is_none());
    let p = parse_price("19.99", Some("GBP")).unwrap();
    assert_eq!(p.amount, dec("19.99"));
    assert_eq!(p.currency, "GBP");
}

#[test]
fn price_unparsable_text_is_absent_not_zero() {
    assert!(price("Price not available").is_none());
    assert!(price("").is_none());
    assert!(price("$").is_none());
}

#[test]
fn price_unlisted_iso_code_next_to_amount() {
    let p = price("4990 RUB").unwrap();
    assert_eq!(p.amount, dec("4990"));
    assert_eq!(p.currency, "RUB");
    let p = price("HUF 12.990").unwrap();
    assert_eq!(p.amount, dec("12990"));
    assert_eq!(p.currency, "HUF");
}

#[test]
fn price_unlisted_code_far_from_amount_is_ignored() {
    assert!(price("NEW model, 4990").is_none());
}

#[test]
fn price_short_last_group_is_the_fraction() {
    let p = price("€1.299.00").unwrap();
    assert_eq!(p.amount, dec("1299.00"));
    assert_eq!(price("$1,299,5").unwrap().amount, dec("1299.5"));
    assert_eq!(price("$1,299,000").unwrap().amount, dec("1299000"));
}

#[test]
fn price_canonical_form_parses_back() {
    let p = price("1299.00 USD").unwrap();
    assert_eq!(p.amount, dec("1299.00"));
    assert_eq!(p.currency, "USD");
}

// -----------------------------------------------------------------------
// parse_rating
// -----------------------------------------------------------------------

fn assert_rating(text: &str, expected: f64) {
    let got = parse_rating(text).unwrap_or_else(|| panic!("no rating parsed from {text:?}"));
    assert!(
        (got - expected).abs() < 1e-9,
        "{text:?}: expected {expected}, got {got}"
    );
}

#[test]
fn rating_out_of_five() {
    assert_rating("4.5 out of 5 stars", 4.5);
}

#[test]
fn rating_percent() {
    assert_rating("90%", 4.5);
}

#[test]
fn rating_german_decimal_comma() {
    assert_rating("4,6 von 5 Sternen", 4.6);
}

#[test]
fn rating_ten_point_scale() {
    assert_rating("8/10", 4.0);
    assert_rating("3.7 out of 10", 1.85);
}

#[test]
fn rating_star_suffix_and_bare_forms() {
    assert_rating("4 stars", 4.0);
    assert_rating("(4.5)", 4.5);
    assert_rating("4.33", 4.33);
}

#[test]
fn rating_out_of_range_is_absent_not_clamped() {
    assert!(parse_rating("6 out of 5").is_none());
    assert!(parse_rating("150%").is_none());
    assert!(parse_rating("7 stars").is_none());
    assert!(parse_rating("12").is_none());
}

#[test]
fn rating_nonsense_is_absent() {
    assert!(parse_rating("great product").is_none());
    assert!(parse_rating("").is_none());
}

// -----------------------------------------------------------------------
// parse_review_count
// -----------------------------------------------------------------------

#[test]
fn review_count_grouped() {
    assert_eq!(parse_review_count("1,234 ratings"), Some(1234));
    assert_eq!(parse_review_count("12 045 avis"), Some(12045));
}

#[test]
fn review_count_plain() {
    assert_eq!(parse_review_count("87 global ratings"), Some(87));
}

#[test]
fn review_count_k_suffix() {
    assert_eq!(parse_review_count("(2.3K)"), Some(2300));
}

#[test]
fn review_count_rejects_non_counts() {
    assert_eq!(parse_review_count("no reviews yet"), None);
    assert_eq!(parse_review_count("4.5"), None);
}

// -----------------------------------------------------------------------
// parse_availability
// -----------------------------------------------------------------------

#[test]
fn availability_in_stock_phrases() {
    assert_eq!(parse_availability("In Stock."), Availability::InStock);
    assert_eq!(
        parse_availability("Only 2 left - order soon."),
        Availability::InStock
    );
    assert_eq!(parse_availability("Ships in 3 days"), Availability::InStock);
    assert_eq!(
        parse_availability("https://schema.org/InStock"),
        Availability::InStock
    );
}

#[test]
fn availability_out_of_stock_checked_first() {
    assert_eq!(
        parse_availability("Currently unavailable."),
        Availability::OutOfStock
    );
    assert_eq!(
        parse_availability("https://schema.org/OutOfStock"),
        Availability::OutOfStock
    );
    assert_eq!(parse_availability("SOLD OUT"), Availability::OutOfStock);
}

#[test]
fn availability_negated_in_stock_is_out_of_stock() {
    assert_eq!(parse_availability("Not in stock"), Availability::OutOfStock);
    assert_eq!(
        parse_availability("Not in stock online"),
        Availability::OutOfStock
    );
    assert_eq!(
        parse_availability("This item is not currently in stock."),
        Availability::OutOfStock
    );
    assert_eq!(
        parse_availability("Not yet available"),
        Availability::OutOfStock
    );
    assert_eq!(parse_availability("No stock"), Availability::OutOfStock);
    assert_eq!(
        parse_availability("In Stock. No returns available."),
        Availability::InStock
    );
}

#[test]
fn availability_unmatched_is_unknown() {
    assert_eq!(parse_availability("Contact seller"), Availability::Unknown);
    assert_eq!(parse_availability("   "), Availability::Unknown);
}

#[test]
fn collapse_whitespace_handles_nbsp() {
    assert_eq!(collapse_whitespace("  a \n\t b\u{a0}c "), "a b c");
}

#[test]
fn currency_marker_detection() {
    assert!(has_currency_marker("From $19.99"));
    assert!(has_currency_marker("49,99 EUR"));
    assert!(!has_currency_marker("Pack of 3"));
    assert!(!has_currency_marker("USDA organic"));
}
