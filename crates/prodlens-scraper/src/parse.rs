//! Field-level parsing of scraped text into typed values.
//!
//! Every function here returns `None` (or [`Availability::Unknown`]) for
//! text it does not recognize. Nothing is ever defaulted to zero or guessed
//! toward a "good" value.

use std::str::FromStr;
use std::sync::LazyLock;

use prodlens_core::{Availability, Price};
use regex::Regex;
use rust_decimal::Decimal;

/// Currencies written as `$`.
const DOLLAR_FAMILY: &[&str] = &["USD", "CAD", "AUD", "MXN", "SGD", "HKD", "NZD"];
const YEN_FAMILY: &[&str] = &["JPY", "CNY"];

/// Symbol tokens, longest first so `US$` is preferred over `$` at the same
/// position. The first currency in each family is the default.
const SYMBOL_TOKENS: &[(&str, &[&str])] = &[
    ("US$", &["USD"]),
    ("CA$", &["CAD"]),
    ("AU$", &["AUD"]),
    ("MX$", &["MXN"]),
    ("HK$", &["HKD"]),
    ("NZ$", &["NZD"]),
    ("CN¥", &["CNY"]),
    ("ر.س", &["SAR"]),
    ("د.إ", &["AED"]),
    ("C$", &["CAD"]),
    ("A$", &["AUD"]),
    ("R$", &["BRL"]),
    ("S$", &["SGD"]),
    ("E£", &["EGP"]),
    ("$", DOLLAR_FAMILY),
    ("€", &["EUR"]),
    ("£", &["GBP"]),
    ("₹", &["INR"]),
    ("¥", YEN_FAMILY),
    ("₺", &["TRY"]),
    ("₦", &["NGN"]),
];

/// Alphabetic tokens; only matched as whole words.
const WORD_TOKENS: &[(&str, &[&str])] = &[
    ("KSh", &["KES"]),
    ("RMB", &["CNY"]),
    ("Rs", &["INR"]),
    ("TL", &["TRY"]),
    ("USD", &["USD"]),
    ("EUR", &["EUR"]),
    ("GBP", &["GBP"]),
    ("CAD", &["CAD"]),
    ("AUD", &["AUD"]),
    ("INR", &["INR"]),
    ("JPY", &["JPY"]),
    ("CNY", &["CNY"]),
    ("BRL", &["BRL"]),
    ("MXN", &["MXN"]),
    ("SAR", &["SAR"]),
    ("AED", &["AED"]),
    ("EGP", &["EGP"]),
    ("TRY", &["TRY"]),
    ("SGD", &["SGD"]),
    ("KES", &["KES"]),
    ("NGN", &["NGN"]),
    ("HKD", &["HKD"]),
    ("NZD", &["NZD"]),
    ("CHF", &["CHF"]),
    ("ZAR", &["ZAR"]),
    ("PLN", &["PLN"]),
    ("SEK", &["SEK"]),
    ("NOK", &["NOK"]),
    ("DKK", &["DKK"]),
    ("CZK", &["CZK"]),
    ("KRW", &["KRW"]),
    ("MYR", &["MYR"]),
    ("THB", &["THB"]),
    ("PHP", &["PHP"]),
    ("IDR", &["IDR"]),
    ("PKR", &["PKR"]),
    ("QAR", &["QAR"]),
    ("KWD", &["KWD"]),
    ("ILS", &["ILS"]),
];

/// Currencies whose storefronts write `1.299,00`.
const COMMA_DECIMAL_CURRENCIES: &[&str] = &[
    "EUR", "BRL", "TRY", "PLN", "SEK", "NOK", "DKK", "CZK", "IDR", "RUB", "UAH", "HUF", "RON",
    "VND",
];

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        // Indian lakh grouping: 1,29,999
        r"\d{1,2}(?:,\d{2})+,\d{3}(?:\.\d{1,2})?",
        r"|\d{1,3}(?:[.,\s\u{a0}\u{202f}]\d{3})+(?:[.,]\d{1,2})?",
        r"|\d+(?:[.,]\d+)?",
    ))
    .expect("valid regex")
});

/// A bare ISO 4217-shaped code, used when no known marker is present.
static ISO_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{3}\b").expect("valid regex"));

static RATING_OUT_OF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:out\s+of|of|von|sur|de|/)\s*(\d+(?:[.,]\d+)?)")
        .expect("valid regex")
});
static RATING_PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*%").expect("valid regex"));
static RATING_STARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:stars?|★|sterne|étoiles|estrellas)")
        .expect("valid regex")
});
static RATING_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?\s*(\d+(?:[.,]\d+)?)\s*\)?$").expect("valid regex"));

static REVIEW_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:[,.\s\u{a0}\u{202f}]\d{3})+|\d+(?:[.,]\d+)?)\s*([kKmM])?(?:\b|$)")
        .expect("valid regex")
});

static ONLY_LEFT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"only \d+ left").expect("valid regex"));

/// A negation a few words before an in-stock phrase ("not yet in stock").
static NEGATED_IN_STOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:not|never)\b(?:\s+\w+){0,2}\s+(?:in stock|instock|available)")
        .expect("valid regex")
});

const OUT_OF_STOCK_PHRASES: &[&str] = &[
    "out of stock",
    "not in stock",
    "not currently in stock",
    "no stock",
    "none in stock",
    "outofstock",
    "sold out",
    "soldout",
    "currently unavailable",
    "unavailable",
    "not available",
    "no longer available",
    "discontinued",
];

const IN_STOCK_PHRASES: &[&str] = &[
    "in stock",
    "instock",
    "limitedavailability",
    "available",
    "add to cart",
    "add to basket",
    "ships",
];

/// Collapses runs of whitespace (including non-breaking spaces) to a single
/// space and trims the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a price such as `"$1,299.00"`, `"€49,99"`, or `"1.299,00 EUR"`.
///
/// The currency comes from a symbol or ISO code in the text. An ambiguous
/// symbol (`$`, `¥`) resolves to `fallback_currency` when that currency uses
/// the symbol. Text without any currency marker only parses when a
/// `fallback_currency` is supplied.
#[must_use]
pub fn parse_price(text: &str, fallback_currency: Option<&str>) -> Option<Price> {
    let text = collapse_whitespace(text);
    if text.is_empty() {
        return None;
    }

    let amounts: Vec<regex::Match<'_>> = AMOUNT_RE.find_iter(&text).collect();
    if amounts.is_empty() {
        return None;
    }

    let (currency, raw_amount) = match find_currency(&text, fallback_currency) {
        Some(found) => {
            let amount = amount_near(&text, &amounts, found.start, found.end)?;
            (found.code, amount)
        }
        None => match iso_code_near(&text, &amounts) {
            Some(found) => found,
            None => (fallback_currency?.to_owned(), amounts[0].as_str()),
        },
    };

    let comma_decimal = COMMA_DECIMAL_CURRENCIES.contains(&currency.as_str());
    let amount = parse_amount(raw_amount, comma_decimal)?;
    if amount.is_sign_negative() {
        return None;
    }
    Some(Price { amount, currency })
}

/// Whether `text` carries a currency symbol or code anywhere.
#[must_use]
pub fn has_currency_marker(text: &str) -> bool {
    find_currency(text, None).is_some()
}

struct CurrencyMatch {
    start: usize,
    end: usize,
    code: String,
}

fn find_currency(text: &str, fallback: Option<&str>) -> Option<CurrencyMatch> {
    let mut found: Vec<(usize, usize, &'static [&'static str])> = Vec::new();

    for (token, family) in SYMBOL_TOKENS {
        if let Some(start) = text.find(token) {
            found.push((start, start + token.len(), *family));
        }
    }
    for (token, family) in WORD_TOKENS {
        for (start, _) in text.match_indices(token) {
            let end = start + token.len();
            let before_ok = !text[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphabetic);
            let after_ok = !text[end..].chars().next().is_some_and(char::is_alphabetic);
            if before_ok && after_ok {
                found.push((start, end, *family));
                break;
            }
        }
    }

    // Earliest marker wins; at equal start the longer token wins.
    found.sort_by(|a, b| a.0.cmp(&b.0).then((b.1 - b.0).cmp(&(a.1 - a.0))));
    let &(start, end, family) = found.first()?;

    let code = if family.len() == 1 {
        family[0]
    } else if let Some(explicit) = found
        .iter()
        .skip(1)
        .find(|(_, _, other)| other.len() == 1 && family.contains(&other[0]))
    {
        // "$25 CAD": the ISO code disambiguates the symbol.
        explicit.2[0]
    } else {
        fallback
            .and_then(|fb| family.iter().find(|c| **c == fb))
            .copied()
            .unwrap_or(family[0])
    };

    Some(CurrencyMatch {
        start,
        end,
        code: code.to_owned(),
    })
}

/// `"4990 RUB"` / `"UAH 1 299"`: an unlisted three-letter code counts as the
/// currency only when it sits right next to an amount.
fn iso_code_near<'t>(text: &'t str, amounts: &[regex::Match<'t>]) -> Option<(String, &'t str)> {
    ISO_CODE_RE.find_iter(text).find_map(|code| {
        amount_near(text, amounts, code.start(), code.end())
            .map(|amount| (code.as_str().to_owned(), amount))
    })
}

/// Picks the amount written directly after the currency marker, else the one
/// directly before it.
fn amount_near<'t>(
    text: &'t str,
    amounts: &[regex::Match<'t>],
    marker_start: usize,
    marker_end: usize,
) -> Option<&'t str> {
    let is_gap = |gap: &str| {
        gap.chars()
            .all(|c| c.is_whitespace() || c == '.' || c == ':')
    };

    let after = amounts
        .iter()
        .find(|m| m.start() >= marker_end && is_gap(&text[marker_end..m.start()]));
    if let Some(m) = after {
        return Some(m.as_str());
    }

    amounts
        .iter()
        .rev()
        .find(|m| m.end() <= marker_start && is_gap(&text[m.end()..marker_start]))
        .map(regex::Match::as_str)
}

/// Converts a matched numeric token to a decimal, resolving `.` / `,` as
/// decimal or thousands separators.
fn parse_amount(raw: &str, comma_decimal: bool) -> Option<Decimal> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let dots = compact.matches('.').count();
    let commas = compact.matches(',').count();

    let normalized = if dots > 0 && commas > 0 {
        let last_dot = compact.rfind('.')?;
        let last_comma = compact.rfind(',')?;
        let (decimal, thousands) = if last_dot > last_comma {
            ('.', ',')
        } else {
            (',', '.')
        };
        if compact.matches(decimal).count() > 1 {
            return None;
        }
        compact.replace(thousands, "").replace(decimal, ".")
    } else if dots + commas > 0 {
        let sep = if dots > 0 { '.' } else { ',' };
        let idx = compact.rfind(sep)?;
        let decimals = compact.len() - idx - 1;
        if dots + commas > 1 && decimals != 3 {
            // "1.299.00": a short last group is the fraction.
            let whole = compact[..idx].replace(sep, "");
            return Decimal::from_str(&format!("{whole}.{}", &compact[idx + 1..])).ok();
        }
        // "0.995" and "1234.567" cannot be thousands-grouped.
        let head = &compact[..idx];
        let groupable = (1..=3).contains(&head.len()) && head != "0";
        let thousands = dots + commas > 1
            || (decimals == 3 && groupable && (sep == ',' || comma_decimal));
        if thousands {
            compact.replace(sep, "")
        } else {
            compact.replace(sep, ".")
        }
    } else {
        compact
    };

    Decimal::from_str(&normalized).ok()
}

/// Parses a rating onto the 0–5 scale.
///
/// Recognized forms, tried in order: `"4.5 out of 5 stars"` (also `4,6 von 5`,
/// `9/10`), `"90%"`, `"4 stars"`, and a bare number such as `"4.5"` or
/// `"(4.5)"`. The first recognized form decides: if its value is out of range
/// the result is `None`, never a clamped value.
#[must_use]
pub fn parse_rating(text: &str) -> Option<f64> {
    let text = collapse_whitespace(text);

    if let Some(caps) = RATING_OUT_OF_RE.captures(&text) {
        let value = parse_float(&caps[1])?;
        let scale = parse_float(&caps[2])?;
        if scale <= 0.0 || value > scale {
            return None;
        }
        #[allow(clippy::float_cmp)]
        let five_point = if scale == 5.0 {
            value
        } else {
            value / scale * 5.0
        };
        return finish_rating(five_point);
    }

    if let Some(caps) = RATING_PERCENT_RE.captures(&text) {
        let pct = parse_float(&caps[1])?;
        if pct > 100.0 {
            return None;
        }
        return finish_rating(pct / 20.0);
    }

    if let Some(caps) = RATING_STARS_RE.captures(&text) {
        return finish_rating(parse_float(&caps[1])?);
    }

    let caps = RATING_BARE_RE.captures(&text)?;
    finish_rating(parse_float(&caps[1])?)
}

fn finish_rating(value: f64) -> Option<f64> {
    if !(0.0..=5.0).contains(&value) {
        return None;
    }
    Some((value * 100.0).round() / 100.0)
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse::<f64>().ok()
}

/// Parses review counts such as `"1,234 ratings"`, `"(2.3K)"`, or
/// `"12 045 avis"`.
#[must_use]
pub fn parse_review_count(text: &str) -> Option<u64> {
    let caps = REVIEW_COUNT_RE.captures(text)?;
    let number = &caps[1];

    if let Some(suffix) = caps.get(2) {
        let multiplier = match suffix.as_str() {
            "k" | "K" => 1_000.0,
            _ => 1_000_000.0,
        };
        let scaled = (parse_float(number)? * multiplier).round();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = scaled as u64;
        return Some(count);
    }

    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    let grouped = number.len() > 3
        && number
            .chars()
            .any(|c| matches!(c, ',' | '.') || c.is_whitespace());
    // "4.5" without a K suffix is not a count.
    if !grouped && number.contains(['.', ',']) {
        return None;
    }
    digits.parse().ok()
}

/// Classifies free-text stock messages. Out-of-stock phrases are checked
/// first because several of them contain in-stock words ("unavailable").
#[must_use]
pub fn parse_availability(text: &str) -> Availability {
    let lower = collapse_whitespace(text).to_lowercase();
    if lower.is_empty() {
        return Availability::Unknown;
    }
    if OUT_OF_STOCK_PHRASES.iter().any(|p| lower.contains(p))
        || NEGATED_IN_STOCK_RE.is_match(&lower)
    {
        return Availability::OutOfStock;
    }
    if ONLY_LEFT_RE.is_match(&lower) || IN_STOCK_PHRASES.iter().any(|p| lower.contains(p)) {
        return Availability::InStock;
    }
    Availability::Unknown
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
