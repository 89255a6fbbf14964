//! Storefront region detection.
//!
//! The region decides which storefronts are searched for comparable products
//! and which currency a bare `$` or an unlabeled number most likely means.

use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Us,
    Uk,
    De,
    Fr,
    It,
    Es,
    Ca,
    Au,
    In,
    Br,
    Mx,
    Sa,
    Ae,
    Eg,
    Tr,
    Sg,
    Jp,
    Ke,
    Ng,
    Cn,
}

impl Region {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Uk => "UK",
            Region::De => "DE",
            Region::Fr => "FR",
            Region::It => "IT",
            Region::Es => "ES",
            Region::Ca => "CA",
            Region::Au => "AU",
            Region::In => "IN",
            Region::Br => "BR",
            Region::Mx => "MX",
            Region::Sa => "SA",
            Region::Ae => "AE",
            Region::Eg => "EG",
            Region::Tr => "TR",
            Region::Sg => "SG",
            Region::Jp => "JP",
            Region::Ke => "KE",
            Region::Ng => "NG",
            Region::Cn => "CN",
        }
    }

    /// ISO 4217 code of the region's currency.
    #[must_use]
    pub fn currency(self) -> &'static str {
        match self {
            Region::Us => "USD",
            Region::Uk => "GBP",
            Region::De | Region::Fr | Region::It | Region::Es => "EUR",
            Region::Ca => "CAD",
            Region::Au => "AUD",
            Region::In => "INR",
            Region::Br => "BRL",
            Region::Mx => "MXN",
            Region::Sa => "SAR",
            Region::Ae => "AED",
            Region::Eg => "EGP",
            Region::Tr => "TRY",
            Region::Sg => "SGD",
            Region::Jp => "JPY",
            Region::Ke => "KES",
            Region::Ng => "NGN",
            Region::Cn => "CNY",
        }
    }

    /// Maps an ISO 3166 alpha-2 country code (`GB` and `UK` both work).
    #[must_use]
    pub fn from_country_code(code: &str) -> Option<Region> {
        let region = match code.trim().to_ascii_uppercase().as_str() {
            "US" => Region::Us,
            "GB" | "UK" => Region::Uk,
            "DE" => Region::De,
            "FR" => Region::Fr,
            "IT" => Region::It,
            "ES" => Region::Es,
            "CA" => Region::Ca,
            "AU" => Region::Au,
            "IN" => Region::In,
            "BR" => Region::Br,
            "MX" => Region::Mx,
            "SA" => Region::Sa,
            "AE" => Region::Ae,
            "EG" => Region::Eg,
            "TR" => Region::Tr,
            "SG" => Region::Sg,
            "JP" => Region::Jp,
            "KE" => Region::Ke,
            "NG" => Region::Ng,
            "CN" => Region::Cn,
            _ => return None,
        };
        Some(region)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Storefronts whose domain does not reveal the country on its own.
const STORE_DOMAINS: &[(&str, Region)] = &[
    ("flipkart.com", Region::In),
    ("souq.com", Region::Ae),
    ("carrefour.com", Region::Fr),
    ("walmart.com", Region::Us),
    ("target.com", Region::Us),
    ("bestbuy.com", Region::Us),
    ("fnac.com", Region::Fr),
    ("taobao.com", Region::Cn),
    ("tmall.com", Region::Cn),
];

/// Country-code suffixes, most specific first.
const TLD_SUFFIXES: &[(&str, Region)] = &[
    ("co.uk", Region::Uk),
    ("com.au", Region::Au),
    ("co.in", Region::In),
    ("com.br", Region::Br),
    ("com.mx", Region::Mx),
    ("com.sa", Region::Sa),
    ("com.eg", Region::Eg),
    ("com.tr", Region::Tr),
    ("com.sg", Region::Sg),
    ("co.jp", Region::Jp),
    ("co.ke", Region::Ke),
    ("com.ng", Region::Ng),
    ("com.cn", Region::Cn),
    ("uk", Region::Uk),
    ("de", Region::De),
    ("fr", Region::Fr),
    ("it", Region::It),
    ("es", Region::Es),
    ("ca", Region::Ca),
    ("au", Region::Au),
    ("in", Region::In),
    ("br", Region::Br),
    ("mx", Region::Mx),
    ("sa", Region::Sa),
    ("ae", Region::Ae),
    ("eg", Region::Eg),
    ("tr", Region::Tr),
    ("sg", Region::Sg),
    ("jp", Region::Jp),
    ("ke", Region::Ke),
    ("ng", Region::Ng),
    ("cn", Region::Cn),
];

/// Region for a product URL, defaulting to [`Region::Us`] for unknown hosts.
#[must_use]
pub fn detect_region(url: &str) -> Region {
    region_for_host(url).unwrap_or(Region::Us)
}

/// Region for a product URL, or `None` when the host says nothing about the
/// country (`.com`, `.net`, unparsable URLs).
#[must_use]
pub fn region_for_host(url: &str) -> Option<Region> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_end_matches('.').to_ascii_lowercase();

    // noon.com serves every country from one host and encodes it in the path.
    if host_matches(&host, "noon.com") {
        let path = parsed.path().to_ascii_lowercase();
        return Some(if path.starts_with("/saudi-") {
            Region::Sa
        } else if path.starts_with("/egypt-") {
            Region::Eg
        } else {
            Region::Ae
        });
    }

    if let Some((_, region)) = STORE_DOMAINS
        .iter()
        .find(|(domain, _)| host_matches(&host, domain))
    {
        return Some(*region);
    }

    TLD_SUFFIXES
        .iter()
        .find(|(suffix, _)| host.ends_with(&format!(".{suffix}")))
        .map(|(_, region)| *region)
}

/// Currency implied by a locale tag such as `en-GB`, `de_DE`, or `ja-JP`.
/// A bare language (`de`) is not enough to pick a currency.
#[must_use]
pub fn currency_for_locale(locale: &str) -> Option<&'static str> {
    let country = locale.split(['-', '_']).nth(1)?;
    Region::from_country_code(country).map(Region::currency)
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
