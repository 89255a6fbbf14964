//! Host-based site classification.

use prodlens_core::Site;
use reqwest::Url;

use crate::extract::PROFILES;

/// Labels after the brand label may only be public-suffix parts such as
/// `com`, `co`, `uk`: this keeps `amazon.example.org` generic.
const MAX_SUFFIX_LABEL_LEN: usize = 3;

/// Picks the extraction profile for `url`.
///
/// Profiles are checked in registration order and the first whose matcher
/// names a host label wins. Anything unrecognised, including text that is
/// not a URL at all, is [`Site::Generic`].
#[must_use]
pub fn classify(url: &str) -> Site {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed)
        .or_else(|_| Url::parse(&format!("https://{trimmed}")))
        .ok();
    parsed
        .as_ref()
        .and_then(Url::host_str)
        .map_or(Site::Generic, classify_host)
}

/// Classifies a bare host name such as `www.amazon.co.uk`.
#[must_use]
pub fn classify_host(host: &str) -> Site {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').collect();

    PROFILES
        .iter()
        .find(|profile| {
            profile
                .domain_matchers
                .iter()
                .any(|matcher| has_brand_label(&labels, matcher))
        })
        .map_or(Site::Generic, |profile| profile.site)
}

fn has_brand_label(labels: &[&str], brand: &str) -> bool {
    labels.iter().enumerate().any(|(i, label)| {
        *label == brand
            && i + 1 < labels.len()
            && labels[i + 1..]
                .iter()
                .all(|suffix| !suffix.is_empty() && suffix.len() <= MAX_SUFFIX_LABEL_LEN)
    })
}
