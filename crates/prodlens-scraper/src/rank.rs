//! Comparison ranking.
//!
//! A candidate's score is the weighted sum of four per-attribute
//! similarities, each in `[0, 1]`, divided by the total weight:
//!
//! - **title**: Jaccard overlap of lower-cased word sets, stopwords removed;
//! - **price**: relative difference `d = |a - b| / max(a, b)`, scored
//!   `1 - 0.5·d/t` up to the threshold `t` and `0.5·(1 - d)/(1 - t)` beyond
//!   it, so prices past the threshold fall off steeply;
//! - **rating**: `1 - |a - b| / 5`;
//! - **brand**: 1 when both brands are known and equal.
//!
//! An attribute missing on either side scores 0 without excluding the
//! candidate. Scoring is pure, so equal inputs always rank the same way.

use std::collections::BTreeSet;

use prodlens_core::{
    ComparisonCandidate, MatchAttribute, MatchKind, Price, ProductRecord, RankSettings,
};
use rust_decimal::prelude::ToPrimitive;

use crate::search::SimilarProduct;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "by", "for", "from", "in", "of", "on", "or", "the", "to", "with",
];

/// Scores every candidate against `source` and orders them by descending
/// similarity. Equal scores keep discovery order.
#[must_use]
pub fn rank(
    source: &ProductRecord,
    candidates: Vec<SimilarProduct>,
    settings: &RankSettings,
) -> Vec<ComparisonCandidate> {
    let source_tokens = title_tokens(&source.title);

    let mut ranked: Vec<ComparisonCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let (similarity_score, ranking_rationale) =
                score_with_tokens(source, &source_tokens, &candidate.record, settings);
            ComparisonCandidate {
                record: candidate.record,
                platform: candidate.platform,
                similarity_score,
                ranking_rationale,
            }
        })
        .collect();

    // sort_by is stable.
    ranked.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
    ranked
}

/// Similarity of `candidate` to `source` in `[0, 1]` plus the attributes
/// that contributed, strongest first.
#[must_use]
pub fn similarity(
    source: &ProductRecord,
    candidate: &ProductRecord,
    settings: &RankSettings,
) -> (f64, Vec<MatchAttribute>) {
    score_with_tokens(source, &title_tokens(&source.title), candidate, settings)
}

fn score_with_tokens(
    source: &ProductRecord,
    source_tokens: &BTreeSet<String>,
    candidate: &ProductRecord,
    settings: &RankSettings,
) -> (f64, Vec<MatchAttribute>) {
    let parts = [
        (
            MatchKind::Title,
            settings.title_weight,
            jaccard(source_tokens, &title_tokens(&candidate.title)),
        ),
        (
            MatchKind::Price,
            settings.price_weight,
            match (&source.price, &candidate.price) {
                (Some(a), Some(b)) => price_proximity(a, b, settings.price_threshold),
                _ => 0.0,
            },
        ),
        (
            MatchKind::Rating,
            settings.rating_weight,
            match (source.rating, candidate.rating) {
                (Some(a), Some(b)) => rating_proximity(a, b),
                _ => 0.0,
            },
        ),
        (
            MatchKind::Brand,
            settings.brand_weight,
            brand_match(source.brand(), candidate.brand()),
        ),
    ];

    let total_weight: f64 = parts.iter().map(|(_, w, _)| w.max(0.0)).sum();
    if total_weight <= 0.0 {
        return (0.0, Vec::new());
    }
    let weighted: f64 = parts.iter().map(|(_, w, s)| w.max(0.0) * s).sum();
    let score = (weighted / total_weight).clamp(0.0, 1.0);

    let mut rationale: Vec<MatchAttribute> = parts
        .iter()
        .filter(|(_, w, s)| *w > 0.0 && *s > 0.0)
        .map(|(kind, _, s)| MatchAttribute {
            attribute: *kind,
            score: *s,
        })
        .collect();
    rationale.sort_by(|a, b| b.score.total_cmp(&a.score));

    (score, rationale)
}

fn title_tokens(title: &str) -> BTreeSet<String> {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(str::to_owned)
        .collect()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = a.intersection(b).count() as f64 / union as f64;
    ratio
}

/// Prices in different currencies are not compared.
fn price_proximity(a: &Price, b: &Price, threshold: f64) -> f64 {
    if !a.currency.eq_ignore_ascii_case(&b.currency) {
        return 0.0;
    }
    let (Some(a), Some(b)) = (a.amount.to_f64(), b.amount.to_f64()) else {
        return 0.0;
    };
    let max = a.max(b);
    if max <= 0.0 {
        return 1.0;
    }
    let d = (a - b).abs() / max;
    let t = threshold.clamp(f64::EPSILON, 1.0 - f64::EPSILON);
    if d <= t {
        1.0 - 0.5 * d / t
    } else {
        (0.5 * (1.0 - d) / (1.0 - t)).max(0.0)
    }
}

fn rating_proximity(a: f64, b: f64) -> f64 {
    (1.0 - (a - b).abs() / 5.0).clamp(0.0, 1.0)
}

fn brand_match(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a.trim().to_lowercase() == b.trim().to_lowercase() => 1.0,
        _ => 0.0,
    }
}
