//! Prompt text built from product records.

use std::fmt::Write as _;

use prodlens_core::{ComparisonCandidate, ProductRecord};

/// Review snippets included in a question prompt.
pub const MAX_CONTEXT_REVIEWS: usize = 3;

/// Descriptions longer than this are cut before they reach the prompt.
const MAX_DESCRIPTION_CHARS: usize = 2_000;

const MISSING: &str = "N/A";

/// Plain-text summary of `record` used as grounding for a question.
#[must_use]
pub fn product_context(record: &ProductRecord) -> String {
    let title = if record.title.is_empty() {
        MISSING
    } else {
        record.title.as_str()
    };
    let description: String = if record.description.trim().is_empty() {
        MISSING.to_owned()
    } else {
        record.description.chars().take(MAX_DESCRIPTION_CHARS).collect()
    };
    let reviews = record
        .reviews
        .iter()
        .take(MAX_CONTEXT_REVIEWS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ");

    let mut out = String::from("Product Information:\n");
    let _ = writeln!(out, "Title: {title}");
    let _ = writeln!(out, "Price: {}", price_text(record));
    let _ = writeln!(out, "Rating: {}", rating_text(record));
    if let Some(brand) = record.brand() {
        let _ = writeln!(out, "Brand: {brand}");
    }
    let _ = writeln!(out, "Description: {description}");
    let _ = writeln!(
        out,
        "Reviews: {}",
        if reviews.is_empty() {
            MISSING
        } else {
            reviews.as_str()
        }
    );
    out
}

/// Prompt asking `question` about `record`.
#[must_use]
pub fn question_prompt(record: &ProductRecord, question: &str) -> String {
    format!(
        "{}\nUser Question: {}\n\nPlease provide a helpful and accurate answer based on the \
         product information above. If the information does not answer the question, say so.\n",
        product_context(record),
        question.trim()
    )
}

/// Prompt asking for a comparison of `record` against ranked `candidates`
/// found in `region`.
#[must_use]
pub fn comparison_prompt(
    record: &ProductRecord,
    region: &str,
    candidates: &[ComparisonCandidate],
) -> String {
    let mut out = String::from("Original Product:\n");
    let _ = writeln!(out, "Title: {}", record.title);
    let _ = writeln!(out, "Price: {}", price_text(record));
    let _ = writeln!(out, "Rating: {}", rating_text(record));
    let _ = writeln!(out, "Source: {}", record.site);
    let _ = writeln!(out, "Region: {region}");
    out.push_str("\nSimilar Products Found in Same Region:\n");
    for (i, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} - {} ({}, similarity {:.2})",
            i + 1,
            candidate.record.title,
            price_text(&candidate.record),
            candidate.platform,
            candidate.similarity_score
        );
    }
    out.push_str(
        "\nPlease provide a comparison analysis including:\n\
         1. Price comparison in the regional currency\n\
         2. Which regional platforms carry similar products\n\
         3. Notable differences or similarities\n\
         4. Best value for money in this region\n",
    );
    out
}

fn price_text(record: &ProductRecord) -> String {
    record
        .price
        .as_ref()
        .map_or_else(|| MISSING.to_owned(), ToString::to_string)
}

fn rating_text(record: &ProductRecord) -> String {
    match (record.rating, record.review_count) {
        (Some(r), Some(n)) => format!("{r} out of 5 ({n} reviews)"),
        (Some(r), None) => format!("{r} out of 5"),
        _ => MISSING.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodlens_core::{Price, Site};
    use rust_decimal::Decimal;

    fn kettle() -> ProductRecord {
        let mut r = ProductRecord::new(
            "https://www.amazon.com/dp/B0KETTLE01",
            Site::Amazon,
            "Acme Electric Kettle",
        );
        r.price = Some(Price {
            amount: Decimal::new(4999, 2),
            currency: "USD".into(),
        });
        r.rating = Some(4.5);
        r.review_count = Some(120);
        r.reviews = vec![
            "Boils fast and quietly.".into(),
            "Lid feels a bit flimsy.".into(),
            "Great value for the price.".into(),
            "Fourth review never shown.".into(),
        ];
        r
    }

    #[test]
    fn context_includes_core_fields_and_three_reviews() {
        let ctx = product_context(&kettle());
        assert!(ctx.contains("Title: Acme Electric Kettle"));
        assert!(ctx.contains("Rating: 4.5 out of 5 (120 reviews)"));
        assert!(ctx.contains("Great value for the price."));
        assert!(!ctx.contains("Fourth review"));
        assert!(ctx.contains("Description: N/A"));
    }

    #[test]
    fn question_is_appended_trimmed() {
        let prompt = question_prompt(&kettle(), "  Is it cordless? ");
        assert!(prompt.contains("User Question: Is it cordless?\n"));
    }

    #[test]
    fn comparison_lists_candidates_in_order() {
        let mut other = kettle();
        other.title = "Acme Kettle 1.7L".into();
        let candidates = vec![
            ComparisonCandidate {
                record: other.clone(),
                platform: "eBay".into(),
                similarity_score: 0.91,
                ranking_rationale: Vec::new(),
            },
            ComparisonCandidate {
                record: other,
                platform: "Walmart".into(),
                similarity_score: 0.5,
                ranking_rationale: Vec::new(),
            },
        ];
        let prompt = comparison_prompt(&kettle(), "US", &candidates);
        assert!(prompt.contains("Region: US"));
        let ebay = prompt.find("(eBay, similarity 0.91)").unwrap();
        let walmart = prompt.find("(Walmart, similarity 0.50)").unwrap();
        assert!(ebay < walmart);
    }
}
