//! Command handlers for the CLI.
//!
//! Each handler builds what it needs from [`AppConfig`] and returns the JSON
//! value `main` prints. Scrape failures abort the command; a failed
//! comparison summary is reported next to the ranked candidates instead.

use std::path::Path;

use anyhow::Context;
use prodlens_core::{AppConfig, ProductRecord};
use prodlens_llm::GeminiClient;
use prodlens_scraper::{extract_product, ComparisonReport, ProductEngine, RawDocument};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CompareOutput {
    product: ProductRecord,
    #[serde(flatten)]
    report: ComparisonReport,
    summary: Option<String>,
    summary_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct AskOutput {
    product: ProductRecord,
    question: String,
    answer: String,
}

/// Scrapes `url`, or extracts from `html_file` when given without fetching.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched, read, or yields no product.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    url: &str,
    html_file: Option<&Path>,
) -> anyhow::Result<serde_json::Value> {
    let record = match html_file {
        Some(path) => {
            let html = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            extract_product(&RawDocument::from_html(url, html))?
        }
        None => engine(config)?.scrape(url).await?,
    };
    Ok(serde_json::to_value(record)?)
}

/// Scrapes `url`, searches the regional storefronts, and ranks what it finds.
///
/// # Errors
///
/// Returns an error if the source page cannot be scraped. Search failures
/// are part of the report, not errors.
pub(crate) async fn run_compare(
    config: &AppConfig,
    url: &str,
    with_summary: bool,
) -> anyhow::Result<serde_json::Value> {
    let engine = engine(config)?;
    let product = engine.scrape(url).await?;
    let report = engine.compare(&product).await;

    let (summary, summary_error) = if with_summary && !report.candidates.is_empty() {
        let result = match GeminiClient::from_app_config(config) {
            Ok(llm) => {
                llm.summarize_comparison(&product, report.region.code(), &report.candidates)
                    .await
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(text) => (Some(text), None),
            Err(e) => {
                tracing::warn!(error = %e, "comparison summary unavailable");
                (None, Some(e.to_string()))
            }
        }
    } else {
        (None, None)
    };

    Ok(serde_json::to_value(CompareOutput {
        product,
        report,
        summary,
        summary_error,
    })?)
}

/// Scrapes `url` and asks the language model `question` about it.
///
/// # Errors
///
/// Returns an error for a blank question, a missing API key, a failed
/// scrape, or any language-model failure.
pub(crate) async fn run_ask(
    config: &AppConfig,
    url: &str,
    question: &str,
) -> anyhow::Result<serde_json::Value> {
    if question.trim().is_empty() {
        anyhow::bail!("question must not be empty");
    }
    let llm = GeminiClient::from_app_config(config)?;
    let product = engine(config)?.scrape(url).await?;
    let answer = llm.answer_question(&product, question).await?;

    Ok(serde_json::to_value(AskOutput {
        product,
        question: question.trim().to_owned(),
        answer,
    })?)
}

fn engine(config: &AppConfig) -> anyhow::Result<ProductEngine> {
    ProductEngine::from_app_config(config).context("failed to build HTTP client")
}
