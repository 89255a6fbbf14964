//! Product questions and comparison summaries on top of [`GeminiClient`].

use prodlens_core::{ComparisonCandidate, ProductRecord};

use crate::client::GeminiClient;
use crate::error::LlmError;
use crate::prompt::{comparison_prompt, question_prompt};

impl GeminiClient {
    /// Answers a free-text question about `record`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::InvalidRequest`] for a blank question, otherwise
    /// whatever [`generate`](Self::generate) returns.
    pub async fn answer_question(
        &self,
        record: &ProductRecord,
        question: &str,
    ) -> Result<String, LlmError> {
        if question.trim().is_empty() {
            return Err(LlmError::InvalidRequest(
                "question must not be empty".to_owned(),
            ));
        }
        tracing::info!(
            url = %record.source_url,
            model = %self.model(),
            "answering product question"
        );
        self.generate(&question_prompt(record, question)).await
    }

    /// Summarizes how `record` compares with `candidates` in `region`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::InvalidRequest`] when there is nothing to compare,
    /// otherwise whatever [`generate`](Self::generate) returns.
    pub async fn summarize_comparison(
        &self,
        record: &ProductRecord,
        region: &str,
        candidates: &[ComparisonCandidate],
    ) -> Result<String, LlmError> {
        if candidates.is_empty() {
            return Err(LlmError::InvalidRequest(
                "no candidates to compare".to_owned(),
            ));
        }
        tracing::info!(
            url = %record.source_url,
            region,
            candidates = candidates.len(),
            "summarizing comparison"
        );
        self.generate(&comparison_prompt(record, region, candidates))
            .await
    }
}
