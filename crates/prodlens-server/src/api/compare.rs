use axum::{extract::State, Extension, Json};
use prodlens_core::ProductRecord;
use prodlens_llm::LlmError;
use prodlens_scraper::ComparisonReport;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{checked_record, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CompareRequest {
    pub product_data: ProductRecord,
}

/// Ranked candidates plus an optional model-written summary. A failed
/// summary is reported in `summary_error`; the candidates are still returned.
#[derive(Debug, Serialize)]
pub(super) struct CompareData {
    #[serde(flatten)]
    report: ComparisonReport,
    summary: Option<String>,
    summary_error: Option<String>,
}

pub(super) async fn compare_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<ApiResponse<CompareData>>, ApiError> {
    let record = checked_record(&req_id.0, &request.product_data)?;
    let report = state.engine.compare(&record).await;

    let (summary, summary_error) = if report.candidates.is_empty() {
        (None, None)
    } else {
        let result = match state.llm.as_ref() {
            Some(llm) => {
                llm.summarize_comparison(&record, report.region.code(), &report.candidates)
                    .await
            }
            None => Err(LlmError::NotConfigured),
        };
        match result {
            Ok(text) => (Some(text), None),
            Err(e) => {
                tracing::warn!(
                    request_id = %req_id.0,
                    error = %e,
                    "comparison summary unavailable"
                );
                (None, Some(e.to_string()))
            }
        }
    };

    Ok(Json(ApiResponse {
        data: CompareData {
            report,
            summary,
            summary_error,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
