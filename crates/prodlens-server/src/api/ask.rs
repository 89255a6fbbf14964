use axum::{extract::State, Extension, Json};
use prodlens_core::ProductRecord;
use prodlens_llm::LlmError;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{checked_record, map_llm_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AskRequest {
    pub product_data: ProductRecord,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AskData {
    answer: String,
}

pub(super) async fn ask_question(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<AskRequest>,
) -> Result<Json<ApiResponse<AskData>>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "question is required",
        ));
    }
    let record = checked_record(&req_id.0, &request.product_data)?;
    let Some(llm) = state.llm.as_ref() else {
        return Err(map_llm_error(req_id.0, &LlmError::NotConfigured));
    };

    let answer = llm
        .answer_question(&record, &request.question)
        .await
        .map_err(|e| map_llm_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: AskData { answer },
        meta: ResponseMeta::new(req_id.0),
    }))
}
