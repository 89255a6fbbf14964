use axum::{extract::State, Extension, Json};
use prodlens_core::ProductRecord;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_scraper_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeRequest {
    pub url: String,
}

pub(super) async fn scrape_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ApiResponse<ProductRecord>>, ApiError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::new(req_id.0, "validation_error", "url is required"));
    }

    let record = state
        .engine
        .scrape(url)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}
