mod ask;
mod compare;
mod scrape;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use prodlens_core::ProductRecord;
use prodlens_llm::{GeminiClient, LlmError};
use prodlens_scraper::{renormalize, ProductEngine, ScraperError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    request_id, throttle_api, ApiRateLimiter, RequestId, REQUEST_ID_HEADER,
};

#[derive(Clone)]
pub struct AppState {
    pub engine: ProductEngine,
    /// `None` when no API key is configured.
    pub llm: Option<GeminiClient>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    llm: &'static str,
}

#[derive(Debug, Serialize)]
struct ServiceInfo {
    service: &'static str,
    version: &'static str,
    endpoints: [&'static str; 5],
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "extraction_failed" | "llm_blocked" => StatusCode::UNPROCESSABLE_ENTITY,
            "rate_limited" | "llm_quota_exceeded" => StatusCode::TOO_MANY_REQUESTS,
            "blocked" | "upstream_error" | "llm_error" => StatusCode::BAD_GATEWAY,
            "llm_not_configured" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_scraper_error(request_id: String, error: &ScraperError) -> ApiError {
    let code = match error {
        ScraperError::InvalidUrl { .. } => "validation_error",
        ScraperError::Blocked { .. } => "blocked",
        ScraperError::NotFound { .. } => "not_found",
        ScraperError::Parse { .. } | ScraperError::ExtractionFailed { .. } => "extraction_failed",
        e if e.is_fetch_failure() => "upstream_error",
        _ => "internal_error",
    };
    if code == "internal_error" {
        tracing::error!(error = %error, "scrape failed");
    } else {
        tracing::warn!(error = %error, code, "scrape failed");
    }
    ApiError::new(request_id, code, error.to_string())
}

/// Runs a client-supplied record through the normalizer so it carries the
/// same guarantees as a scraped one before it reaches ranking or a prompt.
pub(super) fn checked_record(
    request_id: &str,
    record: &ProductRecord,
) -> Result<ProductRecord, ApiError> {
    renormalize(record).map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))
}

pub(super) fn map_llm_error(request_id: String, error: &LlmError) -> ApiError {
    let code = match error {
        LlmError::NotConfigured => "llm_not_configured",
        LlmError::InvalidRequest(_) => "validation_error",
        LlmError::QuotaExceeded(_) => "llm_quota_exceeded",
        LlmError::Blocked { .. } => "llm_blocked",
        LlmError::Http(_)
        | LlmError::Api { .. }
        | LlmError::EmptyResponse
        | LlmError::Deserialize { .. } => "llm_error",
    };
    tracing::warn!(error = %error, code, "language model call failed");
    ApiError::new(request_id, code, error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

fn api_router(limiter: ApiRateLimiter) -> Router<AppState> {
    Router::new()
        .route("/scrape-product", post(scrape::scrape_product))
        .route("/ask-question", post(ask::ask_question))
        .route("/compare-products", post(compare::compare_products))
        .layer(axum::middleware::from_fn_with_state(limiter, throttle_api))
}

pub fn build_app(state: AppState, limiter: ApiRateLimiter) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(api_router(limiter))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn root(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: ServiceInfo {
            service: "prodlens",
            version: env!("CARGO_PKG_VERSION"),
            endpoints: [
                "POST /scrape-product",
                "POST /ask-question",
                "POST /compare-products",
                "GET /health",
                "GET /",
            ],
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            llm: if state.llm.is_some() {
                "configured"
            } else {
                "not_configured"
            },
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
