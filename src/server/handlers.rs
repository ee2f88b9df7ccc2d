use super::state::AppState;
use crate::pipeline::ImageJob;
use crate::types::{ProcessingOptions, ProcessingResult, Style, DEFAULT_PROMPT};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Body of `POST /process-image` and each item of a batch
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessImageRequest {
    pub image_url: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_true")]
    pub remove_bg: bool,
    #[serde(default = "default_true")]
    pub use_ai_bg: bool,
}

fn default_style() -> String {
    Style::default().as_str().to_string()
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_true() -> bool {
    true
}

impl From<ProcessImageRequest> for ImageJob {
    fn from(req: ProcessImageRequest) -> Self {
        let options = ProcessingOptions::default()
            .with_style(req.style)
            .with_prompt(req.prompt)
            .with_remove_background(req.remove_bg)
            .with_external_enhancement(req.use_ai_bg);
        ImageJob::new(req.image_url, options)
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub images: Vec<ProcessImageRequest>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub results: Vec<ProcessingResult>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sd_available: bool,
}

/// Failure rendered as `{success: false, error}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn processing<S: Into<String>>(message: S) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sd_available: state.pipeline.enhancement_available().await,
    })
}

/// `POST /process-image`
pub async fn process_image(
    State(state): State<AppState>,
    payload: Result<Json<ProcessImageRequest>, JsonRejection>,
) -> Result<Json<ProcessingResult>, ApiError> {
    let Json(req) = payload?;
    let job = ImageJob::from(req);
    tracing::info!(url = %job.image_url, style = %job.options.style, "Process request");

    let result = state.pipeline.process_url(&job.image_url, &job.options).await;
    if result.success {
        Ok(Json(result))
    } else {
        Err(ApiError::processing(result.error.unwrap_or_default()))
    }
}

/// `POST /batch-process`
pub async fn batch_process(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(req) = payload?;
    let jobs: Vec<ImageJob> = req.images.into_iter().map(ImageJob::from).collect();
    tracing::info!(items = jobs.len(), "Batch request");

    let results = state
        .pipeline
        .process_batch(&jobs)
        .await
        .map_err(|e| ApiError::processing(e.to_string()))?;

    Ok(Json(BatchResponse {
        success: true,
        results,
    }))
}
