//! HTTP relay service: accepts upload requests and performs the provider
//! call server-side so clients never hold the API key.
//!
//! One route, `POST /api/analyze`, taking `{syllabus, files: [{name, type,
//! data}]}` with each file already base64-encoded, and answering with the
//! study-plan JSON. Client-side mistakes get a 400 naming the problem;
//! provider failures collapse into a generic 500 so nothing about the
//! upstream account or quota state leaks to callers.

use crate::error::ExamPrepError;
use crate::pipeline::{encode::EncodedPart, generate, validate};
use crate::plan::StudyPlan;
use crate::provider::{GenerationOptions, GenerationRequest, PlanProvider};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state handed to every request.
#[derive(Clone)]
pub struct RelayState {
    pub provider: Arc<dyn PlanProvider>,
    pub options: GenerationOptions,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

/// Incoming request body. `type` is the declared MIME type.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub syllabus: String,
    #[serde(default)]
    pub files: Vec<RelayFile>,
}

#[derive(Debug, Deserialize)]
pub struct RelayFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub data: String,
}

enum RelayError {
    BadRequest(String),
    Upstream,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RelayError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            RelayError::Upstream => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to analyze documents".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the router. Non-POST methods on the route get a 405 from axum.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the task is dropped.
pub async fn serve(addr: std::net::SocketAddr, state: RelayState) -> Result<(), ExamPrepError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ExamPrepError::Internal(format!("binding {addr}: {e}")))?;
    info!("Relay listening on {addr}");
    axum::serve(listener, router(state))
        .await
        .map_err(|e| ExamPrepError::Internal(format!("serving: {e}")))
}

async fn analyze_handler(
    State(state): State<RelayState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<StudyPlan>, RelayError> {
    if body.syllabus.trim().is_empty() || body.files.is_empty() {
        return Err(RelayError::BadRequest(
            "Missing syllabus or files".to_string(),
        ));
    }

    let parts: Vec<EncodedPart> = body
        .files
        .into_iter()
        .map(|f| EncodedPart {
            name: f.name,
            mime_type: f.mime_type,
            data: f.data,
        })
        .collect();

    let request = GenerationRequest::new(body.syllabus, parts).map_err(|e| {
        RelayError::BadRequest(e.to_string())
    })?;

    let raw = generate::generate_with_retry(
        state.provider.as_ref(),
        &request,
        &state.options,
        state.max_retries,
        state.retry_backoff_ms,
    )
    .await
    .map_err(|e| {
        error!("Provider call failed: {e}");
        RelayError::Upstream
    })?;

    let plan = validate::parse_study_plan(&raw).map_err(|e| {
        error!("Provider returned an unusable response: {e}");
        RelayError::Upstream
    })?;

    Ok(Json(plan))
}
