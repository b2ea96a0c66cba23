//! Relay provider: one POST to a backend that holds the API key.
//!
//! Deployments that cannot ship a key to end users run a small relay
//! service; the client sends the syllabus plus the encoded files and the
//! relay performs the generation call server-side, returning the raw plan
//! JSON as its response body. The wire shape names each file so the relay
//! can report per-file problems.

use crate::error::ExamPrepError;
use crate::provider::{GenerationOptions, GenerationRequest, PlanProvider};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const PROVIDER_NAME: &str = "relay";

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    syllabus: &'a str,
    files: Vec<RelayFile<'a>>,
}

#[derive(Debug, Serialize)]
struct RelayFile<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    mime_type: &'a str,
    data: &'a str,
}

/// Client for the relay endpoint.
pub struct RelayProvider {
    http: reqwest::Client,
    url: String,
}

impl RelayProvider {
    /// Build a client for the given relay URL with a per-call timeout.
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, ExamPrepError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExamPrepError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    fn build_body<'a>(request: &'a GenerationRequest) -> RelayRequest<'a> {
        RelayRequest {
            syllabus: &request.syllabus,
            files: request
                .parts
                .iter()
                .map(|p| RelayFile {
                    name: &p.name,
                    mime_type: &p.mime_type,
                    data: &p.data,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl PlanProvider for RelayProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        _options: &GenerationOptions,
    ) -> Result<String, ExamPrepError> {
        // Sampling options live server-side; the relay owns the model call.
        let body = Self::build_body(request);

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExamPrepError::ServiceUnavailable {
                provider: PROVIDER_NAME.into(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ExamPrepError::MalformedResponse {
                detail: format!("reading relay response: {e}"),
            })?;
        debug!("Relay returned {} bytes", text.len());
        Ok(text)
    }
}

/// The relay collapses upstream failures into a generic 500, so 5xx stays
/// transient here; the request may succeed on the next attempt.
fn classify_failure(status: StatusCode, body: &str) -> ExamPrepError {
    let detail: String = body.chars().take(200).collect();
    match status {
        StatusCode::BAD_REQUEST | StatusCode::METHOD_NOT_ALLOWED => ExamPrepError::BadRequest {
            provider: PROVIDER_NAME.into(),
            detail,
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ExamPrepError::AuthFailed {
            provider: PROVIDER_NAME.into(),
            detail,
        },
        StatusCode::TOO_MANY_REQUESTS => ExamPrepError::RateLimited {
            provider: PROVIDER_NAME.into(),
            retry_after_secs: None,
        },
        s if s.is_server_error() => ExamPrepError::ServiceUnavailable {
            provider: PROVIDER_NAME.into(),
            detail: format!("HTTP {s}: {detail}"),
        },
        s => ExamPrepError::Internal(format!("unexpected HTTP {s}: {detail}")),
    }
}
