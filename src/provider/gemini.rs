//! Direct provider: the Gemini `generateContent` REST endpoint.
//!
//! The request carries the instruction text and every encoded paper as
//! inline parts of a single content turn, plus a generation config pinning
//! `responseMimeType` to JSON and attaching the response schema. The
//! endpoint then does all document understanding (including OCR of scanned
//! papers) server-side and returns one text blob.
//!
//! ## Error classification
//!
//! The retry loop upstream only distinguishes transient from fatal, so the
//! mapping happens here, at the wire: 429 is a transient rate limit unless
//! the error message names a quota (daily quotas do not recover within a
//! retry budget), 5xx and timeouts are transient unavailability, 401/403 is
//! an auth failure, 400 a malformed request. Everything else is fatal.

use crate::error::ExamPrepError;
use crate::provider::{GenerationOptions, GenerationRequest, PlanProvider};
use crate::schema::response_schema;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const PROVIDER_NAME: &str = "gemini";

// ── Wire types ────────────────────────────────────────────────────────────

/// Content container used in both requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

/// Untagged union of text and inline media parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 inline payload for attached documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

// ── Provider ──────────────────────────────────────────────────────────────

/// Direct Gemini client.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Build a client for the given model with a per-call timeout.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ExamPrepError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExamPrepError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (local mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_body(request: &GenerationRequest, options: &GenerationOptions) -> GenerateContentRequest {
        let mut parts = vec![Part::Text {
            text: crate::prompts::build_instruction(&request.syllabus, request.parts.len()),
        }];
        parts.extend(request.parts.iter().map(|p| Part::InlineData {
            inline_data: InlineData {
                mime_type: p.mime_type.clone(),
                data: p.data.clone(),
            },
        }));

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                temperature: options.temperature,
                max_output_tokens: options.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl PlanProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        options: &GenerationOptions,
    ) -> Result<String, ExamPrepError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = Self::build_body(request, options);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(&response);
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text, retry_after));
        }

        let envelope: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| ExamPrepError::MalformedResponse {
                    detail: format!("response envelope: {e}"),
                })?;

        let text = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| {
                c.content.parts.into_iter().find_map(|p| match p {
                    Part::Text { text } => Some(text),
                    Part::InlineData { .. } => None,
                })
            })
            .ok_or_else(|| ExamPrepError::MalformedResponse {
                detail: "no text content in provider response".into(),
            })?;

        debug!("Gemini returned {} bytes", text.len());
        Ok(text)
    }
}

// ── Failure classification ────────────────────────────────────────────────

fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn transport_error(provider: &str, e: reqwest::Error) -> ExamPrepError {
    // Timeouts and connection drops are expected to resolve on retry.
    ExamPrepError::ServiceUnavailable {
        provider: provider.to_string(),
        detail: e.to_string(),
    }
}

/// Map an HTTP status plus error body to the transient/fatal split.
fn classify_failure(status: StatusCode, body: &str, retry_after: Option<u64>) -> ExamPrepError {
    let (err_status, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => (env.error.status, env.error.message),
        Err(_) => (String::new(), body.chars().take(200).collect()),
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            // RESOURCE_EXHAUSTED covers both rate limits and exhausted
            // quotas; only the former recovers within a retry budget.
            if message.to_ascii_lowercase().contains("quota") {
                ExamPrepError::QuotaExhausted {
                    provider: PROVIDER_NAME.into(),
                    detail: message,
                }
            } else {
                ExamPrepError::RateLimited {
                    provider: PROVIDER_NAME.into(),
                    retry_after_secs: retry_after,
                }
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ExamPrepError::AuthFailed {
            provider: PROVIDER_NAME.into(),
            detail: message,
        },
        StatusCode::BAD_REQUEST => ExamPrepError::BadRequest {
            provider: PROVIDER_NAME.into(),
            detail: message,
        },
        s if s.is_server_error() => ExamPrepError::ServiceUnavailable {
            provider: PROVIDER_NAME.into(),
            detail: if err_status.is_empty() {
                format!("HTTP {s}")
            } else {
                format!("HTTP {s} ({err_status}): {message}")
            },
        },
        s => ExamPrepError::Internal(format!("unexpected HTTP {s}: {message}")),
    }
}
