//! Provider boundary: one trait, two transport shapes.
//!
//! The "intelligence" of this crate is entirely delegated: a provider
//! accepts {instruction, schema, encoded documents} and returns raw text
//! expected to parse as a study plan. Two interchangeable implementations
//! exist behind [`PlanProvider`]:
//!
//! * [`GeminiProvider`] — direct call to the generative endpoint with inline
//!   file parts and a structured-output schema.
//! * [`RelayProvider`] — a single POST to a backend relay that performs the
//!   provider call server-side.
//!
//! The implementation is selected at configuration time, never by runtime
//! type inspection, and is always an explicitly constructed, explicitly
//! passed dependency — tests inject stubs the same way.

pub mod gemini;
pub mod relay;

pub use gemini::GeminiProvider;
pub use relay::RelayProvider;

use crate::config::AnalysisConfig;
use crate::error::ExamPrepError;
use crate::pipeline::encode::EncodedPart;
use async_trait::async_trait;
use std::sync::Arc;

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable holding the relay endpoint URL.
pub const RELAY_URL_VAR: &str = "EXAMPREP_RELAY_URL";

/// One generation request: the syllabus plus the encoded papers.
///
/// Exclusively owned by the call that creates it and discarded after the
/// call resolves. Construction enforces the invariants the provider relies
/// on: a non-blank syllabus and at least one part.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub syllabus: String,
    pub parts: Vec<EncodedPart>,
}

impl GenerationRequest {
    pub fn new(
        syllabus: impl Into<String>,
        parts: Vec<EncodedPart>,
    ) -> Result<Self, ExamPrepError> {
        let syllabus = syllabus.into();
        if syllabus.trim().is_empty() {
            return Err(ExamPrepError::EmptySyllabus);
        }
        if parts.is_empty() {
            return Err(ExamPrepError::NoDocuments);
        }
        Ok(Self { syllabus, parts })
    }
}

/// Sampling knobs forwarded with each call.
///
/// Temperature stays low by default — this is an extraction task, and
/// creativity only degrades fidelity to the source papers.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 8192,
        }
    }
}

/// A service that turns a syllabus and papers into raw study-plan text.
///
/// Implementations classify their own failures into the transient/fatal
/// split of [`ExamPrepError`]; the retry loop in
/// [`crate::pipeline::generate`] only inspects
/// [`ExamPrepError::is_transient`].
#[async_trait]
pub trait PlanProvider: Send + Sync {
    /// Human-readable provider name, used in error messages and logs.
    fn name(&self) -> &str;

    /// Perform one generation attempt and return the raw response text.
    ///
    /// No retries happen at this level; a single network round-trip per
    /// call.
    async fn generate(
        &self,
        request: &GenerationRequest,
        options: &GenerationOptions,
    ) -> Result<String, ExamPrepError>;
}

/// Resolve the provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is. This is how
///    tests substitute stubs.
/// 2. **Named provider** (`config.provider_name`) — "gemini" (key from
///    `config.api_key` or `GEMINI_API_KEY`) or "relay" (URL from
///    `config.relay_url` or `EXAMPREP_RELAY_URL`).
/// 3. **Environment auto-detection** — a Gemini key wins over a relay URL
///    when both are set.
pub fn resolve_provider(config: &AnalysisConfig) -> Result<Arc<dyn PlanProvider>, ExamPrepError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return match name.as_str() {
            "gemini" => {
                let key = config
                    .api_key
                    .clone()
                    .or_else(|| non_empty_env(GEMINI_API_KEY_VAR))
                    .ok_or_else(|| ExamPrepError::ProviderNotConfigured {
                        provider: "gemini".into(),
                        hint: format!("Set {GEMINI_API_KEY_VAR} or pass an API key."),
                    })?;
                Ok(Arc::new(GeminiProvider::new(
                    key,
                    &config.model,
                    config.api_timeout_secs,
                )?))
            }
            "relay" => {
                let url = config
                    .relay_url
                    .clone()
                    .or_else(|| non_empty_env(RELAY_URL_VAR))
                    .ok_or_else(|| ExamPrepError::ProviderNotConfigured {
                        provider: "relay".into(),
                        hint: format!("Set {RELAY_URL_VAR} or pass --relay-url."),
                    })?;
                Ok(Arc::new(RelayProvider::new(url, config.api_timeout_secs)?))
            }
            other => Err(ExamPrepError::ProviderNotConfigured {
                provider: other.to_string(),
                hint: "Known providers: gemini, relay.".into(),
            }),
        };
    }

    if let Some(key) = non_empty_env(GEMINI_API_KEY_VAR) {
        return Ok(Arc::new(GeminiProvider::new(
            key,
            &config.model,
            config.api_timeout_secs,
        )?));
    }
    if let Some(url) = non_empty_env(RELAY_URL_VAR) {
        return Ok(Arc::new(RelayProvider::new(url, config.api_timeout_secs)?));
    }

    Err(ExamPrepError::ProviderNotConfigured {
        provider: "auto".into(),
        hint: format!(
            "No provider could be auto-detected from the environment.\n\
             Set {GEMINI_API_KEY_VAR} for the direct provider or {RELAY_URL_VAR} for the relay."
        ),
    })
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}
