//! Analysis configuration with a validating builder.
//!
//! Every tunable in the pipeline lives here so callers construct exactly one
//! value and pass it down. Defaults are production-sensible; [`build`] is
//! the single point where invalid combinations are rejected, so the rest of
//! the crate can trust whatever it receives.
//!
//! [`build`]: AnalysisConfigBuilder::build

use crate::error::ExamPrepError;
use crate::provider::{GenerationOptions, PlanProvider};
use std::fmt;
use std::sync::Arc;

/// Default model identifier for the direct provider.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Default per-file size ceiling: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Validated configuration for one analysis run.
///
/// Construct via [`AnalysisConfig::builder`]; `Default` yields the same
/// values as an empty builder.
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Pre-built provider, used as-is when set. Overrides name/env
    /// resolution entirely.
    pub provider: Option<Arc<dyn PlanProvider>>,
    /// Provider to construct by name: "gemini" or "relay".
    pub provider_name: Option<String>,
    /// API key for the direct provider; falls back to `GEMINI_API_KEY`.
    pub api_key: Option<String>,
    /// Endpoint for the relay provider; falls back to `EXAMPREP_RELAY_URL`.
    pub relay_url: Option<String>,
    /// Model identifier for the direct provider.
    pub model: String,
    /// Sampling temperature, 0.0 to 2.0.
    pub temperature: f32,
    /// Response token ceiling.
    pub max_output_tokens: u32,
    /// Retries after the initial attempt, transient failures only.
    pub max_retries: u32,
    /// Base delay for exponential backoff between attempts.
    pub retry_backoff_ms: u64,
    /// Per-file size ceiling, checked before any encoding happens.
    pub max_file_size_bytes: u64,
    /// Timeout for each provider round-trip.
    pub api_timeout_secs: u64,
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field(
                "provider",
                &self.provider.as_ref().map(|_| "<dyn PlanProvider>"),
            )
            .field("provider_name", &self.provider_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("relay_url", &self.relay_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("max_file_size_bytes", &self.max_file_size_bytes)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: None,
            provider_name: None,
            api_key: None,
            relay_url: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_output_tokens: 8192,
            max_retries: 3,
            retry_backoff_ms: 500,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            api_timeout_secs: 60,
        }
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Sampling options derived from this configuration.
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

/// Builder for [`AnalysisConfig`]. All setters are chainable.
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Inject a pre-built provider, bypassing name/env resolution.
    pub fn provider(mut self, provider: Arc<dyn PlanProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn relay_url(mut self, url: impl Into<String>) -> Self {
        self.config.relay_url = Some(url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.config.max_output_tokens = tokens;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn max_file_size_bytes(mut self, bytes: u64) -> Self {
        self.config.max_file_size_bytes = bytes;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<AnalysisConfig, ExamPrepError> {
        let c = self.config;
        if c.model.trim().is_empty() {
            return Err(ExamPrepError::InvalidConfig(
                "model must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(ExamPrepError::InvalidConfig(format!(
                "temperature must be within 0.0..=2.0, got {}",
                c.temperature
            )));
        }
        if c.max_output_tokens == 0 {
            return Err(ExamPrepError::InvalidConfig(
                "max_output_tokens must be positive".into(),
            ));
        }
        if c.max_file_size_bytes == 0 {
            return Err(ExamPrepError::InvalidConfig(
                "max_file_size_bytes must be positive".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(ExamPrepError::InvalidConfig(
                "api_timeout_secs must be positive".into(),
            ));
        }
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_cleanly() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_backoff_ms, 500);
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn temperature_is_range_checked() {
        let result = AnalysisConfig::builder().temperature(3.5).build();
        assert!(matches!(result, Err(ExamPrepError::InvalidConfig(_))));
    }

    #[test]
    fn zero_file_size_ceiling_is_rejected() {
        let result = AnalysisConfig::builder().max_file_size_bytes(0).build();
        assert!(matches!(result, Err(ExamPrepError::InvalidConfig(_))));
    }

    #[test]
    fn debug_redacts_the_api_key() {
        let config = AnalysisConfig::builder()
            .api_key("secret-key")
            .build()
            .unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn generation_options_mirror_the_config() {
        let config = AnalysisConfig::builder()
            .temperature(0.7)
            .max_output_tokens(1024)
            .build()
            .unwrap();
        let options = config.generation_options();
        assert_eq!(options.temperature, 0.7);
        assert_eq!(options.max_output_tokens, 1024);
    }
}
