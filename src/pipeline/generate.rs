//! Provider calls with retry and exponential backoff.
//!
//! At most one generation is in flight at a time; attempts are strictly
//! sequential. Only failures the provider classified as transient are
//! retried — fatal failures surface immediately, and the error returned
//! after an exhausted budget is the last provider error, unwrapped.

use crate::error::ExamPrepError;
use crate::provider::{GenerationOptions, GenerationRequest, PlanProvider};
use std::time::Duration;
use tracing::{debug, warn};

/// Call the provider, retrying transient failures with exponential backoff.
///
/// `max_retries` counts retries after the initial attempt, so the provider
/// is called at most `max_retries + 1` times. The delay before retry `n`
/// (1-based) is `backoff_ms * 2^(n-1)`.
pub async fn generate_with_retry(
    provider: &dyn PlanProvider,
    request: &GenerationRequest,
    options: &GenerationOptions,
    max_retries: u32,
    backoff_ms: u64,
) -> Result<String, ExamPrepError> {
    let mut last_error: Option<ExamPrepError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Attempt {}/{} against {} failed, retrying in {}ms",
                attempt,
                max_retries + 1,
                provider.name(),
                delay
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        debug!(
            "Generation attempt {}/{} via {}",
            attempt + 1,
            max_retries + 1,
            provider.name()
        );

        match provider.generate(request, options).await {
            Ok(text) => return Ok(text),
            Err(e) if e.is_transient() => last_error = Some(e),
            Err(e) => return Err(e),
        }
    }

    // max_retries + 1 attempts all failed transiently.
    Err(last_error.unwrap_or_else(|| {
        ExamPrepError::Internal("retry loop exited without an error".into())
    }))
}
