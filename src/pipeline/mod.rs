//! Pipeline stages for study-plan generation.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap a provider
//! implementation without touching encoding or validation.
//!
//! ## Data Flow
//!
//! ```text
//! documents ──▶ encode ──▶ generate ──▶ validate
//! (bytes+mime)  (base64)   (provider     (JSON →
//!                           + retry)      StudyPlan)
//! ```
//!
//! 1. [`encode`]   — base64-wrap each document for the request body; fanned
//!    out across documents, awaited together before the single network call
//! 2. [`generate`] — drive the provider call with retry/backoff; the only
//!    stage with network I/O
//! 3. [`validate`] — parse the raw response text into the typed `StudyPlan`

pub mod encode;
pub mod generate;
pub mod validate;
