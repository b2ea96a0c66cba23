//! Error types for the examprep library.
//!
//! One enum covers every failure class, grouped by where in the pipeline it
//! arises. The classes stay distinguishable internally — the retry loop asks
//! [`ExamPrepError::is_transient`] to decide eligibility, and the CLI picks a
//! human message per class — but at the user boundary they all collapse into
//! a single failed analysis. Nothing here is fatal to the process: every
//! failure returns the caller to a state where the same or modified inputs
//! can be retried.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the examprep library.
#[derive(Debug, Error)]
pub enum ExamPrepError {
    // ── Pre-flight validation ─────────────────────────────────────────────
    /// The syllabus text is empty or whitespace-only.
    #[error("Syllabus is empty.\nPaste the syllabus chapters and topics before generating.")]
    EmptySyllabus,

    /// No question papers were attached.
    #[error("No question papers attached.\nUpload at least one previous year paper (PDF, PNG, or JPG).")]
    NoDocuments,

    /// A document exceeds the configured size ceiling. Checked before any
    /// encoding is attempted.
    #[error("File \"{name}\" is {size_bytes} bytes, exceeding the {limit_bytes}-byte limit")]
    FileTooLarge {
        name: String,
        size_bytes: u64,
        limit_bytes: u64,
    },

    /// The file's type is not one the provider accepts.
    #[error("Unsupported file type for '{path}'\nAccepted: PDF, PNG, JPG.")]
    UnsupportedFileType { path: PathBuf },

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Encoding ──────────────────────────────────────────────────────────
    /// A document could not be read or encoded. Aborts the attempt before
    /// any network call.
    #[error("Failed to encode \"{name}\": {detail}")]
    EncodingFailed { name: String, detail: String },

    // ── Provider (transient) ──────────────────────────────────────────────
    /// Provider returned HTTP 429 — retried with backoff.
    ///
    /// `retry_after_secs` carries a server-specified delay when present.
    #[error("Rate limit exceeded for provider '{provider}'")]
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
    },

    /// Provider is temporarily unavailable (5xx, timeout) — retried with backoff.
    #[error("Provider '{provider}' temporarily unavailable: {detail}")]
    ServiceUnavailable { provider: String, detail: String },

    // ── Provider (fatal) ──────────────────────────────────────────────────
    /// Authentication failure (401/403) — retry will not help.
    #[error("Authentication error from provider '{provider}': {detail}\nCheck the API key.")]
    AuthFailed { provider: String, detail: String },

    /// The account's quota is exhausted — retry will not help.
    #[error("Quota exhausted for provider '{provider}': {detail}")]
    QuotaExhausted { provider: String, detail: String },

    /// The provider rejected the request as malformed (400).
    #[error("Provider '{provider}' rejected the request: {detail}")]
    BadRequest { provider: String, detail: String },

    /// The configured provider is not initialised (missing API key etc.).
    #[error("Provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Response validation ───────────────────────────────────────────────
    /// The provider responded but the content failed to parse against the
    /// study-plan shape. The raw content is logged at debug level, never
    /// surfaced to the user.
    #[error("Provider response did not match the study-plan shape: {detail}")]
    MalformedResponse { detail: String },

    // ── I/O ───────────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// PDF document assembly failed.
    #[error("PDF export failed: {0}")]
    ExportFailed(String),

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExamPrepError {
    /// Whether the retry loop may attempt this failure again.
    ///
    /// Only rate limiting and temporary unavailability qualify; everything
    /// else surfaces immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ExamPrepError::RateLimited { .. } | ExamPrepError::ServiceUnavailable { .. }
        )
    }
}
