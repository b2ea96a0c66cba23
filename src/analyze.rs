//! Top-level analysis orchestration.
//!
//! [`analyze`] is the one entry point that strings the pipeline together:
//! pre-flight checks, encoding, the retried provider call, and validation.
//! Everything it needs arrives as arguments; there is no hidden global
//! state, and concurrent analyses only share the provider handle.

use crate::config::AnalysisConfig;
use crate::document::UploadedDocument;
use crate::error::ExamPrepError;
use crate::pipeline::{encode, generate, validate};
use crate::plan::StudyPlan;
use crate::provider::{resolve_provider, GenerationRequest};
use futures::future::try_join_all;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Analyze exam papers against a syllabus and produce a study plan.
///
/// Fails fast — before any encoding or network traffic — when the syllabus
/// is blank, no documents were supplied, or any document exceeds the size
/// ceiling. The error for an oversize document names the offending file.
pub async fn analyze(
    syllabus: &str,
    documents: &[UploadedDocument],
    config: &AnalysisConfig,
) -> Result<StudyPlan, ExamPrepError> {
    if syllabus.trim().is_empty() {
        return Err(ExamPrepError::EmptySyllabus);
    }
    if documents.is_empty() {
        return Err(ExamPrepError::NoDocuments);
    }
    for doc in documents {
        if doc.size_bytes() > config.max_file_size_bytes {
            return Err(ExamPrepError::FileTooLarge {
                name: doc.name.clone(),
                size_bytes: doc.size_bytes(),
                limit_bytes: config.max_file_size_bytes,
            });
        }
    }

    let provider = resolve_provider(config)?;
    info!(
        "Analyzing {} document(s) via {} provider",
        documents.len(),
        provider.name()
    );

    let started = Instant::now();
    let parts = encode::encode_all(documents).await?;
    let request = GenerationRequest::new(syllabus, parts)?;

    let raw = generate::generate_with_retry(
        provider.as_ref(),
        &request,
        &config.generation_options(),
        config.max_retries,
        config.retry_backoff_ms,
    )
    .await?;

    let plan = validate::parse_study_plan(&raw)?;
    info!(
        "Produced a plan with {} questions across {} modules in {:.1}s",
        plan.extracted_questions.len(),
        plan.modules.len(),
        started.elapsed().as_secs_f64()
    );

    Ok(plan)
}

/// Load exam papers from disk, then run [`analyze`].
///
/// Documents are read concurrently; the first unreadable or unsupported
/// path fails the whole call before any provider traffic.
pub async fn analyze_paths(
    syllabus: &str,
    paths: &[impl AsRef<Path>],
    config: &AnalysisConfig,
) -> Result<StudyPlan, ExamPrepError> {
    let documents = try_join_all(
        paths
            .iter()
            .map(|p| UploadedDocument::from_path(p.as_ref())),
    )
    .await?;
    analyze(syllabus, &documents, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, size: usize) -> UploadedDocument {
        let mut bytes = b"%PDF-1.7 ".to_vec();
        bytes.resize(size, b'x');
        UploadedDocument::new(name, "application/pdf", bytes).unwrap()
    }

    #[tokio::test]
    async fn blank_syllabus_fails_before_anything_else() {
        let config = AnalysisConfig::default();
        let result = analyze("  ", &[pdf("a.pdf", 100)], &config).await;
        assert!(matches!(result, Err(ExamPrepError::EmptySyllabus)));
    }

    #[tokio::test]
    async fn no_documents_fails_before_anything_else() {
        let config = AnalysisConfig::default();
        let result = analyze("Unit 1", &[], &config).await;
        assert!(matches!(result, Err(ExamPrepError::NoDocuments)));
    }

    #[tokio::test]
    async fn oversize_document_names_the_file() {
        let config = AnalysisConfig::builder()
            .max_file_size_bytes(1024)
            .build()
            .unwrap();
        let result = analyze("Unit 1", &[pdf("big-paper.pdf", 2048)], &config).await;
        match result {
            Err(ExamPrepError::FileTooLarge { name, .. }) => assert_eq!(name, "big-paper.pdf"),
            other => panic!("expected FileTooLarge, got {other:?}"),
        }
    }
}
