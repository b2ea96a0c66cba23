//! End-to-end tests for the analysis pipeline with stub providers.

use async_trait::async_trait;
use examprep::{
    analyze, AnalysisConfig, ExamPrepError, GenerationOptions, GenerationRequest, PlanProvider,
    UploadedDocument,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const PLAN_JSON: &str = r#"{
    "subject": "Physics",
    "summary": "Kinematics carries the most marks; optics appears every year.",
    "extractedQuestions": [
        {"text": "A particle moves with constant acceleration. Derive its displacement.", "difficulty": "Medium", "marks": 5, "yearAppeared": "2022"},
        {"text": "State the laws of reflection.", "difficulty": "Easy", "marks": 2, "yearAppeared": "2023"}
    ],
    "modules": [
        {
            "topicName": "Kinematics",
            "priority": "High",
            "description": "Appears in both papers with the highest marks.",
            "questions": [
                {"text": "A particle moves with constant acceleration. Derive its displacement.", "difficulty": "Medium", "marks": 5}
            ]
        },
        {
            "topicName": "Optics",
            "priority": "Medium",
            "description": "Short-answer staple.",
            "questions": [
                {"text": "State the laws of reflection.", "difficulty": "Easy", "marks": 2}
            ]
        }
    ]
}"#;

/// Fails the first `fail_first` calls with the given transient error, then
/// returns the canned plan. Records every request it sees and when.
struct StubProvider {
    calls: AtomicUsize,
    call_times: std::sync::Mutex<Vec<tokio::time::Instant>>,
    fail_first: usize,
    error: fn() -> ExamPrepError,
    response: String,
}

impl StubProvider {
    fn succeeding() -> Self {
        Self::failing_first(0, transient_error)
    }

    fn failing_first(n: usize, error: fn() -> ExamPrepError) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            call_times: std::sync::Mutex::new(Vec::new()),
            fail_first: n,
            error,
            response: PLAN_JSON.to_string(),
        }
    }

    fn with_response(response: &str) -> Self {
        Self {
            response: response.to_string(),
            ..Self::succeeding()
        }
    }

    /// Gaps between consecutive provider calls, in call order.
    fn delays_between_calls(&self) -> Vec<Duration> {
        let times = self.call_times.lock().unwrap();
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

fn transient_error() -> ExamPrepError {
    ExamPrepError::ServiceUnavailable {
        provider: "stub".into(),
        detail: "overloaded".into(),
    }
}

fn fatal_error() -> ExamPrepError {
    ExamPrepError::AuthFailed {
        provider: "stub".into(),
        detail: "API key not valid".into(),
    }
}

#[async_trait]
impl PlanProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        _options: &GenerationOptions,
    ) -> Result<String, ExamPrepError> {
        assert!(!request.parts.is_empty(), "providers never see zero parts");
        self.call_times
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            Err((self.error)())
        } else {
            Ok(self.response.clone())
        }
    }
}

fn pdf(name: &str, size: usize) -> UploadedDocument {
    let mut bytes = b"%PDF-1.7 ".to_vec();
    bytes.resize(size, b'x');
    UploadedDocument::new(name, "application/pdf", bytes).unwrap()
}

fn config_with(provider: Arc<StubProvider>) -> AnalysisConfig {
    AnalysisConfig::builder()
        .provider(provider)
        .max_retries(3)
        .retry_backoff_ms(500)
        .build()
        .unwrap()
}

#[tokio::test]
async fn full_pipeline_produces_a_typed_plan() {
    let provider = Arc::new(StubProvider::succeeding());
    let config = config_with(Arc::clone(&provider));

    let docs = vec![pdf("2022.pdf", 2 * 1024 * 1024), pdf("2023.pdf", 4096)];
    let plan = analyze("Unit 1: Kinematics. Unit 2: Optics.", &docs, &config)
        .await
        .unwrap();

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(plan.subject.as_deref(), Some("Physics"));
    assert_eq!(plan.extracted_questions.len(), 2);
    assert_eq!(plan.modules.len(), 2);
    assert_eq!(plan.modules[0].topic_name, "Kinematics");
    assert_eq!(plan.modules[0].priority, examprep::Priority::High);
    assert_eq!(plan.modules[0].questions.len(), 1);
    assert_eq!(plan.module_question_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_with_exponential_backoff() {
    let provider = Arc::new(StubProvider::failing_first(2, transient_error));
    let config = config_with(Arc::clone(&provider));

    let plan = analyze("Unit 1", &[pdf("a.pdf", 100)], &config)
        .await
        .unwrap();

    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    // The gap before each retry doubles: 500ms before the second attempt,
    // 1000ms before the third.
    assert_eq!(
        provider.delays_between_calls(),
        vec![Duration::from_millis(500), Duration::from_millis(1000)]
    );
    assert_eq!(plan.modules.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn retry_budget_exhaustion_surfaces_the_last_error() {
    let provider = Arc::new(StubProvider::failing_first(usize::MAX, transient_error));
    let config = config_with(Arc::clone(&provider));

    let result = analyze("Unit 1", &[pdf("a.pdf", 100)], &config).await;

    // max_retries = 3 means four attempts total, each gap doubling.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    assert_eq!(
        provider.delays_between_calls(),
        vec![
            Duration::from_millis(500),
            Duration::from_millis(1000),
            Duration::from_millis(2000),
        ]
    );
    assert!(matches!(
        result,
        Err(ExamPrepError::ServiceUnavailable { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn fatal_errors_abort_immediately() {
    let provider = Arc::new(StubProvider::failing_first(usize::MAX, fatal_error));
    let config = config_with(Arc::clone(&provider));

    let started = tokio::time::Instant::now();
    let result = analyze("Unit 1", &[pdf("a.pdf", 100)], &config).await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(matches!(result, Err(ExamPrepError::AuthFailed { .. })));
}

#[tokio::test]
async fn preflight_failures_never_reach_the_provider() {
    let provider = Arc::new(StubProvider::succeeding());
    let config = config_with(Arc::clone(&provider));

    let result = analyze("   ", &[pdf("a.pdf", 100)], &config).await;
    assert!(matches!(result, Err(ExamPrepError::EmptySyllabus)));

    let result = analyze("Unit 1", &[], &config).await;
    assert!(matches!(result, Err(ExamPrepError::NoDocuments)));

    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversize_file_is_rejected_by_name_before_any_call() {
    let provider = Arc::new(StubProvider::succeeding());
    let config = AnalysisConfig::builder()
        .provider(Arc::clone(&provider) as Arc<dyn PlanProvider>)
        .max_file_size_bytes(1024)
        .build()
        .unwrap();

    let docs = vec![pdf("small.pdf", 512), pdf("huge-scan.pdf", 4096)];
    let result = analyze("Unit 1", &docs, &config).await;

    match result {
        Err(ExamPrepError::FileTooLarge {
            name,
            size_bytes,
            limit_bytes,
        }) => {
            assert_eq!(name, "huge-scan.pdf");
            assert_eq!(size_bytes, 4096);
            assert_eq!(limit_bytes, 1024);
        }
        other => panic!("expected FileTooLarge, got {other:?}"),
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_provider_output_is_rejected() {
    for raw in ["", "sorry, no can do", r#"{"summary": "missing the rest"}"#] {
        let provider = Arc::new(StubProvider::with_response(raw));
        let config = config_with(provider);
        let result = analyze("Unit 1", &[pdf("a.pdf", 100)], &config).await;
        assert!(
            matches!(result, Err(ExamPrepError::MalformedResponse { .. })),
            "response {raw:?} should be malformed"
        );
    }
}

#[tokio::test]
async fn plan_serialises_back_to_the_wire_shape() {
    let provider = Arc::new(StubProvider::succeeding());
    let config = config_with(provider);

    let plan = analyze("Unit 1", &[pdf("a.pdf", 100)], &config)
        .await
        .unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["extractedQuestions"][0]["difficulty"], "Medium");
    assert_eq!(json["extractedQuestions"][0]["yearAppeared"], "2022");
    assert_eq!(json["modules"][0]["topicName"], "Kinematics");
    assert_eq!(json["modules"][0]["priority"], "High");
}
