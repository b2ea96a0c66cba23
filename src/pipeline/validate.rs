//! Response validation: raw provider text → typed [`StudyPlan`].
//!
//! The provider is asked for schema-constrained JSON, but the response is
//! still untrusted text until it deserialises. Anything that fails here is a
//! [`MalformedResponse`] with enough detail to diagnose the shape problem;
//! the raw text is logged at debug level, never echoed into the error.
//!
//! Module coverage — every extracted question appearing in some module — is
//! requested from the provider but not enforced: a plan that misses a
//! question in its modules is still useful, so an incomplete assignment is
//! logged as a warning rather than rejected.
//!
//! [`MalformedResponse`]: ExamPrepError::MalformedResponse

use crate::error::ExamPrepError;
use crate::plan::StudyPlan;
use tracing::{debug, warn};

/// Parse and validate a raw provider response.
pub fn parse_study_plan(raw: &str) -> Result<StudyPlan, ExamPrepError> {
    if raw.trim().is_empty() {
        return Err(ExamPrepError::MalformedResponse {
            detail: "empty response".into(),
        });
    }

    let plan: StudyPlan = serde_json::from_str(raw).map_err(|e| {
        debug!("Unparseable provider response: {raw}");
        ExamPrepError::MalformedResponse {
            detail: e.to_string(),
        }
    })?;

    let assigned = plan.module_question_count();
    let extracted = plan.extracted_questions.len();
    if assigned < extracted {
        warn!(
            "Modules cover {assigned} of {extracted} extracted questions; \
             some questions are unassigned"
        );
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Difficulty, Priority};

    const VALID: &str = r#"{
        "subject": "Physics",
        "summary": "Focus on kinematics and optics.",
        "extractedQuestions": [
            {"text": "Define velocity.", "difficulty": "Easy", "marks": 2},
            {"text": "Derive the lens formula.", "difficulty": "Hard", "yearAppeared": "2022"}
        ],
        "modules": [
            {
                "topicName": "Kinematics",
                "priority": "High",
                "description": "Appears in every paper.",
                "questions": [
                    {"text": "Define velocity.", "difficulty": "Easy", "marks": 2}
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_a_valid_plan() {
        let plan = parse_study_plan(VALID).unwrap();
        assert_eq!(plan.subject.as_deref(), Some("Physics"));
        assert_eq!(plan.extracted_questions.len(), 2);
        assert_eq!(plan.extracted_questions[0].difficulty, Difficulty::Easy);
        assert_eq!(plan.modules.len(), 1);
        assert_eq!(plan.modules[0].priority, Priority::High);
        assert_eq!(plan.module_question_count(), 1);
    }

    #[test]
    fn empty_response_is_malformed() {
        let result = parse_study_plan("   \n");
        assert!(matches!(
            result,
            Err(ExamPrepError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn non_json_is_malformed() {
        let result = parse_study_plan("I could not analyze the documents.");
        assert!(matches!(
            result,
            Err(ExamPrepError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn missing_summary_is_rejected() {
        let raw = r#"{"extractedQuestions": [], "modules": []}"#;
        assert!(parse_study_plan(raw).is_err());
    }

    #[test]
    fn missing_question_list_is_rejected() {
        let raw = r#"{"summary": "ok", "modules": []}"#;
        assert!(parse_study_plan(raw).is_err());
    }

    #[test]
    fn missing_modules_is_rejected() {
        let raw = r#"{"summary": "ok", "extractedQuestions": []}"#;
        assert!(parse_study_plan(raw).is_err());
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        let raw = r#"{
            "summary": "ok",
            "extractedQuestions": [{"text": "Q", "difficulty": "Impossible"}],
            "modules": []
        }"#;
        assert!(parse_study_plan(raw).is_err());
    }

    #[test]
    fn incomplete_module_coverage_is_accepted() {
        // Second extracted question is in no module; still a valid plan.
        let plan = parse_study_plan(VALID).unwrap();
        assert!(plan.module_question_count() < plan.extracted_questions.len());
    }
}
