//! Instruction prompts for study-plan generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the extraction behaviour (e.g.
//!    how difficulty is estimated) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the built instruction without
//!    a live provider call.
//!
//! The structural half of the contract (field names, types, enum sets) lives
//! in [`crate::schema`]; the prompt covers the semantic half that a schema
//! cannot express, such as "extract verbatim" and "assign every question to
//! some module". The module-coverage rule is advisory: it is stated here and
//! never verified by the validator.

/// Build the instruction block sent alongside the attached papers.
///
/// The syllabus is quoted inline; the attached documents follow as inline
/// parts in the same request.
pub fn build_instruction(syllabus: &str, document_count: usize) -> String {
    let papers = if document_count == 1 {
        "1 file".to_string()
    } else {
        format!("{document_count} files")
    };

    format!(
        r#"You are an expert exam strategist.

Here is the syllabus for an upcoming exam:
"{syllabus}"

Attached are {papers} containing previous year question papers.

Your task:
1. Extract ALL distinct questions verbatim from the attached papers into a single consolidated list. Estimate difficulty and marks if not explicitly stated; record the year and a page/question reference when visible.
2. Analyse these questions against the syllabus to identify topics.
3. Create a study plan by grouping these topics into modules. Every extracted question must be assigned to some module.
4. Assign a priority (High/Medium/Low) to each topic based on how frequently it appears.
5. Infer the subject name if the papers make it clear.
6. Provide a brief executive summary highlighting the most crucial areas to focus on.

Respond with JSON only, conforming exactly to the provided response schema."#
    )
}
