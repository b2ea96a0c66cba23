//! The machine-checkable response schema sent with every generation request.
//!
//! This is the authoritative contract: field names, types, and enum value
//! sets are fixed and identical across requests. The enum sets are pulled
//! from [`Difficulty::VALUES`] and [`Priority::VALUES`] so the schema cannot
//! drift from the entity types the validator deserialises into — one
//! definition feeds both sides.

use crate::plan::{Difficulty, Priority};
use serde_json::{json, Value};

/// Schema for one question object, shared by the flat list and the
/// per-module lists.
fn question_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "text": { "type": "STRING" },
            "marks": {
                "type": "NUMBER",
                "description": "Marks for the question if available"
            },
            "difficulty": { "type": "STRING", "enum": Difficulty::VALUES },
            "yearAppeared": {
                "type": "STRING",
                "description": "Year found in document if applicable"
            },
            "reference": {
                "type": "STRING",
                "description": "Locator within the source paper, e.g. 'Page 2, Q4'"
            }
        },
        "required": ["text", "difficulty"]
    })
}

/// The full study-plan response schema.
///
/// Mirrors [`crate::plan::StudyPlan`] exactly: `summary`,
/// `extractedQuestions`, and `modules` are required; `subject` is optional.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "subject": {
                "type": "STRING",
                "description": "Inferred exam or subject name"
            },
            "summary": {
                "type": "STRING",
                "description": "A brief executive summary of the analysis, highlighting the most crucial areas to focus on."
            },
            "extractedQuestions": {
                "type": "ARRAY",
                "description": "A consolidated list of all questions found in the papers.",
                "items": question_schema()
            },
            "modules": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "topicName": { "type": "STRING" },
                        "priority": { "type": "STRING", "enum": Priority::VALUES },
                        "description": {
                            "type": "STRING",
                            "description": "Why this topic is important based on previous papers."
                        },
                        "questions": {
                            "type": "ARRAY",
                            "description": "Questions specifically related to this topic",
                            "items": question_schema()
                        }
                    },
                    "required": ["topicName", "priority", "description", "questions"]
                }
            }
        },
        "required": ["summary", "extractedQuestions", "modules"]
    })
}
