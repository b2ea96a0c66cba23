//! Study-plan entities: the validated result of one generation attempt.
//!
//! These structs double as the wire contract: the provider is instructed to
//! return JSON in exactly this shape (field names are camelCase on the wire,
//! see [`crate::schema`]), and deserialisation through serde *is* the
//! structural validation — a missing `summary`, `extractedQuestions`, or
//! `modules` field fails to parse.
//!
//! A `StudyPlan` is immutable once constructed. The application holds the
//! current plan until a new generation replaces it wholesale; presentation
//! code only reads it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Estimated difficulty of an extracted question.
///
/// The string values are part of the provider contract and must not vary
/// between requests. [`Difficulty::VALUES`] feeds the response schema so the
/// enum set is defined exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Wire values, in schema order.
    pub const VALUES: [&'static str; 3] = ["Easy", "Medium", "Hard"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Study priority assigned to a topic module, based on how often the topic
/// appears in the analysed papers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Wire values, in schema order.
    pub const VALUES: [&'static str; 3] = ["High", "Medium", "Low"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One question extracted verbatim from the uploaded papers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Verbatim question text.
    pub text: String,

    /// Marks for the question, when stated or inferable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,

    /// Year the question appeared, free text ("2022", "2021 supplementary").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_appeared: Option<String>,

    /// Estimated difficulty.
    pub difficulty: Difficulty,

    /// Free-text locator such as "Page 2, Q4".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A syllabus topic with its priority and the questions that belong to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicModule {
    pub topic_name: String,
    pub priority: Priority,
    /// Why this topic matters, based on the analysed papers.
    pub description: String,
    /// Questions specific to this topic. May be empty.
    pub questions: Vec<Question>,
}

/// The validated, structured result of one generation attempt.
///
/// Every question in a module's list should also appear in
/// `extracted_questions` — the prompt instructs the provider to assign every
/// extracted question to some module, but that coverage is a provider
/// quality concern and is not verified here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    /// Inferred exam/subject name, when the provider could tell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Executive summary of the analysis.
    pub summary: String,

    /// Flat consolidated list of all questions found in the papers.
    pub extracted_questions: Vec<Question>,

    /// Topic modules, in the provider's study order.
    pub modules: Vec<TopicModule>,
}

impl StudyPlan {
    /// Total number of questions across all modules.
    pub fn module_question_count(&self) -> usize {
        self.modules.iter().map(|m| m.questions.len()).sum()
    }
}
