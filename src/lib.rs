//! # examprep
//!
//! Turn a syllabus and a stack of past exam papers into a prioritized study
//! plan. The papers (PDFs or scanned images) are base64-encoded and sent,
//! together with the syllabus and a strict response schema, to a generative
//! provider; the JSON that comes back is validated into a typed
//! [`StudyPlan`] listing every extracted question and a topic-wise plan
//! ordered by priority.
//!
//! ## Quick start
//!
//! ```no_run
//! use examprep::{analyze_paths, AnalysisConfig};
//!
//! # async fn run() -> Result<(), examprep::ExamPrepError> {
//! let config = AnalysisConfig::builder()
//!     .api_key("your-gemini-key")
//!     .build()?;
//!
//! let plan = analyze_paths(
//!     "Unit 1: Kinematics. Unit 2: Optics.",
//!     &["papers/2022.pdf", "papers/2023.pdf"],
//!     &config,
//! )
//! .await?;
//!
//! println!("{}", examprep::render_plan(&plan));
//! examprep::export_pdf_to_file(&plan, "study-plan.pdf").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! documents ──▶ encode ──▶ generate ──▶ validate ──▶ StudyPlan
//! ```
//!
//! Each stage lives in [`pipeline`]; the provider boundary is the
//! [`PlanProvider`] trait with direct-API and relay implementations, plus
//! whatever stub a test injects through [`AnalysisConfig`].

pub mod analyze;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod plan;
pub mod prompts;
pub mod provider;
pub mod render;
pub mod schema;

#[cfg(feature = "relay-server")]
pub mod relay_server;

pub use analyze::{analyze, analyze_paths};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, DEFAULT_MODEL};
pub use document::{UploadedDocument, ACCEPTED_MIME_TYPES};
pub use error::ExamPrepError;
pub use export::{export_pdf, export_pdf_to_file};
pub use plan::{Difficulty, Priority, Question, StudyPlan, TopicModule};
pub use provider::{
    GeminiProvider, GenerationOptions, GenerationRequest, PlanProvider, RelayProvider,
};
pub use render::render_plan;
