//! PDF export of a finished study plan.
//!
//! Builds a paginated Letter document with a fixed layout: title, summary,
//! the consolidated question list, then the topic-wise plan with each
//! module's priority, description, and question bullets. Text is set in
//! Helvetica with greedy word wrap; characters outside the printable ASCII
//! range are replaced rather than dropped, since the base fonts cannot
//! encode them.

use crate::error::ExamPrepError;
use crate::plan::{Question, StudyPlan};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;
use tracing::info;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 48.0;
const BOTTOM_LIMIT: f32 = 56.0;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;

/// One laid-out line: font size, left offset from the margin, and text.
struct Line {
    size: f32,
    indent: f32,
    text: String,
    gap_after: f32,
}

impl Line {
    fn new(size: f32, indent: f32, text: String) -> Self {
        Self {
            size,
            indent,
            text,
            gap_after: 0.0,
        }
    }

    fn with_gap(mut self, gap: f32) -> Self {
        self.gap_after = gap;
        self
    }

    fn height(&self) -> f32 {
        self.size * 1.4 + self.gap_after
    }
}

/// Render the plan and return the finished PDF bytes.
pub fn export_pdf(plan: &StudyPlan) -> Result<Vec<u8>, ExamPrepError> {
    let lines = layout(plan);
    let pages = paginate(&lines);

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| ExamPrepError::ExportFailed(format!("content stream: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExamPrepError::ExportFailed(format!("serializing document: {e}")))?;
    Ok(bytes)
}

/// Render the plan and write it to `path` atomically.
///
/// The bytes land in a sibling temp file first and are renamed into place,
/// so a crash mid-write never leaves a truncated PDF at the target path.
pub async fn export_pdf_to_file(
    plan: &StudyPlan,
    path: impl AsRef<Path>,
) -> Result<(), ExamPrepError> {
    let path = path.as_ref();
    let bytes = export_pdf(plan)?;

    let tmp = path.with_extension("pdf.tmp");
    let write = async {
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await
    };
    write.await.map_err(|source| ExamPrepError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

// ── Layout ────────────────────────────────────────────────────────────────

fn layout(plan: &StudyPlan) -> Vec<Line> {
    let mut lines = Vec::new();

    let title = match &plan.subject {
        Some(subject) => format!("Exam Analysis: {subject}"),
        None => "Exam Analysis & Study Plan".to_string(),
    };
    push_wrapped(&mut lines, TITLE_SIZE, 0.0, &title);
    gap(&mut lines, 10.0);

    push_wrapped(&mut lines, HEADING_SIZE, 0.0, "Summary");
    push_wrapped(&mut lines, BODY_SIZE, 0.0, &plan.summary);
    gap(&mut lines, 12.0);

    push_wrapped(&mut lines, HEADING_SIZE, 0.0, "All Extracted Questions");
    for (i, q) in plan.extracted_questions.iter().enumerate() {
        push_wrapped(
            &mut lines,
            BODY_SIZE,
            0.0,
            &format!("{}. {}", i + 1, question_line(q)),
        );
    }
    gap(&mut lines, 12.0);

    push_wrapped(&mut lines, HEADING_SIZE, 0.0, "Topic-wise Study Plan");
    for module in &plan.modules {
        push_wrapped(
            &mut lines,
            BODY_SIZE + 2.0,
            0.0,
            &format!("{} ({} Priority)", module.topic_name, module.priority),
        );
        push_wrapped(&mut lines, BODY_SIZE, 0.0, &module.description);
        for q in &module.questions {
            push_wrapped(&mut lines, BODY_SIZE, 14.0, &format!("- {}", question_line(q)));
        }
        gap(&mut lines, 8.0);
    }

    lines
}

fn question_line(q: &Question) -> String {
    let mut line = format!("[{}] {}", q.difficulty, q.text);
    if let Some(marks) = q.marks {
        if marks.fract() == 0.0 {
            line.push_str(&format!(" ({} marks)", marks as i64));
        } else {
            line.push_str(&format!(" ({marks} marks)"));
        }
    }
    if let Some(ref year) = q.year_appeared {
        line.push_str(&format!(" [{year}]"));
    }
    line
}

fn gap(lines: &mut Vec<Line>, points: f32) {
    if let Some(last) = lines.last_mut() {
        last.gap_after += points;
    }
}

fn push_wrapped(lines: &mut Vec<Line>, size: f32, indent: f32, text: &str) {
    let usable = PAGE_WIDTH - 2.0 * MARGIN - indent;
    // Helvetica averages roughly half the point size per glyph.
    let max_chars = (usable / (size * 0.5)).floor().max(8.0) as usize;
    for wrapped in wrap(&sanitize(text), max_chars) {
        lines.push(Line::new(size, indent, wrapped));
    }
}

/// Replace characters the base-14 fonts cannot encode.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c,
            '\n' | '\t' => ' ',
            _ => '?',
        })
        .collect()
}

/// Greedy word wrap. Words longer than the width get hard-split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.len() > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let (head, tail) = word.split_at(max_chars);
            out.push(head.to_string());
            word = tail;
        }
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

/// Flow the lines onto pages, breaking when the cursor hits the bottom.
fn paginate(lines: &[Line]) -> Vec<Vec<Operation>> {
    let mut pages = Vec::new();
    let mut operations = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        if y - line.height() < BOTTOM_LIMIT {
            pages.push(std::mem::take(&mut operations));
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= line.size * 1.4;
        if !line.text.is_empty() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), line.size.into()]));
            operations.push(Operation::new(
                "Td",
                vec![(MARGIN + line.indent).into(), y.into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.text.as_str())],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        y -= line.gap_after;
    }
    pages.push(operations);
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Difficulty, Priority, TopicModule};

    fn question(text: &str) -> Question {
        Question {
            text: text.to_string(),
            marks: Some(5.0),
            year_appeared: Some("2023".into()),
            difficulty: Difficulty::Medium,
            reference: None,
        }
    }

    fn plan(question_count: usize) -> StudyPlan {
        StudyPlan {
            subject: Some("Physics".into()),
            summary: "Kinematics dominates; optics recurs every other year.".into(),
            extracted_questions: (0..question_count)
                .map(|i| question(&format!("Question number {i} about motion in a plane.")))
                .collect(),
            modules: vec![TopicModule {
                topic_name: "Kinematics".into(),
                priority: Priority::High,
                description: "Appears in every paper with high marks.".into(),
                questions: vec![question("Define instantaneous velocity.")],
            }],
        }
    }

    #[test]
    fn export_produces_a_pdf() {
        let bytes = export_pdf(&plan(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn long_plans_break_across_pages() {
        let bytes = export_pdf(&plan(120)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 2);
    }

    #[test]
    fn question_line_includes_difficulty_and_marks() {
        let line = question_line(&question("Define velocity."));
        assert_eq!(line, "[Medium] Define velocity. (5 marks) [2023]");
    }

    #[test]
    fn sanitize_replaces_non_ascii() {
        assert_eq!(sanitize("Schrödinger"), "Schr?dinger");
        assert_eq!(sanitize("a\tb\nc"), "a b c");
    }

    #[test]
    fn wrap_is_greedy_and_splits_long_words() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[tokio::test]
    async fn export_to_file_writes_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.pdf");
        export_pdf_to_file(&plan(2), &path).await.unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!dir.path().join("plan.pdf.tmp").exists());
    }
}
