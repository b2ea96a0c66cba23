//! Plain-text rendering of a study plan for terminal output.

use crate::plan::{Question, StudyPlan};
use std::fmt::Write;

/// Render the plan as readable plain text.
///
/// Mirrors the PDF layout: summary first, then the consolidated question
/// list, then the topic-wise plan ordered as the provider returned it.
pub fn render_plan(plan: &StudyPlan) -> String {
    let mut out = String::new();

    match &plan.subject {
        Some(subject) => {
            let _ = writeln!(out, "Exam Analysis: {subject}");
        }
        None => out.push_str("Exam Analysis & Study Plan\n"),
    }
    out.push('\n');

    let _ = writeln!(out, "Summary\n  {}", plan.summary);
    out.push('\n');

    let _ = writeln!(
        out,
        "All Extracted Questions ({})",
        plan.extracted_questions.len()
    );
    for (i, q) in plan.extracted_questions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, question_line(q));
    }
    out.push('\n');

    out.push_str("Topic-wise Study Plan\n");
    for module in &plan.modules {
        let _ = writeln!(out, "\n  {} ({} Priority)", module.topic_name, module.priority);
        let _ = writeln!(out, "  {}", module.description);
        for q in &module.questions {
            let _ = writeln!(out, "    - {}", question_line(q));
        }
    }

    out
}

fn question_line(q: &Question) -> String {
    let mut line = format!("[{}] {}", q.difficulty, q.text);
    if let Some(marks) = q.marks {
        if marks.fract() == 0.0 {
            let _ = write!(line, " ({} marks)", marks as i64);
        } else {
            let _ = write!(line, " ({marks} marks)");
        }
    }
    if let Some(ref year) = q.year_appeared {
        let _ = write!(line, " [{year}]");
    }
    line
}
