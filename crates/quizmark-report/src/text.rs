//! Plain-text rendering for the terminal.

use quizmark_core::report::{option_label, AttemptReport};

/// Summary printed after an attempt is graded.
///
/// With `show_answers` every question is listed with the learner's choice,
/// the correct option and the explanation; otherwise only missed questions are.
pub fn render_summary(report: &AttemptReport, show_answers: bool) -> String {
    let mut out = String::new();
    let taken = report.created_at.with_timezone(&chrono::Local);

    out.push_str(&format!("{}\n", report.quiz.title));
    out.push_str(&format!("{}\n", "=".repeat(report.quiz.title.chars().count().max(8))));
    out.push_str(&format!(
        "Score: {}/{} ({:.1}%), pass mark {}%\n",
        report.result.score,
        report.result.total_questions,
        report.result.percentage,
        report.quiz.passing_score
    ));
    out.push_str(&format!(
        "Result: {}\n",
        if report.result.passed { "PASSED" } else { "NOT PASSED" }
    ));
    out.push_str(&format!(
        "Taken: {} ({})\n",
        taken.format("%Y-%m-%d %H:%M"),
        format_duration(report.duration_ms)
    ));
    if report.overtime {
        out.push_str("Note: finished after the time limit.\n");
    }

    if report.categories.len() > 1 {
        out.push_str("\nBy category:\n");
        for c in &report.categories {
            out.push_str(&format!(
                "  {:<30} {}/{} ({:.0}%)\n",
                c.category, c.correct, c.total, c.percentage
            ));
        }
    }

    let listed: Vec<_> = report
        .outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| show_answers || !o.correct)
        .collect();
    if !listed.is_empty() {
        out.push_str(if show_answers { "\nAnswers:\n" } else { "\nReview:\n" });
        for (i, o) in listed {
            let mark = if o.correct { "✓" } else { "✗" };
            let selected = o
                .selected
                .map(|s| option_label(s).to_string())
                .unwrap_or_else(|| "none".to_string());
            out.push_str(&format!("  {mark} {}. {}\n", i + 1, o.prompt));
            out.push_str(&format!(
                "      your answer: {selected}, correct: {}\n",
                option_label(o.correct_index)
            ));
            if let Some(explanation) = &o.explanation {
                out.push_str(&format!("      {explanation}\n"));
            }
        }
    }

    out
}

fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
