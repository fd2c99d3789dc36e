//! Attempt report types with JSON persistence.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::{category_breakdown, CategoryScore};
use crate::session::{QuestionOutcome, QuizResult, QuizSession};

/// The record of one submitted attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the attempt was submitted.
    pub created_at: DateTime<Utc>,
    /// Summary of the quiz that was taken.
    pub quiz: QuizSummary,
    /// Aggregate outcome.
    pub result: QuizResult,
    /// Per-question feedback in the order the questions were presented.
    pub outcomes: Vec<QuestionOutcome>,
    /// Correct answers grouped by category.
    #[serde(default)]
    pub categories: Vec<CategoryScore>,
    /// Wall-clock time the learner spent, in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
    /// Whether the attempt ran past the advisory time limit.
    #[serde(default)]
    pub overtime: bool,
}

/// Summary of a quiz (without the full question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub question_count: usize,
    pub passing_score: u8,
}

impl AttemptReport {
    /// Build a report from a submitted session.
    pub fn from_session(
        quiz_id: &str,
        session: &QuizSession,
        elapsed: Duration,
        time_limit_secs: Option<u64>,
    ) -> Result<Self> {
        let (Some(result), Some(outcomes)) = (session.result(), session.outcomes()) else {
            anyhow::bail!("cannot report on a session that has not been submitted");
        };

        let overtime = time_limit_secs.is_some_and(|limit| elapsed.as_secs() > limit);

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            quiz: QuizSummary {
                id: quiz_id.to_string(),
                title: session.title().to_string(),
                question_count: session.questions().len(),
                passing_score: session.passing_score(),
            },
            result,
            categories: category_breakdown(&outcomes),
            outcomes,
            duration_ms: elapsed.as_millis() as u64,
            time_limit_secs,
            overtime,
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Suggested file name, unique per attempt.
    pub fn file_stem(&self) -> String {
        let id = self.id.simple().to_string();
        format!(
            "{}-{}-{}",
            self.quiz.id,
            self.created_at.format("%Y%m%dT%H%M%S"),
            &id[..8]
        )
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.quiz.title));
        md.push_str(&format!(
            "**Result:** {} — {}/{} ({:.1}%), pass mark {}%\n\n",
            if self.result.passed { "PASSED" } else { "NOT PASSED" },
            self.result.score,
            self.result.total_questions,
            self.result.percentage,
            self.quiz.passing_score
        ));

        md.push_str("| # | Question | Your answer | Correct | Result |\n");
        md.push_str("|---|----------|-------------|---------|--------|\n");
        for (i, o) in self.outcomes.iter().enumerate() {
            let selected = o
                .selected
                .map(|s| option_label(s).to_string())
                .unwrap_or_else(|| "-".to_string());
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                i + 1,
                o.prompt.replace('|', "\\|"),
                selected,
                option_label(o.correct_index),
                if o.correct { "✓" } else { "✗" }
            ));
        }

        if self.categories.len() > 1 {
            md.push_str("\n### By category\n\n");
            for c in &self.categories {
                md.push_str(&format!(
                    "- {}: {}/{} ({:.1}%)\n",
                    c.category, c.correct, c.total, c.percentage
                ));
            }
        }

        md
    }
}

/// Letter label for an option index (A, B, C, ...).
pub fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Load every `.json` report in a directory (non-recursive).
pub fn load_report_directory(dir: &Path) -> Result<Vec<AttemptReport>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut reports = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            match AttemptReport::load_json(&path) {
                Ok(r) => reports.push(r),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }
    reports.sort_by_key(|r| r.created_at);

    Ok(reports)
}
