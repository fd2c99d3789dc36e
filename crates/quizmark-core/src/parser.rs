//! TOML quiz file parser.
//!
//! Loads quizzes from TOML files and directories, writes them back out, and
//! lints them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bank::ExamSpec;
use crate::error::ConfigError;
use crate::model::{Difficulty, Question, QuestionId, Quiz};
use crate::session::check_configuration;

/// Intermediate TOML structure for quiz files.
#[derive(Debug, Serialize, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exam: Option<ExamSpec>,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    passing_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_limit_secs: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlQuestion {
    id: QuestionId,
    #[serde(alias = "question")]
    prompt: String,
    options: Vec<String>,
    #[serde(
        alias = "correct_answer",
        alias = "correctIndex",
        alias = "correctAnswer"
    )]
    correct_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    difficulty: Option<String>,
}

/// A parsed quiz file: the quiz itself plus optional mock-exam settings.
#[derive(Debug, Clone)]
pub struct QuizDocument {
    pub quiz: Quiz,
    pub exam: Option<ExamSpec>,
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    Ok(parse_document(path)?.quiz)
}

/// Parse a single TOML file, keeping its `[exam]` table.
pub fn parse_document(path: &Path) -> Result<QuizDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_document_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    Ok(parse_document_str(content, source_path)?.quiz)
}

/// Parse a TOML string into a `QuizDocument`.
pub fn parse_document_str(content: &str, source_path: &Path) -> Result<QuizDocument> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let difficulty = q
                .difficulty
                .map(|d| {
                    d.parse::<Difficulty>()
                        .map_err(|e| anyhow::anyhow!("question {}: {}", q.id, e))
                })
                .transpose()?;

            Ok(Question {
                id: q.id,
                prompt: q.prompt,
                options: q.options,
                correct_index: q.correct_index,
                explanation: q.explanation,
                section: q.section,
                category: q.category,
                difficulty,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuizDocument {
        quiz: Quiz {
            id: parsed.quiz.id,
            title: parsed.quiz.title,
            description: parsed.quiz.description,
            passing_score: parsed.quiz.passing_score,
            time_limit_secs: parsed.quiz.time_limit_secs,
            questions,
        },
        exam: parsed.exam,
    })
}

/// Render a quiz back into the TOML file format.
pub fn to_toml_string(quiz: &Quiz) -> Result<String> {
    let file = TomlQuizFile {
        quiz: TomlQuizHeader {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            passing_score: quiz.passing_score,
            time_limit_secs: quiz.time_limit_secs,
        },
        exam: None,
        questions: quiz
            .questions
            .iter()
            .map(|q| TomlQuestion {
                id: q.id.clone(),
                prompt: q.prompt.clone(),
                options: q.options.clone(),
                correct_index: q.correct_index,
                explanation: q.explanation.clone(),
                section: q.section.clone(),
                category: q.category.clone(),
                difficulty: q.difficulty.map(|d| d.to_string()),
            })
            .collect(),
    };
    toml::to_string(&file).context("failed to serialize quiz as TOML")
}

/// Recursively load all `.toml` quiz files from a directory.
///
/// Files that fail to parse are skipped with a warning; use
/// [`load_document_directory`] to see every failure.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();
    for (path, doc) in load_document_directory(dir)? {
        match doc {
            Ok(doc) => quizzes.push(doc.quiz),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }
    Ok(quizzes)
}

/// Recursively parse every `.toml` file under `dir`, in path order, keeping
/// each file's parse result alongside its path.
pub fn load_document_directory(dir: &Path) -> Result<Vec<(PathBuf, Result<QuizDocument>)>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            documents.extend(load_document_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            let doc = parse_document(&path);
            documents.push((path, doc));
        }
    }

    Ok(documents)
}

/// How serious a lint finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The quiz cannot be taken as written.
    Error,
    Warning,
}

/// A finding from quiz linting.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question: Option<QuestionId>,
    pub severity: Severity,
    pub message: String,
}

fn config_issue_question(issue: &ConfigError) -> Option<QuestionId> {
    match issue {
        ConfigError::TooFewOptions { question, .. }
        | ConfigError::CorrectIndexOutOfRange { question, .. }
        | ConfigError::DuplicateQuestionId(question) => Some(question.clone()),
        ConfigError::EmptyQuiz | ConfigError::PassingScoreOutOfRange(_) => None,
    }
}

/// Lint a quiz: configuration errors plus softer content issues.
///
/// `default_passing_score` is checked when the quiz sets none of its own.
pub fn lint_quiz(quiz: &Quiz, default_passing_score: u8) -> Vec<ValidationWarning> {
    let mut warnings: Vec<ValidationWarning> =
        check_configuration(&quiz.questions, quiz.passing_score_or(default_passing_score))
            .into_iter()
            .map(|issue| ValidationWarning {
                question: config_issue_question(&issue),
                severity: Severity::Error,
                message: issue.to_string(),
            })
            .collect();

    for q in &quiz.questions {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: Some(q.id.clone()),
                severity: Severity::Warning,
                message: "prompt is empty".into(),
            });
        }

        let mut seen = HashSet::new();
        for option in &q.options {
            if !seen.insert(option.trim()) {
                warnings.push(ValidationWarning {
                    question: Some(q.id.clone()),
                    severity: Severity::Warning,
                    message: format!("duplicate option: {option}"),
                });
            }
        }

        let explained = q
            .explanation
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty());
        if !explained {
            warnings.push(ValidationWarning {
                question: Some(q.id.clone()),
                severity: Severity::Warning,
                message: "no explanation provided".into(),
            });
        }
    }

    warnings
}

/// Whether any finding prevents the quiz from being taken.
pub fn has_errors(warnings: &[ValidationWarning]) -> bool {
    warnings.iter().any(|w| w.severity == Severity::Error)
}
