//! The `quizmark validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizmark_core::bank::{BankPolicy, BankReport, QuestionBank};
use quizmark_core::config::load_config_from;
use quizmark_core::parser::{self, QuizDocument, Severity, ValidationWarning};
use quizmark_core::Quiz;

pub fn execute(quiz_path: PathBuf, bank: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let files = if quiz_path.is_dir() {
        parser::load_document_directory(&quiz_path)?
    } else {
        vec![(quiz_path.clone(), parser::parse_document(&quiz_path))]
    };

    let mut documents: Vec<QuizDocument> = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for (path, doc) in files {
        match doc {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                println!("File: {}", path.display());
                println!("   ERROR: {e:#}");
                total_errors += 1;
            }
        }
    }

    for QuizDocument { quiz, exam } in &documents {
        println!("Quiz: {} ({} questions)", quiz.title, quiz.questions.len());

        let mut findings = parser::lint_quiz(quiz, config.default_passing_score);
        if let Some(mix) = exam.as_ref().and_then(|e| e.difficulty_mix) {
            if let Err(message) = mix.validate() {
                findings.push(ValidationWarning {
                    question: None,
                    severity: Severity::Error,
                    message: format!("[exam] {message}"),
                });
            }
        }

        for f in &findings {
            print_finding(f);
            match f.severity {
                Severity::Error => total_errors += 1,
                Severity::Warning => total_warnings += 1,
            }
        }

        if bank {
            print_bank_report(quiz);
        }
    }

    if total_errors > 0 {
        anyhow::bail!("{total_errors} error(s), {total_warnings} warning(s) found");
    }
    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn print_finding(f: &ValidationWarning) {
    let prefix = f
        .question
        .as_ref()
        .map(|id| format!("  [{id}]"))
        .unwrap_or_else(|| "  ".to_string());
    let level = match f.severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARNING",
    };
    println!("{prefix} {level}: {}", f.message);
}

fn print_bank_report(quiz: &Quiz) {
    let report: BankReport = QuestionBank::from_quiz(quiz).analyze(&BankPolicy::default());

    println!("  Bank: {} question(s)", report.total);
    if !report.sections.is_empty() {
        println!("    Sections:");
        for (section, n) in &report.sections {
            println!("      {section}: {n}");
        }
    }
    if !report.difficulties.is_empty() {
        println!("    Difficulty:");
        for (difficulty, n) in &report.difficulties {
            println!(
                "      {difficulty}: {n} ({:.0}%)",
                *n as f64 * 100.0 / report.total.max(1) as f64
            );
        }
    }
    if !report.categories.is_empty() {
        println!("    Categories:");
        for (category, n) in &report.categories {
            println!("      {category}: {n}");
        }
    }
    for issue in &report.issues {
        println!("    NOTE: {issue}");
    }
}
