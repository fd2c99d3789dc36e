//! The `quizmark grade` command.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use quizmark_core::config::load_config_from;
use quizmark_core::parser::parse_quiz;
use quizmark_core::report::AttemptReport;
use quizmark_core::{Quiz, QuizSession};
use quizmark_report::html::write_html_report;
use quizmark_report::text::render_summary;

pub fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    output: Option<PathBuf>,
    require_pass: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let quiz = parse_quiz(&quiz_path)?;
    let answers = load_answer_sheet(&answers_path)?;

    let report = grade(&quiz, &answers, config.default_passing_score)?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "html" => {
            let dir = output.clone().unwrap_or_else(|| config.output_dir.clone());
            let path = dir.join(format!("{}.html", report.file_stem()));
            write_html_report(&report, &path)?;
            eprintln!("HTML report: {}", path.display());
        }
        "text" => print!("{}", render_summary(&report, false)),
        other => anyhow::bail!("unknown format: {other} (expected text, json, markdown or html)"),
    }

    if let Some(dir) = &output {
        let path = dir.join(format!("{}.json", report.file_stem()));
        report.save_json(&path)?;
        eprintln!("Attempt saved to: {}", path.display());
    }

    if require_pass && !report.result.passed {
        std::process::exit(1);
    }

    Ok(())
}

/// Read an answer sheet: a flat table from question id to zero-based option index.
fn load_answer_sheet(path: &Path) -> Result<BTreeMap<String, usize>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;

    let sheet = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content)
            .with_context(|| format!("failed to parse answer sheet: {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse answer sheet: {}", path.display()))?
    };
    Ok(sheet)
}

fn grade(quiz: &Quiz, answers: &BTreeMap<String, usize>, default_passing: u8) -> Result<AttemptReport> {
    let mut session = QuizSession::from_quiz(quiz, default_passing, Default::default())
        .with_context(|| format!("cannot grade quiz '{}'", quiz.id))?;

    for (key, &option) in answers {
        let question = quiz
            .questions
            .iter()
            .find(|q| q.id.matches_str(key))
            .with_context(|| format!("answer sheet names unknown question '{key}'"))?;
        session.select_answer(&question.id, option)?;
    }
    session.submit();

    AttemptReport::from_session(&quiz.id, &session, Duration::ZERO, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizmark_core::Question;

    fn quiz() -> Quiz {
        Quiz {
            id: "fa".into(),
            title: "First Aid".into(),
            description: String::new(),
            passing_score: Some(80),
            time_limit_secs: None,
            questions: vec![
                Question::new(1u64, "A?", vec!["x".into(), "y".into()], 0),
                Question::new("q-two", "B?", vec!["x".into(), "y".into()], 1),
            ],
        }
    }

    fn sheet(entries: &[(&str, usize)]) -> BTreeMap<String, usize> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn grades_numeric_and_text_ids() {
        let report = grade(&quiz(), &sheet(&[("1", 0), ("q-two", 1)]), 70).unwrap();
        assert_eq!(report.result.score, 2);
        assert!(report.result.passed);
    }

    #[test]
    fn missing_answers_count_as_wrong() {
        let report = grade(&quiz(), &sheet(&[("1", 0)]), 70).unwrap();
        assert_eq!(report.result.score, 1);
        assert!(!report.result.passed);
        assert_eq!(report.outcomes[1].selected, None);
    }

    #[test]
    fn unknown_question_and_bad_option_fail() {
        assert!(grade(&quiz(), &sheet(&[("7", 0)]), 70).is_err());
        assert!(grade(&quiz(), &sheet(&[("1", 5)]), 70).is_err());
    }

    #[test]
    fn loads_json_and_toml_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("answers.json");
        std::fs::write(&json, r#"{"1": 0, "q-two": 1}"#).unwrap();
        let toml = dir.path().join("answers.toml");
        std::fs::write(&toml, "1 = 0\nq-two = 1\n").unwrap();

        assert_eq!(load_answer_sheet(&json).unwrap(), load_answer_sheet(&toml).unwrap());
    }
}
