//! The `quizmark take` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use quizmark_core::config::load_config_from;
use quizmark_core::parser::parse_quiz;
use quizmark_core::report::AttemptReport;
use quizmark_core::{QuizResult, QuizSession};
use quizmark_report::text::render_summary;

pub fn execute(
    quiz_path: PathBuf,
    shuffle: bool,
    seed: Option<u64>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let quiz = parse_quiz(&quiz_path)?;

    let mut session_config = config.session_config();
    session_config.shuffle_questions |= shuffle;
    if seed.is_some() {
        session_config.seed = seed;
    }

    let mut session = QuizSession::from_quiz(&quiz, config.default_passing_score, session_config)
        .with_context(|| format!("cannot start quiz '{}'", quiz.id))?
        .with_hook(Arc::new(|result: &QuizResult| print_banner(result)));

    if let Some(limit) = quiz.time_limit_secs {
        println!("Time limit: {} minute(s), advisory.", limit.div_ceil(60));
    }

    let started = Instant::now();
    let stdin = io::stdin();
    run_attempt(&mut session, &mut stdin.lock(), &mut io::stdout())?;
    session.submit();

    let report =
        AttemptReport::from_session(&quiz.id, &session, started.elapsed(), quiz.time_limit_secs)?;
    print!("{}", render_summary(&report, true));

    let dir = output.unwrap_or(config.output_dir);
    let path = dir.join(format!("{}.json", report.file_stem()));
    report.save_json(&path)?;
    eprintln!("Attempt saved to: {}", path.display());

    Ok(())
}

/// What the learner typed at a prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Select(usize),
    Skip,
    Submit,
    Invalid,
}

fn parse_input(line: &str, option_count: usize) -> Input {
    match line {
        "" => Input::Skip,
        "s" | "S" => Input::Submit,
        other => match other.parse::<usize>() {
            Ok(n) if (1..=option_count).contains(&n) => Input::Select(n - 1),
            _ => Input::Invalid,
        },
    }
}

/// Ask every question in session order, recording answers until the input
/// runs out or the learner submits early. Does not submit.
fn run_attempt<R: BufRead, W: Write>(
    session: &mut QuizSession,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let questions = session.questions().to_vec();
    let total = questions.len();

    writeln!(
        out,
        "{} ({} questions, pass mark {}%)",
        session.title(),
        total,
        session.passing_score()
    )?;
    writeln!(
        out,
        "Enter an option number, a blank line to skip, or 's' to submit.\n"
    )?;

    'questions: for (i, q) in questions.iter().enumerate() {
        writeln!(out, "Question {}/{}: {}", i + 1, total, q.prompt)?;
        for (j, option) in q.options.iter().enumerate() {
            writeln!(out, "  {}) {}", j + 1, option)?;
        }

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break 'questions;
            }
            match parse_input(line.trim(), q.options.len()) {
                Input::Select(option) => {
                    session.select_answer(&q.id, option)?;
                    break;
                }
                Input::Skip => break,
                Input::Submit => break 'questions,
                Input::Invalid => writeln!(
                    out,
                    "Enter a number from 1 to {}, a blank line to skip, or 's' to submit.",
                    q.options.len()
                )?,
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "Answered {} of {} question(s).", session.answered_count(), total)?;
    Ok(())
}

fn print_banner(result: &QuizResult) {
    let rule = "-".repeat(40);
    let verdict = if result.passed { "PASSED" } else { "NOT PASSED" };
    println!("{rule}");
    println!(
        "  {verdict}: {}/{} ({:.1}%)",
        result.score, result.total_questions, result.percentage
    );
    println!("{rule}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizmark_core::session::SessionConfig;
    use quizmark_core::{Question, QuestionId};
    use std::io::Cursor;

    fn session() -> QuizSession {
        let questions = vec![
            Question::new(1u64, "2 + 2?", vec!["3".into(), "4".into()], 1),
            Question::new(2u64, "Capital of France?", vec!["Paris".into(), "Lyon".into()], 0),
            Question::new(3u64, "Largest planet?", vec!["Mars".into(), "Jupiter".into()], 1),
        ];
        QuizSession::initialize(questions, 60, SessionConfig::default()).unwrap()
    }

    fn run(session: &mut QuizSession, input: &str) -> String {
        let mut out = Vec::new();
        run_attempt(session, &mut Cursor::new(input), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_input() {
        assert_eq!(parse_input("2", 4), Input::Select(1));
        assert_eq!(parse_input("", 4), Input::Skip);
        assert_eq!(parse_input("s", 4), Input::Submit);
        assert_eq!(parse_input("0", 4), Input::Invalid);
        assert_eq!(parse_input("5", 4), Input::Invalid);
        assert_eq!(parse_input("b", 4), Input::Invalid);
    }

    #[test]
    fn answers_all_questions() {
        let mut s = session();
        let out = run(&mut s, "2\n1\n2\n");
        assert!(out.contains("Question 3/3: Largest planet?"));
        assert!(out.contains("Answered 3 of 3"));

        let result = s.submit();
        assert_eq!(result.score, 3);
        assert!(result.passed);
    }

    #[test]
    fn blank_line_skips_and_invalid_reprompts() {
        let mut s = session();
        let out = run(&mut s, "\n9\n1\n2\n");
        assert!(out.contains("Enter a number from 1 to 2"));
        assert_eq!(s.response(&QuestionId::Number(1)), None);
        assert_eq!(s.response(&QuestionId::Number(2)), Some(0));
        assert_eq!(s.response(&QuestionId::Number(3)), Some(1));
    }

    #[test]
    fn early_submit_and_eof_stop_asking() {
        let mut s = session();
        let out = run(&mut s, "2\ns\n");
        assert!(!out.contains("Largest planet?"));
        assert_eq!(s.answered_count(), 1);

        let mut s = session();
        run(&mut s, "2");
        assert_eq!(s.answered_count(), 1);
        assert!(!s.is_submitted());
    }
}
