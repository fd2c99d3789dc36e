//! The `quizmark summarize` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizmark_core::report::load_report_directory;
use quizmark_core::scoring::{compute_quiz_stats, QuizStats};

pub fn execute(reports_dir: PathBuf) -> Result<()> {
    let reports = load_report_directory(&reports_dir)?;
    if reports.is_empty() {
        println!("No attempt reports found in {}.", reports_dir.display());
        return Ok(());
    }

    let stats = compute_quiz_stats(&reports);
    print_table(&stats);

    for s in &stats {
        let hardest: Vec<_> = s
            .hardest(3)
            .iter()
            .filter(|q| q.facility < 1.0)
            .collect();
        if hardest.is_empty() {
            continue;
        }
        println!("\nMost missed in {}:", s.title);
        for q in hardest {
            println!(
                "  question {}: {}/{} correct ({:.0}%)",
                q.question,
                q.correct,
                q.attempts,
                q.facility * 100.0
            );
        }
    }

    Ok(())
}

fn print_table(stats: &[QuizStats]) {
    let mut table = Table::new();
    table.set_header(vec![
        "Quiz", "Attempts", "Passed", "Pass rate", "Mean", "Best", "Worst",
    ]);

    for s in stats {
        table.add_row(vec![
            Cell::new(&s.title),
            Cell::new(s.attempts),
            Cell::new(s.passes),
            Cell::new(format!("{:.0}%", s.pass_rate * 100.0)),
            Cell::new(format!("{:.1}%", s.mean_percentage)),
            Cell::new(format!("{:.1}%", s.best_percentage)),
            Cell::new(format!("{:.1}%", s.worst_percentage)),
        ]);
    }

    println!("{table}");
}
