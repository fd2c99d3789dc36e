//! The `quizmark draw` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use quizmark_core::bank::{assemble_exam, DifficultyMix};
use quizmark_core::parser::{parse_document, to_toml_string};

pub fn execute(
    bank_path: PathBuf,
    count: Option<usize>,
    mix: Option<DifficultyMix>,
    seed: Option<u64>,
    output: PathBuf,
) -> Result<()> {
    let doc = parse_document(&bank_path)?;
    anyhow::ensure!(
        !doc.quiz.questions.is_empty(),
        "bank '{}' has no questions",
        doc.quiz.id
    );

    let mut spec = doc.exam.unwrap_or_default();
    if let Some(count) = count {
        spec.total_questions = count;
    }
    if mix.is_some() {
        spec.difficulty_mix = mix;
    }
    anyhow::ensure!(spec.total_questions > 0, "cannot draw an exam of 0 questions");
    if let Some(mix) = &spec.difficulty_mix {
        mix.validate().map_err(anyhow::Error::msg)?;
    }

    tracing::debug!(
        "drawing {} question(s), mix {}",
        spec.total_questions,
        spec.difficulty_mix
            .map(|m| m.to_string())
            .unwrap_or_else(|| "uniform".to_string())
    );

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let exam = assemble_exam(&doc.quiz, &spec, &mut rng);

    let toml = to_toml_string(&exam)?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, toml)
        .with_context(|| format!("failed to write exam to {}", output.display()))?;

    println!(
        "Drew {} of {} question(s) from '{}' into {}",
        exam.questions.len(),
        doc.quiz.questions.len(),
        doc.quiz.title,
        output.display()
    );

    Ok(())
}
