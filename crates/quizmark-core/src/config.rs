//! quizmark configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::SessionConfig;

/// Top-level quizmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizmarkConfig {
    /// Pass mark for quizzes that do not set their own.
    #[serde(default = "default_passing_score")]
    pub default_passing_score: u8,
    /// Shuffle question order for every attempt.
    #[serde(default)]
    pub shuffle_questions: bool,
    /// Fixed seed for shuffles and bank draws.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Output directory for attempt reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_passing_score() -> u8 {
    70
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizmark-results")
}

impl Default for QuizmarkConfig {
    fn default() -> Self {
        Self {
            default_passing_score: default_passing_score(),
            shuffle_questions: false,
            seed: None,
            output_dir: default_output_dir(),
        }
    }
}

impl QuizmarkConfig {
    /// Session options derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            title: None,
            shuffle_questions: self.shuffle_questions,
            seed: self.seed,
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizmark.toml` in the current directory
/// 2. `~/.config/quizmark/config.toml`
///
/// Environment variable overrides: `QUIZMARK_PASSING_SCORE`, `QUIZMARK_OUTPUT_DIR`.
pub fn load_config() -> Result<QuizmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizmark.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => QuizmarkConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    anyhow::ensure!(
        config.default_passing_score <= 100,
        "default_passing_score must be between 0 and 100, got {}",
        config.default_passing_score
    );

    Ok(config)
}

/// Parse configuration TOML.
pub fn parse_config(content: &str) -> Result<QuizmarkConfig> {
    Ok(toml::from_str(content)?)
}

fn apply_env_overrides(
    config: &mut QuizmarkConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(score) = lookup("QUIZMARK_PASSING_SCORE") {
        config.default_passing_score = score
            .trim()
            .parse()
            .with_context(|| format!("invalid QUIZMARK_PASSING_SCORE: '{score}'"))?;
    }
    if let Some(dir) = lookup("QUIZMARK_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmark"))
}
