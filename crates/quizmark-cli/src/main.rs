//! quizmark CLI: take, grade and manage multiple-choice quizzes.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use quizmark_core::bank::DifficultyMix;

mod commands;

#[derive(Parser)]
#[command(
    name = "quizmark",
    version,
    about = "Multiple-choice quiz engine and grader"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz interactively in the terminal
    Take {
        /// Path to a .toml quiz file
        #[arg(long)]
        quiz: PathBuf,

        /// Shuffle question order
        #[arg(long)]
        shuffle: bool,

        /// Seed for a reproducible shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for the attempt report (default: output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade an answer sheet against a quiz
    Grade {
        /// Path to a .toml quiz file
        #[arg(long)]
        quiz: PathBuf,

        /// Answer sheet (.json or .toml) mapping question id to option index
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Also save the attempt report (and HTML page) in this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit code 1 if the attempt did not pass
        #[arg(long)]
        require_pass: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        quiz: PathBuf,

        /// Also print the question-bank distribution report
        #[arg(long)]
        bank: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Draw a mock exam from a question bank
    Draw {
        /// Path to the bank's .toml file
        #[arg(long)]
        bank: PathBuf,

        /// Number of questions (default: the bank's [exam] table, else 30)
        #[arg(long)]
        count: Option<usize>,

        /// Difficulty mix as basic,intermediate,advanced percentages (e.g. "40,45,15")
        #[arg(long)]
        mix: Option<DifficultyMix>,

        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,

        /// Where to write the drawn quiz
        #[arg(long)]
        output: PathBuf,
    },

    /// Aggregate statistics over saved attempt reports
    Summarize {
        /// Directory of attempt report JSON files
        #[arg(long)]
        reports: PathBuf,
    },

    /// Create starter config and example quiz
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizmark=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            quiz,
            shuffle,
            seed,
            output,
            config,
        } => commands::take::execute(quiz, shuffle, seed, output, config),
        Commands::Grade {
            quiz,
            answers,
            format,
            output,
            require_pass,
            config,
        } => commands::grade::execute(quiz, answers, format, output, require_pass, config),
        Commands::Validate { quiz, bank, config } => {
            commands::validate::execute(quiz, bank, config)
        }
        Commands::Draw {
            bank,
            count,
            mix,
            seed,
            output,
        } => commands::draw::execute(bank, count, mix, seed, output),
        Commands::Summarize { reports } => commands::summarize::execute(reports),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
