//! quizmark-core: Quiz session engine, scoring, and question banks.
//!
//! This crate defines the question data model, the session state machine
//! that collects and grades answers, and the tooling around it: TOML quiz
//! files, question-bank draws, attempt reports and configuration.

pub mod bank;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;

pub use error::{ConfigError, QuizError};
pub use model::{Difficulty, Question, QuestionId, Quiz};
pub use session::{InlineCheck, QuizResult, QuizSession, SessionConfig};
