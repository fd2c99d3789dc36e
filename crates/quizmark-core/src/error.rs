//! Quiz error types.
//!
//! Configuration problems are detected once, when a session is created.
//! Everything after that is a caller misusing a live session.

use thiserror::Error;

use crate::model::QuestionId;

/// Errors raised by quiz sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The question data or pass threshold is malformed.
    #[error("invalid quiz configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The session was already submitted and is read-only.
    #[error("session already submitted")]
    SessionClosed,

    /// No question with this id exists in the session.
    #[error("unknown question: {0}")]
    UnknownQuestion(QuestionId),

    /// The selected option does not exist for this question.
    #[error("option {index} out of range for question {question} ({options} options)")]
    OptionOutOfRange {
        question: QuestionId,
        index: usize,
        options: usize,
    },
}

impl QuizError {
    /// Returns `true` if this error comes from malformed quiz data rather than
    /// from how a session was driven.
    pub fn is_configuration(&self) -> bool {
        matches!(self, QuizError::InvalidConfiguration(_))
    }
}

/// The specific way a quiz configuration is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("quiz has no questions")]
    EmptyQuiz,

    #[error("question {question} has {count} option(s), at least 2 required")]
    TooFewOptions { question: QuestionId, count: usize },

    #[error("question {question} marks option {index} correct but has only {options} options")]
    CorrectIndexOutOfRange {
        question: QuestionId,
        index: usize,
        options: usize,
    },

    #[error("passing score {0} is outside 0..=100")]
    PassingScoreOutOfRange(u8),

    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(QuestionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_classified() {
        let err: QuizError = ConfigError::EmptyQuiz.into();
        assert!(err.is_configuration());
        assert!(!QuizError::SessionClosed.is_configuration());
    }

    #[test]
    fn messages_name_the_question() {
        let err = QuizError::from(ConfigError::CorrectIndexOutOfRange {
            question: QuestionId::Number(3),
            index: 4,
            options: 4,
        });
        let msg = err.to_string();
        assert!(msg.contains("invalid quiz configuration"));
        assert!(msg.contains("question 3"));
    }
}
