//! The quiz session state machine.
//!
//! A [`QuizSession`] is one learner's attempt at one quiz: it collects a
//! single selected option per question, and on [`QuizSession::submit`]
//! freezes a score and a pass/fail outcome. [`InlineCheck`] is the same
//! machine reduced to one question that submits itself on the first answer.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, QuizError};
use crate::model::{Question, QuestionId, Quiz};
use crate::scoring::{meets_threshold, percentage};

/// Options applied once, when a session is created.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Display title; defaults to an empty string.
    pub title: Option<String>,
    /// Shuffle question order at initialization. Options are never shuffled.
    pub shuffle_questions: bool,
    /// Seed for the shuffle, for reproducible order.
    pub seed: Option<u64>,
}

/// Aggregate outcome of a submitted session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Number of correctly answered questions.
    pub score: usize,
    pub total_questions: usize,
    /// `score / total_questions * 100`.
    pub percentage: f64,
    pub passed: bool,
}

/// Per-question feedback, revealed after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question: QuestionId,
    pub prompt: String,
    /// The learner's choice, `None` if left unanswered.
    pub selected: Option<usize>,
    pub correct_index: usize,
    pub correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Receives the result of a session when it is submitted.
pub trait CompletionHook: Send + Sync {
    fn on_complete(&self, result: &QuizResult);
}

/// No-op completion hook.
pub struct NoopHook;

impl CompletionHook for NoopHook {
    fn on_complete(&self, _: &QuizResult) {}
}

impl<F> CompletionHook for F
where
    F: Fn(&QuizResult) + Send + Sync,
{
    fn on_complete(&self, result: &QuizResult) {
        self(result)
    }
}

/// Collect every configuration problem in a question set.
///
/// An empty result means a session can be created from these questions.
pub fn check_configuration(questions: &[Question], passing_score: u8) -> Vec<ConfigError> {
    let mut issues = Vec::new();

    if passing_score > 100 {
        issues.push(ConfigError::PassingScoreOutOfRange(passing_score));
    }
    if questions.is_empty() {
        issues.push(ConfigError::EmptyQuiz);
    }

    // Answer sheets address questions by id text, so `1` and `"1"` collide.
    let mut seen = HashSet::new();
    for q in questions {
        if !seen.insert(q.id.to_string()) {
            issues.push(ConfigError::DuplicateQuestionId(q.id.clone()));
        }
        if q.options.len() < 2 {
            issues.push(ConfigError::TooFewOptions {
                question: q.id.clone(),
                count: q.options.len(),
            });
        }
        if q.correct_index >= q.options.len() {
            issues.push(ConfigError::CorrectIndexOutOfRange {
                question: q.id.clone(),
                index: q.correct_index,
                options: q.options.len(),
            });
        }
    }

    issues
}

/// One attempt at a quiz.
pub struct QuizSession {
    title: String,
    questions: Vec<Question>,
    passing_score: u8,
    responses: HashMap<QuestionId, usize>,
    result: Option<QuizResult>,
    hook: Arc<dyn CompletionHook>,
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("title", &self.title)
            .field("questions", &self.questions.len())
            .field("passing_score", &self.passing_score)
            .field("responses", &self.responses)
            .field("result", &self.result)
            .finish()
    }
}

impl QuizSession {
    /// Create a fresh, unsubmitted session.
    ///
    /// Fails with [`QuizError::InvalidConfiguration`] if `questions` is empty,
    /// any question has fewer than two options or an out-of-range correct
    /// index, ids repeat, or `passing_score` exceeds 100.
    pub fn initialize(
        mut questions: Vec<Question>,
        passing_score: u8,
        config: SessionConfig,
    ) -> Result<Self, QuizError> {
        if let Some(issue) = check_configuration(&questions, passing_score)
            .into_iter()
            .next()
        {
            return Err(issue.into());
        }

        if config.shuffle_questions {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            questions.shuffle(&mut rng);
        }

        let title = config.title.unwrap_or_default();
        tracing::debug!(
            "session created: '{}' ({} questions, pass at {}%)",
            title,
            questions.len(),
            passing_score
        );

        Ok(Self {
            title,
            questions,
            passing_score,
            responses: HashMap::new(),
            result: None,
            hook: Arc::new(NoopHook),
        })
    }

    /// Create a session for a whole quiz definition.
    ///
    /// The quiz's own passing score wins over `default_passing_score`, and its
    /// title is used unless `config` sets one.
    pub fn from_quiz(
        quiz: &Quiz,
        default_passing_score: u8,
        mut config: SessionConfig,
    ) -> Result<Self, QuizError> {
        if config.title.is_none() {
            config.title = Some(quiz.title.clone());
        }
        Self::initialize(
            quiz.questions.clone(),
            quiz.passing_score_or(default_passing_score),
            config,
        )
    }

    /// Attach a hook that receives the result on submission.
    pub fn with_hook(mut self, hook: Arc<dyn CompletionHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Record `option` as the answer to `question`, replacing any earlier choice.
    ///
    /// Returns [`QuizError::SessionClosed`] without touching any state once the
    /// session has been submitted.
    pub fn select_answer(&mut self, question: &QuestionId, option: usize) -> Result<(), QuizError> {
        if self.result.is_some() {
            return Err(QuizError::SessionClosed);
        }

        let q = self
            .questions
            .iter()
            .find(|q| &q.id == question)
            .ok_or_else(|| QuizError::UnknownQuestion(question.clone()))?;

        if option >= q.options.len() {
            return Err(QuizError::OptionOutOfRange {
                question: question.clone(),
                index: option,
                options: q.options.len(),
            });
        }

        tracing::debug!("question {question}: selected option {option}");
        self.responses.insert(question.clone(), option);
        Ok(())
    }

    /// Submit the session, freezing and returning its result.
    ///
    /// Unanswered questions count as incorrect. A second call returns the
    /// already-frozen result and does not notify the hook again.
    pub fn submit(&mut self) -> QuizResult {
        if let Some(result) = self.result {
            return result;
        }

        let total = self.questions.len();
        let score = self
            .questions
            .iter()
            .filter(|q| self.responses.get(&q.id) == Some(&q.correct_index))
            .count();

        let result = QuizResult {
            score,
            total_questions: total,
            percentage: percentage(score, total),
            passed: meets_threshold(score, total, self.passing_score),
        };
        self.result = Some(result);

        tracing::info!(
            "submitted '{}': {}/{} ({:.1}%) {}",
            self.title,
            score,
            total,
            result.percentage,
            if result.passed { "passed" } else { "failed" }
        );
        self.hook.on_complete(&result);

        result
    }

    /// A new unsubmitted session over the same questions, in the same order.
    pub fn reset(&self) -> QuizSession {
        QuizSession {
            title: self.title.clone(),
            questions: self.questions.clone(),
            passing_score: self.passing_score,
            responses: HashMap::new(),
            result: None,
            hook: Arc::clone(&self.hook),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn passing_score(&self) -> u8 {
        self.passing_score
    }

    /// The learner's current choice for `question`.
    pub fn response(&self, question: &QuestionId) -> Option<usize> {
        self.responses.get(question).copied()
    }

    pub fn responses(&self) -> &HashMap<QuestionId, usize> {
        &self.responses
    }

    pub fn answered_count(&self) -> usize {
        self.responses.len()
    }

    pub fn is_submitted(&self) -> bool {
        self.result.is_some()
    }

    /// The frozen result, once submitted.
    pub fn result(&self) -> Option<QuizResult> {
        self.result
    }

    /// Correctness and explanation for one question. `None` before submission.
    pub fn feedback(&self, question: &QuestionId) -> Option<QuestionOutcome> {
        self.result?;
        let q = self.questions.iter().find(|q| &q.id == question)?;
        Some(self.outcome_for(q))
    }

    /// Feedback for every question in session order. `None` before submission.
    pub fn outcomes(&self) -> Option<Vec<QuestionOutcome>> {
        self.result?;
        Some(self.questions.iter().map(|q| self.outcome_for(q)).collect())
    }

    fn outcome_for(&self, q: &Question) -> QuestionOutcome {
        let selected = self.responses.get(&q.id).copied();
        QuestionOutcome {
            question: q.id.clone(),
            prompt: q.prompt.clone(),
            selected,
            correct_index: q.correct_index,
            correct: selected == Some(q.correct_index),
            explanation: q.explanation.clone(),
            category: q.category.clone(),
        }
    }
}

/// A single-question check that grades itself on the first answer.
#[derive(Debug)]
pub struct InlineCheck {
    session: QuizSession,
}

impl InlineCheck {
    pub fn new(question: Question) -> Result<Self, QuizError> {
        let session = QuizSession::initialize(vec![question], 100, SessionConfig::default())?;
        Ok(Self { session })
    }

    pub fn with_hook(self, hook: Arc<dyn CompletionHook>) -> Self {
        Self {
            session: self.session.with_hook(hook),
        }
    }

    pub fn question(&self) -> &Question {
        &self.session.questions()[0]
    }

    /// Answer the check; it is submitted immediately.
    pub fn select(&mut self, option: usize) -> Result<QuizResult, QuizError> {
        let id = self.question().id.clone();
        self.session.select_answer(&id, option)?;
        Ok(self.session.submit())
    }

    pub fn is_answered(&self) -> bool {
        self.session.is_submitted()
    }

    pub fn selected(&self) -> Option<usize> {
        self.session.response(&self.question().id)
    }

    /// `Some(true)` if answered correctly, `None` while unanswered.
    pub fn is_correct(&self) -> Option<bool> {
        self.session.result().map(|r| r.passed)
    }

    /// The explanation, visible only once answered.
    pub fn explanation(&self) -> Option<&str> {
        if !self.is_answered() {
            return None;
        }
        self.question().explanation.as_deref()
    }

    /// Clear the answer so the learner can try again.
    pub fn retry(&mut self) {
        self.session = self.session.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn question(id: u64, correct: usize) -> Question {
        Question::new(
            id,
            format!("Question {id}"),
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct,
        )
        .with_explanation(format!("Because of reason {id}"))
    }

    fn questions(n: u64) -> Vec<Question> {
        (1..=n).map(|i| question(i, (i % 4) as usize)).collect()
    }

    fn session(n: u64, passing: u8) -> QuizSession {
        QuizSession::initialize(questions(n), passing, SessionConfig::default()).unwrap()
    }

    fn answer_correctly(s: &mut QuizSession, count: usize) {
        let qs: Vec<_> = s.questions().iter().take(count).cloned().collect();
        for q in qs {
            s.select_answer(&q.id, q.correct_index).unwrap();
        }
    }

    fn answer_wrongly(s: &mut QuizSession, q: &Question) {
        let wrong = (q.correct_index + 1) % q.options.len();
        s.select_answer(&q.id, wrong).unwrap();
    }

    #[test]
    fn fresh_session_is_open_and_empty() {
        let s = session(4, 80);
        assert!(!s.is_submitted());
        assert_eq!(s.answered_count(), 0);
        assert!(s.result().is_none());
        assert!(s.outcomes().is_none());
        assert!(s.feedback(&QuestionId::Number(1)).is_none());
    }

    #[test]
    fn three_of_four_fails_at_eighty() {
        let mut s = session(4, 80);
        answer_correctly(&mut s, 3);
        let last = s.questions()[3].clone();
        answer_wrongly(&mut s, &last);

        let r = s.submit();
        assert_eq!(r.score, 3);
        assert_eq!(r.total_questions, 4);
        assert_eq!(r.percentage, 75.0);
        assert!(!r.passed);
    }

    #[test]
    fn four_of_four_passes() {
        let mut s = session(4, 80);
        answer_correctly(&mut s, 4);
        let r = s.submit();
        assert_eq!(r.score, 4);
        assert_eq!(r.percentage, 100.0);
        assert!(r.passed);
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut s = session(10, 70);
        answer_correctly(&mut s, 7);
        let r = s.submit();
        assert_eq!(r.percentage, 70.0);
        assert!(r.passed);
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = QuizSession::initialize(vec![], 70, SessionConfig::default()).unwrap_err();
        assert_eq!(err, QuizError::InvalidConfiguration(ConfigError::EmptyQuiz));
    }

    #[test]
    fn last_selection_wins() {
        let mut s = session(4, 80);
        let id = QuestionId::Number(1);
        s.select_answer(&id, 0).unwrap();
        s.select_answer(&id, 2).unwrap();
        assert_eq!(s.response(&id), Some(2));
        assert_eq!(s.answered_count(), 1);
    }

    #[test]
    fn malformed_questions_are_rejected() {
        let mut bad_index = question(1, 0);
        bad_index.correct_index = 4;
        let err = QuizSession::initialize(vec![bad_index], 70, SessionConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidConfiguration(ConfigError::CorrectIndexOutOfRange { index: 4, .. })
        ));

        let one_option = Question::new(1u64, "Only one?", vec!["Yes".into()], 0);
        let err = QuizSession::initialize(vec![one_option], 70, SessionConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidConfiguration(ConfigError::TooFewOptions { count: 1, .. })
        ));

        let err = QuizSession::initialize(questions(2), 101, SessionConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidConfiguration(ConfigError::PassingScoreOutOfRange(101))
        );

        let dupes = vec![question(1, 0), question(1, 1)];
        let err = QuizSession::initialize(dupes, 70, SessionConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidConfiguration(ConfigError::DuplicateQuestionId(_))
        ));
    }

    #[test]
    fn numeric_and_text_ids_with_same_text_collide() {
        let qs = vec![
            Question::new(1u64, "A?", vec!["x".into(), "y".into()], 0),
            Question::new("1", "B?", vec!["x".into(), "y".into()], 1),
        ];
        let err = QuizSession::initialize(qs, 50, SessionConfig::default()).unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidConfiguration(ConfigError::DuplicateQuestionId(QuestionId::Text(
                "1".into()
            )))
        );
    }

    #[test]
    fn check_configuration_reports_every_issue() {
        let mut qs = vec![question(1, 0), question(1, 1)];
        qs[1].options.truncate(1);
        let issues = check_configuration(&qs, 120);
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn select_rejects_unknown_question_and_option() {
        let mut s = session(2, 50);
        assert_eq!(
            s.select_answer(&QuestionId::Number(9), 0),
            Err(QuizError::UnknownQuestion(QuestionId::Number(9)))
        );
        assert!(matches!(
            s.select_answer(&QuestionId::Number(1), 4),
            Err(QuizError::OptionOutOfRange { index: 4, options: 4, .. })
        ));
        assert_eq!(s.answered_count(), 0);
    }

    #[test]
    fn submitted_session_is_frozen() {
        let mut s = session(4, 50);
        answer_correctly(&mut s, 2);
        let first = s.submit();

        let id = s.questions()[3].id.clone();
        let correct = s.questions()[3].correct_index;
        assert_eq!(s.select_answer(&id, correct), Err(QuizError::SessionClosed));
        assert_eq!(s.response(&id), None);
        assert_eq!(s.submit(), first);
        assert_eq!(s.result(), Some(first));
    }

    #[test]
    fn unanswered_submission_scores_zero() {
        let mut s = session(5, 0);
        let r = s.submit();
        assert_eq!(r.score, 0);
        assert_eq!(r.percentage, 0.0);
        // 0 >= 0
        assert!(r.passed);

        let mut s = session(5, 1);
        assert!(!s.submit().passed);
    }

    #[test]
    fn all_correct_passes_any_threshold() {
        for passing in [0u8, 1, 50, 99, 100] {
            let mut s = session(6, passing);
            answer_correctly(&mut s, 6);
            let r = s.submit();
            assert_eq!(r.score, 6);
            assert!(r.passed, "should pass at {passing}%");
        }
    }

    #[test]
    fn boundary_holds_for_awkward_ratios() {
        // 1/3 * 100 is not representable exactly; 2/3 of 3 must still pass at 66.
        let mut s = session(3, 66);
        answer_correctly(&mut s, 2);
        assert!(s.submit().passed);

        let mut s = session(3, 67);
        answer_correctly(&mut s, 2);
        assert!(!s.submit().passed);
    }

    #[test]
    fn reset_starts_over_with_same_questions() {
        let mut s = session(4, 80);
        answer_correctly(&mut s, 4);
        s.submit();

        let mut retry = s.reset();
        assert!(!retry.is_submitted());
        assert_eq!(retry.answered_count(), 0);
        assert_eq!(retry.questions(), s.questions());
        assert_eq!(retry.passing_score(), 80);

        let a = retry.submit();
        let b = retry.reset().submit();
        assert_eq!(a, b);
        assert_eq!(a.score, 0);
    }

    #[test]
    fn outcomes_reveal_correctness_and_explanations() {
        let mut s = session(2, 50);
        s.select_answer(&QuestionId::Number(1), 1).unwrap();
        s.submit();

        let outcomes = s.outcomes().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].correct);
        assert_eq!(outcomes[0].selected, Some(1));
        assert_eq!(outcomes[1].selected, None);
        assert!(!outcomes[1].correct);
        assert_eq!(
            s.feedback(&QuestionId::Number(2)).unwrap().explanation.as_deref(),
            Some("Because of reason 2")
        );
    }

    #[test]
    fn hook_fires_once_and_survives_reset() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let hook = move |_: &QuizResult| {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        let mut s = session(2, 50).with_hook(Arc::new(hook));
        s.submit();
        s.submit();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        s.reset().submit();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn hook_receives_result() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut s = session(4, 80).with_hook(Arc::new(move |r: &QuizResult| {
            *sink.lock().unwrap() = Some(*r);
        }));
        answer_correctly(&mut s, 4);
        let r = s.submit();
        assert_eq!(*seen.lock().unwrap(), Some(r));
    }

    #[test]
    fn seeded_shuffle_is_reproducible_and_keeps_options() {
        let config = SessionConfig {
            shuffle_questions: true,
            seed: Some(42),
            ..Default::default()
        };
        let a = QuizSession::initialize(questions(20), 70, config.clone()).unwrap();
        let b = QuizSession::initialize(questions(20), 70, config).unwrap();
        assert_eq!(a.questions(), b.questions());

        let mut ids: Vec<_> = a.questions().iter().map(|q| q.id.clone()).collect();
        ids.sort();
        let expected: Vec<_> = (1..=20u64).map(QuestionId::Number).collect();
        assert_eq!(ids, expected);
        assert!(a
            .questions()
            .iter()
            .all(|q| q.options == vec!["A", "B", "C", "D"]));

        // Reset keeps the shuffled order.
        assert_eq!(a.reset().questions(), a.questions());
    }

    #[test]
    fn from_quiz_uses_quiz_threshold_and_title() {
        let quiz = Quiz {
            id: "s1".into(),
            title: "Section 1 Knowledge Check".into(),
            description: String::new(),
            passing_score: Some(80),
            time_limit_secs: None,
            questions: questions(4),
        };
        let s = QuizSession::from_quiz(&quiz, 70, SessionConfig::default()).unwrap();
        assert_eq!(s.passing_score(), 80);
        assert_eq!(s.title(), "Section 1 Knowledge Check");
    }

    #[test]
    fn inline_check_grades_on_select() {
        let q = Question::new(
            "fa-regulations-1981",
            "Which legislation requires first aid provision?",
            vec![
                "Management Regulations 1999".into(),
                "First-Aid Regulations 1981".into(),
                "HASAWA 1974".into(),
            ],
            1,
        )
        .with_explanation("The Health and Safety (First-Aid) Regulations 1981.");
        let mut check = InlineCheck::new(q).unwrap();
        assert!(check.explanation().is_none());
        assert_eq!(check.is_correct(), None);

        let r = check.select(1).unwrap();
        assert!(r.passed);
        assert_eq!(r.score, 1);
        assert_eq!(check.is_correct(), Some(true));
        assert!(check.explanation().unwrap().contains("1981"));
        assert_eq!(check.select(0), Err(QuizError::SessionClosed));
        assert_eq!(check.selected(), Some(1));

        check.retry();
        assert!(!check.is_answered());
        assert!(!check.select(2).unwrap().passed);
        assert_eq!(check.is_correct(), Some(false));
        assert!(check.explanation().is_some());
    }
}
