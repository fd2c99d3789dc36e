//! Scoring rules and aggregate statistics.
//!
//! The pass rule is evaluated in integers so that a score sitting exactly on
//! the threshold always passes.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::QuestionId;
use crate::report::AttemptReport;
use crate::session::QuestionOutcome;

/// Label for questions that carry no category.
pub const UNCATEGORISED: &str = "Uncategorised";

/// `score / total * 100`, or 0 for an empty quiz.
pub fn percentage(score: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (score * 100) as f64 / total as f64
}

/// Whether `score` out of `total` reaches `passing_score` percent (inclusive).
pub fn meets_threshold(score: usize, total: usize, passing_score: u8) -> bool {
    score * 100 >= usize::from(passing_score) * total
}

/// Correct answers within one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
}

/// Group outcomes by category, in order of first appearance.
pub fn category_breakdown(outcomes: &[QuestionOutcome]) -> Vec<CategoryScore> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for o in outcomes {
        let category = o
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORISED.to_string());
        let entry = counts.entry(category.clone()).or_insert_with(|| {
            order.push(category);
            (0, 0)
        });
        entry.1 += 1;
        if o.correct {
            entry.0 += 1;
        }
    }

    order
        .into_iter()
        .map(|category| {
            let (correct, total) = counts[&category];
            CategoryScore {
                category,
                correct,
                total,
                percentage: percentage(correct, total),
            }
        })
        .collect()
}

/// How often one question was answered correctly across attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionFacility {
    pub question: QuestionId,
    pub attempts: usize,
    pub correct: usize,
    /// Fraction of attempts answering correctly (the item's facility index).
    pub facility: f64,
}

/// Statistics for a single quiz across all recorded attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizStats {
    pub quiz_id: String,
    pub title: String,
    pub attempts: usize,
    pub passes: usize,
    pub pass_rate: f64,
    pub mean_percentage: f64,
    pub best_percentage: f64,
    pub worst_percentage: f64,
    /// Per-question facility, hardest first.
    pub questions: Vec<QuestionFacility>,
}

impl QuizStats {
    /// The questions most often answered wrongly.
    pub fn hardest(&self, n: usize) -> &[QuestionFacility] {
        &self.questions[..n.min(self.questions.len())]
    }
}

/// Compute per-quiz statistics from attempt reports, ordered by quiz id.
pub fn compute_quiz_stats(reports: &[AttemptReport]) -> Vec<QuizStats> {
    let mut grouped: BTreeMap<&str, Vec<&AttemptReport>> = BTreeMap::new();
    for r in reports {
        grouped.entry(r.quiz.id.as_str()).or_default().push(r);
    }

    grouped
        .into_iter()
        .map(|(quiz_id, group)| {
            let attempts = group.len();
            let passes = group.iter().filter(|r| r.result.passed).count();
            let percentages: Vec<f64> = group.iter().map(|r| r.result.percentage).collect();
            let mean = percentages.iter().sum::<f64>() / attempts.max(1) as f64;
            let best = percentages.iter().copied().fold(0.0f64, f64::max);
            let worst = percentages.iter().copied().fold(100.0f64, f64::min);

            let mut order: Vec<QuestionId> = Vec::new();
            let mut tally: HashMap<QuestionId, (usize, usize)> = HashMap::new();
            for r in &group {
                for o in &r.outcomes {
                    let entry = tally.entry(o.question.clone()).or_insert_with(|| {
                        order.push(o.question.clone());
                        (0, 0)
                    });
                    entry.0 += 1;
                    if o.correct {
                        entry.1 += 1;
                    }
                }
            }

            let mut questions: Vec<QuestionFacility> = order
                .into_iter()
                .map(|id| {
                    let (seen, correct) = tally[&id];
                    QuestionFacility {
                        question: id,
                        attempts: seen,
                        correct,
                        facility: correct as f64 / seen.max(1) as f64,
                    }
                })
                .collect();
            questions.sort_by(|a, b| a.facility.total_cmp(&b.facility));

            QuizStats {
                quiz_id: quiz_id.to_string(),
                title: group[0].quiz.title.clone(),
                attempts,
                passes,
                pass_rate: passes as f64 / attempts.max(1) as f64,
                mean_percentage: mean,
                best_percentage: best,
                worst_percentage: worst,
                questions,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::QuizSummary;
    use crate::session::QuizResult;
    use chrono::Utc;
    use uuid::Uuid;

    fn outcome(id: u64, correct: bool, category: Option<&str>) -> QuestionOutcome {
        QuestionOutcome {
            question: QuestionId::Number(id),
            prompt: format!("Q{id}"),
            selected: Some(if correct { 0 } else { 1 }),
            correct_index: 0,
            correct,
            explanation: None,
            category: category.map(String::from),
        }
    }

    fn report(quiz: &str, outcomes: Vec<QuestionOutcome>, passing: u8) -> AttemptReport {
        let score = outcomes.iter().filter(|o| o.correct).count();
        let total = outcomes.len();
        AttemptReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            quiz: QuizSummary {
                id: quiz.into(),
                title: quiz.to_uppercase(),
                question_count: total,
                passing_score: passing,
            },
            result: QuizResult {
                score,
                total_questions: total,
                percentage: percentage(score, total),
                passed: meets_threshold(score, total, passing),
            },
            categories: category_breakdown(&outcomes),
            outcomes,
            duration_ms: 0,
            time_limit_secs: None,
            overtime: false,
        }
    }

    #[test]
    fn percentage_handles_empty_and_exact() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(7, 10), 70.0);
        assert_eq!(percentage(3, 4), 75.0);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(meets_threshold(7, 10, 70));
        assert!(!meets_threshold(6, 10, 70));
        assert!(meets_threshold(0, 10, 0));
        assert!(meets_threshold(10, 10, 100));
        assert!(!meets_threshold(9, 10, 100));
    }

    #[test]
    fn breakdown_groups_by_first_appearance() {
        let outcomes = vec![
            outcome(1, true, Some("Safe Isolation")),
            outcome(2, false, None),
            outcome(3, false, Some("Safe Isolation")),
            outcome(4, true, Some("Fault Finding")),
        ];
        let b = category_breakdown(&outcomes);
        assert_eq!(b.len(), 3);
        assert_eq!(b[0].category, "Safe Isolation");
        assert_eq!((b[0].correct, b[0].total), (1, 2));
        assert_eq!(b[0].percentage, 50.0);
        assert_eq!(b[1].category, UNCATEGORISED);
        assert_eq!(b[2].category, "Fault Finding");
    }

    #[test]
    fn stats_aggregate_per_quiz() {
        let reports = vec![
            report(
                "first-aid",
                vec![outcome(1, true, None), outcome(2, false, None)],
                50,
            ),
            report(
                "first-aid",
                vec![outcome(1, true, None), outcome(2, true, None)],
                50,
            ),
            report("coshh", vec![outcome(1, false, None)], 70),
        ];

        let stats = compute_quiz_stats(&reports);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].quiz_id, "coshh");
        assert_eq!(stats[0].passes, 0);

        let fa = &stats[1];
        assert_eq!(fa.attempts, 2);
        assert_eq!(fa.passes, 2);
        assert_eq!(fa.pass_rate, 1.0);
        assert_eq!(fa.mean_percentage, 75.0);
        assert_eq!(fa.best_percentage, 100.0);
        assert_eq!(fa.worst_percentage, 50.0);

        let hardest = &fa.hardest(1)[0];
        assert_eq!(hardest.question, QuestionId::Number(2));
        assert_eq!(hardest.facility, 0.5);
    }
}
