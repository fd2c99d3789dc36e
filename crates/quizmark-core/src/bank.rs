//! Question banks and mock-exam assembly.
//!
//! A bank is a large pool of tagged questions from which shorter quizzes are
//! drawn, either uniformly, by difficulty mix, or balanced across categories.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, Question, Quiz};

/// Target share of each difficulty tier, in percent. Must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyMix {
    pub basic: u8,
    pub intermediate: u8,
    pub advanced: u8,
}

impl Default for DifficultyMix {
    fn default() -> Self {
        Self {
            basic: 40,
            intermediate: 45,
            advanced: 15,
        }
    }
}

impl DifficultyMix {
    pub fn new(basic: u8, intermediate: u8, advanced: u8) -> Result<Self, String> {
        let mix = Self {
            basic,
            intermediate,
            advanced,
        };
        mix.validate()?;
        Ok(mix)
    }

    pub fn validate(&self) -> Result<(), String> {
        let sum = u32::from(self.basic) + u32::from(self.intermediate) + u32::from(self.advanced);
        if sum != 100 {
            return Err(format!("difficulty mix must sum to 100, got {sum}"));
        }
        Ok(())
    }

    /// Question counts per tier for a draw of `count`.
    ///
    /// Basic and intermediate are rounded to nearest; advanced takes the rest.
    pub fn quotas(&self, count: usize) -> [usize; 3] {
        let round = |pct: u8| (count * usize::from(pct) + 50) / 100;
        let basic = round(self.basic).min(count);
        let intermediate = round(self.intermediate).min(count - basic);
        [basic, intermediate, count - basic - intermediate]
    }
}

impl fmt::Display for DifficultyMix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.basic, self.intermediate, self.advanced)
    }
}

impl FromStr for DifficultyMix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<u8>()
                    .map_err(|_| format!("invalid percentage: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [b, i, a] => DifficultyMix::new(*b, *i, *a),
            _ => Err(format!(
                "expected three comma-separated percentages (basic,intermediate,advanced), got '{s}'"
            )),
        }
    }
}

/// Mock-exam settings, read from a bank file's `[exam]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_exam_questions")]
    pub total_questions: usize,
    #[serde(default)]
    pub pass_threshold: Option<u8>,
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
    #[serde(default)]
    pub difficulty_mix: Option<DifficultyMix>,
    /// Spread the draw evenly over these categories, when non-empty.
    #[serde(default)]
    pub categories: Vec<String>,
}

fn default_exam_questions() -> usize {
    30
}

impl Default for ExamSpec {
    fn default() -> Self {
        Self {
            title: None,
            total_questions: default_exam_questions(),
            pass_threshold: None,
            time_limit_secs: None,
            difficulty_mix: None,
            categories: Vec::new(),
        }
    }
}

/// Thresholds used when analyzing a bank.
#[derive(Debug, Clone)]
pub struct BankPolicy {
    pub min_questions: usize,
    /// Section prefixes that must each have at least one question.
    pub expected_sections: Vec<String>,
    pub basic_range: (f64, f64),
    pub intermediate_range: (f64, f64),
    pub advanced_range: (f64, f64),
}

impl Default for BankPolicy {
    fn default() -> Self {
        Self {
            min_questions: 0,
            expected_sections: Vec::new(),
            basic_range: (30.0, 50.0),
            intermediate_range: (35.0, 55.0),
            advanced_range: (10.0, 25.0),
        }
    }
}

/// Distribution of a bank's questions and any policy issues found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankReport {
    pub total: usize,
    pub sections: BTreeMap<String, usize>,
    pub difficulties: BTreeMap<Difficulty, usize>,
    pub categories: BTreeMap<String, usize>,
    pub issues: Vec<String>,
}

impl BankReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A pool of questions to draw quizzes from.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self::new(quiz.questions.clone())
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions whose section starts with `prefix` ("5.1" matches "5.1.2").
    pub fn by_section(&self, prefix: &str) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.section.as_deref().is_some_and(|s| s.starts_with(prefix)))
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.category.as_deref() == Some(category))
            .collect()
    }

    pub fn by_difficulty(&self, difficulty: Difficulty) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.difficulty == Some(difficulty))
            .collect()
    }

    /// Up to `count` distinct questions chosen uniformly, in random order.
    pub fn draw<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Question> {
        let mut picked: Vec<&Question> = self.questions.choose_multiple(rng, count).collect();
        picked.shuffle(rng);
        picked.into_iter().cloned().collect()
    }

    /// Draw `count` questions following a difficulty mix.
    ///
    /// Tiers that run short are back-filled from the rest of the bank.
    pub fn draw_weighted<R: Rng + ?Sized>(
        &self,
        count: usize,
        mix: DifficultyMix,
        rng: &mut R,
    ) -> Vec<Question> {
        let pool: Vec<&Question> = self.questions.iter().collect();
        let mut picked = weighted(&pool, count, mix, rng);
        picked.shuffle(rng);
        picked.into_iter().cloned().collect()
    }

    /// Draw a fixed number of questions from each listed category.
    pub fn draw_by_topic<R: Rng + ?Sized>(
        &self,
        topics: &[(String, usize)],
        rng: &mut R,
    ) -> Vec<Question> {
        let mut picked: Vec<&Question> = Vec::new();
        for (category, count) in topics {
            let pool = unpicked(self.by_category(category), &picked);
            if pool.len() < *count {
                tracing::warn!(
                    "category '{}' has {} question(s), {} requested",
                    category,
                    pool.len(),
                    count
                );
            }
            picked.extend(pool.choose_multiple(rng, *count).copied());
        }
        picked.shuffle(rng);
        picked.into_iter().cloned().collect()
    }

    /// Draw `count` questions spread evenly across `categories`.
    ///
    /// Earlier categories absorb the remainder. Within each category the
    /// optional difficulty mix applies. Shortfalls are back-filled from the
    /// whole bank.
    pub fn draw_balanced<R: Rng + ?Sized>(
        &self,
        count: usize,
        categories: &[String],
        mix: Option<DifficultyMix>,
        rng: &mut R,
    ) -> Vec<Question> {
        if categories.is_empty() {
            return match mix {
                Some(mix) => self.draw_weighted(count, mix, rng),
                None => self.draw(count, rng),
            };
        }

        let base = count / categories.len();
        let remainder = count % categories.len();
        let mut picked: Vec<&Question> = Vec::new();

        for (i, category) in categories.iter().enumerate() {
            let target = base + usize::from(i < remainder);
            let pool = unpicked(self.by_category(category), &picked);
            if pool.is_empty() {
                tracing::warn!("no questions in category '{category}'");
                continue;
            }
            match mix {
                Some(mix) => picked.extend(weighted(&pool, target, mix, rng)),
                None => picked.extend(pool.choose_multiple(rng, target).copied()),
            }
        }

        backfill(&mut picked, &self.questions, count, rng);
        picked.shuffle(rng);
        picked.truncate(count);
        picked.into_iter().cloned().collect()
    }

    /// Summarize the bank and check it against `policy`.
    pub fn analyze(&self, policy: &BankPolicy) -> BankReport {
        let mut sections = BTreeMap::new();
        let mut difficulties = BTreeMap::new();
        let mut categories = BTreeMap::new();

        for q in &self.questions {
            if let Some(s) = &q.section {
                *sections.entry(s.clone()).or_insert(0) += 1;
            }
            if let Some(d) = q.difficulty {
                *difficulties.entry(d).or_insert(0) += 1;
            }
            if let Some(c) = &q.category {
                *categories.entry(c.clone()).or_insert(0) += 1;
            }
        }

        let total = self.questions.len();
        let mut issues = Vec::new();

        if total < policy.min_questions {
            issues.push(format!(
                "insufficient questions: {total} (minimum {})",
                policy.min_questions
            ));
        }

        for expected in &policy.expected_sections {
            if self.by_section(expected).is_empty() {
                issues.push(format!("no questions found for section {expected}"));
            }
        }

        if !difficulties.is_empty() && total > 0 {
            let ranges = [
                (Difficulty::Basic, policy.basic_range),
                (Difficulty::Intermediate, policy.intermediate_range),
                (Difficulty::Advanced, policy.advanced_range),
            ];
            for (difficulty, (low, high)) in ranges {
                let n = difficulties.get(&difficulty).copied().unwrap_or(0);
                let pct = n as f64 / total as f64 * 100.0;
                if pct < low || pct > high {
                    issues.push(format!(
                        "{difficulty} questions at {pct:.1}% (recommended {low:.0}-{high:.0}%)"
                    ));
                }
            }
        }

        BankReport {
            total,
            sections,
            difficulties,
            categories,
            issues,
        }
    }
}

fn weighted<'a, R: Rng + ?Sized>(
    pool: &[&'a Question],
    count: usize,
    mix: DifficultyMix,
    rng: &mut R,
) -> Vec<&'a Question> {
    let mut picked: Vec<&Question> = Vec::new();
    for (difficulty, quota) in Difficulty::ALL.into_iter().zip(mix.quotas(count)) {
        let tier: Vec<&Question> = pool
            .iter()
            .copied()
            .filter(|q| q.difficulty == Some(difficulty))
            .collect();
        picked.extend(tier.choose_multiple(rng, quota).copied());
    }
    backfill_refs(&mut picked, pool, count, rng);
    picked
}

/// `pool` without the questions already in `picked`.
fn unpicked<'a>(pool: Vec<&'a Question>, picked: &[&Question]) -> Vec<&'a Question> {
    pool.into_iter()
        .filter(|q| !picked.iter().any(|p| std::ptr::eq(*p, *q)))
        .collect()
}

fn backfill_refs<'a, R: Rng + ?Sized>(
    picked: &mut Vec<&'a Question>,
    pool: &[&'a Question],
    count: usize,
    rng: &mut R,
) {
    if picked.len() >= count {
        return;
    }
    let remaining: Vec<&Question> = pool
        .iter()
        .copied()
        .filter(|q| !picked.iter().any(|p| std::ptr::eq(*p, *q)))
        .collect();
    let needed = count - picked.len();
    picked.extend(remaining.choose_multiple(rng, needed).copied());
}

fn backfill<'a, R: Rng + ?Sized>(
    picked: &mut Vec<&'a Question>,
    pool: &'a [Question],
    count: usize,
    rng: &mut R,
) {
    let refs: Vec<&Question> = pool.iter().collect();
    backfill_refs(picked, &refs, count, rng);
}

/// Assemble a mock exam from a bank quiz.
pub fn assemble_exam<R: Rng + ?Sized>(bank_quiz: &Quiz, spec: &ExamSpec, rng: &mut R) -> Quiz {
    let bank = QuestionBank::from_quiz(bank_quiz);
    if bank.len() < spec.total_questions {
        tracing::warn!(
            "bank '{}' has {} question(s), exam wants {}",
            bank_quiz.id,
            bank.len(),
            spec.total_questions
        );
    }

    let questions = bank.draw_balanced(
        spec.total_questions,
        &spec.categories,
        spec.difficulty_mix,
        rng,
    );

    Quiz {
        id: format!("{}-exam", bank_quiz.id),
        title: spec
            .title
            .clone()
            .unwrap_or_else(|| format!("{} Mock Examination", bank_quiz.title)),
        description: bank_quiz.description.clone(),
        passing_score: spec.pass_threshold.or(bank_quiz.passing_score),
        time_limit_secs: spec.time_limit_secs.or(bank_quiz.time_limit_secs),
        questions,
    }
}
