//! Streak scoring and aggregate statistics.
//!
//! A correct answer is worth its base points plus a bonus of
//! `STREAK_BONUS` for every correct answer immediately before it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, QuestionBank, QuizSummary};

/// Bonus points per answer in the current streak.
pub const STREAK_BONUS: u32 = 2;

/// Points for a correct answer given the streak *before* this answer.
///
/// Saturates at `u32::MAX`.
pub fn award_points(base: u32, streak: u32) -> u32 {
    base.saturating_add(STREAK_BONUS.saturating_mul(streak))
}

/// Best achievable score: every question answered correctly in a row.
///
/// Saturates at `u32::MAX`; see [`checked_max_score`].
pub fn max_possible_score(bank: &QuestionBank) -> u32 {
    checked_max_score(bank).unwrap_or(u32::MAX)
}

/// Like [`max_possible_score`], but `None` if a perfect run does not fit in a `u32`.
pub fn checked_max_score(bank: &QuestionBank) -> Option<u32> {
    bank.questions
        .iter()
        .enumerate()
        .try_fold(0u32, |total, (i, q)| {
            let bonus = STREAK_BONUS.checked_mul(u32::try_from(i).ok()?)?;
            total.checked_add(q.points.checked_add(bonus)?)
        })
}

/// Performance band derived from accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    NeedsPractice,
}

impl Grade {
    /// Band an accuracy in `0.0..=1.0`.
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 0.9 {
            Grade::Excellent
        } else if accuracy >= 0.7 {
            Grade::Good
        } else if accuracy >= 0.5 {
            Grade::Fair
        } else {
            Grade::NeedsPractice
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent! You really know your civics.",
            Grade::Good => "Good job! Just a few slips.",
            Grade::Fair => "Not bad, but there is room to improve.",
            Grade::NeedsPractice => "Keep practicing and try again.",
        }
    }
}

/// Answered/correct counts for one difficulty level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyStats {
    pub answered: usize,
    pub correct: usize,
}

/// Derived statistics for a completed quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizStats {
    /// Fraction of questions answered correctly.
    pub accuracy: f64,
    /// Mean time spent per answer, in time units.
    pub avg_time_spent: f64,
    /// Questions where the countdown ran out.
    pub timeouts: usize,
    /// Score as a fraction of `max_possible_score`.
    pub score_ratio: f64,
    pub per_difficulty: HashMap<Difficulty, DifficultyStats>,
    pub grade: Grade,
}

/// Compute statistics for a summary against the bank it was played on.
///
/// Answers whose question id is not in the bank are counted under
/// `Difficulty::Medium`.
pub fn compute_stats(summary: &QuizSummary, bank: &QuestionBank) -> QuizStats {
    let answered = summary.answers.len();
    let accuracy = if summary.total_questions == 0 {
        0.0
    } else {
        summary.correct_answers as f64 / summary.total_questions as f64
    };

    let avg_time_spent = if answered == 0 {
        0.0
    } else {
        summary.time_spent as f64 / answered as f64
    };

    let timeouts = summary.answers.iter().filter(|a| a.timed_out()).count();

    let max = max_possible_score(bank);
    let score_ratio = if max == 0 {
        0.0
    } else {
        (summary.score as f64 / max as f64).min(1.0)
    };

    let mut per_difficulty: HashMap<Difficulty, DifficultyStats> = HashMap::new();
    for answer in &summary.answers {
        let difficulty = bank
            .find(answer.question_id)
            .map(|q| q.difficulty)
            .unwrap_or_default();
        let entry = per_difficulty.entry(difficulty).or_default();
        entry.answered += 1;
        if answer.is_correct {
            entry.correct += 1;
        }
    }

    QuizStats {
        accuracy,
        avg_time_spent,
        timeouts,
        score_ratio,
        per_difficulty,
        grade: Grade::from_accuracy(accuracy),
    }
}
