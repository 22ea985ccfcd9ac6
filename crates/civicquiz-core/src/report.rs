//! Quiz reports with JSON persistence and per-answer review.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerRecord, QuestionBank, QuizSummary};
use crate::scoring::{compute_stats, QuizStats};
use crate::traits::SubmissionResponse;

/// A saved quiz run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the bank that was played.
    pub bank: BankSummary,
    /// Signed-in user, if any.
    #[serde(default)]
    pub user_id: Option<String>,
    /// The locally computed result.
    pub summary: QuizSummary,
    /// Derived statistics.
    pub stats: QuizStats,
    /// Per-answer review.
    pub review: Vec<ReviewEntry>,
    /// What the scoring service awarded, if the submission succeeded.
    #[serde(default)]
    pub remote: Option<SubmissionResponse>,
}

/// Summary of a question bank (without the questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub quiz_type: String,
    pub question_count: usize,
}

/// How a single question went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Wrong,
    TimedOut,
}

impl AnswerOutcome {
    pub fn of(record: &AnswerRecord) -> Self {
        if record.is_correct {
            AnswerOutcome::Correct
        } else if record.timed_out() {
            AnswerOutcome::TimedOut
        } else {
            AnswerOutcome::Wrong
        }
    }
}

impl fmt::Display for AnswerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerOutcome::Correct => write!(f, "correct"),
            AnswerOutcome::Wrong => write!(f, "wrong"),
            AnswerOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}

/// One row of the post-quiz review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub question_id: u32,
    pub prompt: String,
    /// Text of the chosen option; `None` on timeout.
    pub selected: Option<String>,
    pub correct: String,
    pub explanation: String,
    pub outcome: AnswerOutcome,
    pub points: u32,
    pub time_spent: u32,
}

impl QuizReport {
    /// Build a report for a completed run.
    pub fn new(
        bank: &QuestionBank,
        summary: QuizSummary,
        user_id: Option<String>,
        remote: Option<SubmissionResponse>,
    ) -> Self {
        let stats = compute_stats(&summary, bank);
        let review = summary
            .answers
            .iter()
            .map(|answer| {
                let question = bank.find(answer.question_id);
                ReviewEntry {
                    question_id: answer.question_id,
                    prompt: question.map(|q| q.prompt.clone()).unwrap_or_default(),
                    selected: answer.selected_answer.and_then(|i| {
                        question.and_then(|q| q.options.get(i)).cloned()
                    }),
                    correct: question
                        .and_then(|q| q.correct_option())
                        .unwrap_or_default()
                        .to_string(),
                    explanation: question.map(|q| q.explanation.clone()).unwrap_or_default(),
                    outcome: AnswerOutcome::of(answer),
                    points: answer.points,
                    time_spent: answer.time_spent,
                }
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank: BankSummary {
                id: bank.id.clone(),
                name: bank.name.clone(),
                quiz_type: bank.quiz_type.clone(),
                question_count: bank.len(),
            },
            user_id,
            summary,
            stats,
            review,
            remote,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
