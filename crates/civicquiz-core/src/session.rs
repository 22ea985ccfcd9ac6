//! The quiz session state machine.
//!
//! `QuizSession` owns all per-run state and exposes pure, synchronous
//! transitions. It knows nothing about wall-clock time or rendering: the
//! runner in [`crate::engine`] feeds it ticks and player input.
//!
//! ```text
//! NotStarted --start--> Answering --answer/tick(0)--> Revealing --advance--> Answering
//!                                                          \--advance (last)--> Completed
//! any --reset--> NotStarted
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::QuizError;
use crate::model::{AnswerRecord, Question, QuestionBank, QuizSummary};
use crate::scoring::award_points;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress(Step),
    Completed,
}

/// Sub-state of the current question while a session is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Waiting for an answer; the countdown is running.
    Answering,
    /// The answer was recorded and its correctness is being shown.
    Revealing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not started"),
            Phase::InProgress(Step::Answering) => write!(f, "answering"),
            Phase::InProgress(Step::Revealing) => write!(f, "revealing"),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

/// Result of one countdown tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Time units left on the current question.
    Remaining(u32),
    /// The countdown reached zero and the question was auto-submitted.
    TimedOut(AnswerRecord),
}

/// Result of leaving the reveal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the question at this index.
    Next(usize),
    /// That was the last question.
    Completed(QuizSummary),
}

/// A single play-through of a question bank.
#[derive(Debug, Clone)]
pub struct QuizSession {
    bank: Arc<QuestionBank>,
    time_limit: u32,
    phase: Phase,
    index: usize,
    score: u32,
    streak: u32,
    best_streak: u32,
    time_left: u32,
    answers: Vec<AnswerRecord>,
}

impl QuizSession {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        let time_limit = bank.time_limit_secs.max(1);
        Self {
            bank,
            time_limit,
            phase: Phase::NotStarted,
            index: 0,
            score: 0,
            streak: 0,
            best_streak: 0,
            time_left: time_limit,
            answers: Vec::new(),
        }
    }

    /// Override the bank's countdown length. Zero is clamped to one.
    pub fn with_time_limit(mut self, time_limit: u32) -> Self {
        self.time_limit = time_limit.max(1);
        self.time_left = self.time_limit;
        self
    }

    /// Begin a fresh run at question 0.
    ///
    /// Valid from `NotStarted` and from `Completed` (a restart).
    pub fn start(&mut self) -> Result<&Question, QuizError> {
        if let Phase::InProgress(_) = self.phase {
            return Err(QuizError::invalid("start", self.phase));
        }
        if self.bank.is_empty() {
            return Err(QuizError::EmptyBank(self.bank.id.clone()));
        }

        self.clear();
        self.phase = Phase::InProgress(Step::Answering);
        tracing::debug!(bank = %self.bank.id, questions = self.bank.len(), "quiz started");
        Ok(&self.bank.questions[0])
    }

    /// Submit the player's choice for the current question.
    pub fn answer(&mut self, selected: usize) -> Result<AnswerRecord, QuizError> {
        self.expect_answering("answer")?;
        self.record(Some(selected))
    }

    /// Submit the current question with no selection.
    pub fn time_out(&mut self) -> Result<AnswerRecord, QuizError> {
        self.expect_answering("time out")?;
        self.time_left = 0;
        self.record(None)
    }

    /// One time unit elapses on the current question.
    pub fn tick(&mut self) -> Result<Tick, QuizError> {
        self.expect_answering("tick")?;
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.record(None).map(Tick::TimedOut)
        } else {
            Ok(Tick::Remaining(self.time_left))
        }
    }

    /// Leave the reveal step for the next question, or finish.
    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        if self.phase != Phase::InProgress(Step::Revealing) {
            return Err(QuizError::invalid("advance", self.phase));
        }

        if self.index + 1 < self.bank.len() {
            self.index += 1;
            self.time_left = self.time_limit;
            self.phase = Phase::InProgress(Step::Answering);
            Ok(Advance::Next(self.index))
        } else {
            self.phase = Phase::Completed;
            let summary = self.build_summary();
            tracing::debug!(score = summary.score, correct = summary.correct_answers, "quiz completed");
            Ok(Advance::Completed(summary))
        }
    }

    /// Discard everything and return to `NotStarted`.
    pub fn reset(&mut self) {
        self.clear();
        self.phase = Phase::NotStarted;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    /// The question being answered or revealed, if a run is in progress.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::InProgress(_) => self.bank.question(self.index),
            _ => None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// The final summary, once the session is completed.
    pub fn summary(&self) -> Option<QuizSummary> {
        (self.phase == Phase::Completed).then(|| self.build_summary())
    }

    fn expect_answering(&self, action: &'static str) -> Result<(), QuizError> {
        if self.phase == Phase::InProgress(Step::Answering) {
            Ok(())
        } else {
            Err(QuizError::invalid(action, self.phase))
        }
    }

    fn record(&mut self, selected: Option<usize>) -> Result<AnswerRecord, QuizError> {
        let Some(question) = self.bank.question(self.index) else {
            return Err(QuizError::invalid("answer", self.phase));
        };
        if let Some(selected) = selected {
            if selected >= question.options.len() {
                return Err(QuizError::OptionOutOfRange {
                    question_id: question.id,
                    selected,
                    options: question.options.len(),
                });
            }
        }

        let is_correct = question.is_correct(selected);
        let points = if is_correct {
            award_points(question.points, self.streak)
        } else {
            0
        };
        let record = AnswerRecord {
            question_id: question.id,
            selected_answer: selected,
            is_correct,
            points,
            time_spent: self.time_limit.saturating_sub(self.time_left),
        };

        if is_correct {
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
        self.score = self.score.saturating_add(points);
        self.answers.push(record.clone());
        self.phase = Phase::InProgress(Step::Revealing);
        Ok(record)
    }

    fn build_summary(&self) -> QuizSummary {
        QuizSummary {
            quiz_type: self.bank.quiz_type.clone(),
            score: self.score,
            total_questions: self.bank.len(),
            correct_answers: self.answers.iter().filter(|a| a.is_correct).count(),
            time_spent: self
                .answers
                .iter()
                .fold(0u32, |total, a| total.saturating_add(a.time_spent)),
            best_streak: self.best_streak,
            answers: self.answers.clone(),
        }
    }

    fn clear(&mut self) {
        self.index = 0;
        self.score = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.time_left = self.time_limit;
        self.answers.clear();
    }
}
