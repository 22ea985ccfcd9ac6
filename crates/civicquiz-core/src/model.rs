//! Core data model types for civicquiz.
//!
//! Questions and banks are static configuration; answer records and
//! summaries are produced by a running session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within its bank.
    pub id: u32,
    /// The question text shown to the player.
    pub prompt: String,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct: usize,
    /// Explanation shown after the answer is revealed.
    #[serde(default)]
    pub explanation: String,
    /// Difficulty label.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Base points awarded for a correct answer.
    pub points: u32,
}

impl Question {
    /// Returns `true` if `selected` is the correct option.
    pub fn is_correct(&self, selected: Option<usize>) -> bool {
        selected == Some(self.correct)
    }

    /// The text of the correct option.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct).map(String::as_str)
    }
}

/// Question difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" | "facil" | "fácil" => Ok(Difficulty::Easy),
            "medium" | "medio" | "médio" => Ok(Difficulty::Medium),
            "hard" | "dificil" | "difícil" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A fixed set of questions played as one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Quiz type reported to the scoring service.
    pub quiz_type: String,
    /// Description of this bank.
    #[serde(default)]
    pub description: String,
    /// Countdown per question, in seconds.
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u32,
    /// The questions, in play order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

pub(crate) fn default_time_limit() -> u32 {
    30
}

impl QuestionBank {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Look up a question by its id.
    pub fn find(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// The outcome of one question. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: u32,
    /// Selected option, or `None` when the countdown ran out.
    pub selected_answer: Option<usize>,
    pub is_correct: bool,
    /// Base points plus streak bonus, or 0.
    pub points: u32,
    /// Time units spent before answering.
    pub time_spent: u32,
}

impl AnswerRecord {
    pub fn timed_out(&self) -> bool {
        self.selected_answer.is_none()
    }
}

/// Aggregate result of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub quiz_type: String,
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
    /// Sum of per-answer time spent.
    pub time_spent: u32,
    pub best_streak: u32,
    pub answers: Vec<AnswerRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question {
            id: 1,
            prompt: "Capital of Brazil?".into(),
            options: vec!["Rio de Janeiro".into(), "Brasília".into(), "São Paulo".into()],
            correct: 1,
            explanation: "Brasília has been the capital since 1960.".into(),
            difficulty: Difficulty::Easy,
            points: 10,
        }
    }

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!("EASY".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("médio".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("dificil".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("trivial".parse::<Difficulty>().is_err());
    }

    #[test]
    fn question_correctness() {
        let q = sample_question();
        assert!(q.is_correct(Some(1)));
        assert!(!q.is_correct(Some(0)));
        assert!(!q.is_correct(None));
        assert_eq!(q.correct_option(), Some("Brasília"));
    }

    #[test]
    fn answer_record_json_uses_null_for_timeout() {
        let record = AnswerRecord {
            question_id: 3,
            selected_answer: None,
            is_correct: false,
            points: 0,
            time_spent: 30,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["questionId"], 3);
        assert!(json["selectedAnswer"].is_null());
        assert_eq!(json["isCorrect"], false);
        assert_eq!(json["timeSpent"], 30);
        assert!(record.timed_out());
    }
}
