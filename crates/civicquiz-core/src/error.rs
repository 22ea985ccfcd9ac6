//! Session error types.

use thiserror::Error;

use crate::session::Phase;

/// Errors returned by session transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The action is not valid in the current phase.
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },

    /// The selected option does not exist on the current question.
    #[error("option {selected} out of range for question {question_id} ({options} options)")]
    OptionOutOfRange {
        question_id: u32,
        selected: usize,
        options: usize,
    },

    /// The question bank has no questions.
    #[error("question bank '{0}' is empty")]
    EmptyBank(String),
}

impl QuizError {
    pub(crate) fn invalid(action: &'static str, phase: Phase) -> Self {
        QuizError::InvalidTransition { action, phase }
    }

    /// Returns `true` if the error came from acting in the wrong phase.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, QuizError::InvalidTransition { .. })
    }
}
