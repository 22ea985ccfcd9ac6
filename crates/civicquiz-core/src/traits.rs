//! Collaborator traits and their wire types.
//!
//! The scoring service is implemented by `civicquiz-gamification`; the
//! runner only ever sees it through `ScoringService`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{AnswerRecord, QuizSummary};

// ---------------------------------------------------------------------------
// Scoring service trait
// ---------------------------------------------------------------------------

/// A remote service that awards persistent points, levels and achievements.
#[async_trait]
pub trait ScoringService: Send + Sync {
    /// Human-readable service name (e.g. "gamification").
    fn name(&self) -> &str;

    /// Submit a finished quiz on behalf of `user`.
    async fn submit(
        &self,
        user: &UserIdentity,
        submission: &QuizSubmission,
    ) -> anyhow::Result<SubmissionResponse>;
}

/// Body posted to the scoring service when a quiz completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub quiz_type: String,
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub time_spent: u32,
    pub answers: Vec<AnswerRecord>,
}

impl From<&QuizSummary> for QuizSubmission {
    fn from(summary: &QuizSummary) -> Self {
        Self {
            quiz_type: summary.quiz_type.clone(),
            score: summary.score,
            total_questions: summary.total_questions,
            correct_answers: summary.correct_answers,
            time_spent: summary.time_spent,
            answers: summary.answers.clone(),
        }
    }
}

/// What the scoring service awarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub points_earned: u32,
    #[serde(default)]
    pub level_up: bool,
    #[serde(default)]
    pub new_level: Option<u32>,
    #[serde(default)]
    pub new_achievements: Vec<Achievement>,
}

/// An achievement unlocked by a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The signed-in user, if any.
///
/// Note: Custom Debug impl masks the access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

impl std::fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserIdentity")
            .field("id", &self.id)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}
