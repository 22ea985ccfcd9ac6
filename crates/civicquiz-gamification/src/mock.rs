//! Mock scoring service for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use civicquiz_core::traits::{QuizSubmission, ScoringService, SubmissionResponse, UserIdentity};

use crate::error::GamificationError;

/// A scoring service that answers locally, for exercising the runner
/// without a real endpoint.
pub struct MockScoringService {
    /// Returned on success; `points_earned` of 0 means "echo the score".
    response: SubmissionResponse,
    /// Status code to fail with instead of answering.
    fail_status: Option<u16>,
    /// Artificial latency before answering.
    delay: Option<Duration>,
    call_count: AtomicU32,
    last_submission: Mutex<Option<(UserIdentity, QuizSubmission)>>,
}

impl MockScoringService {
    /// A mock that awards exactly the submitted score.
    pub fn new() -> Self {
        Self::with_response(SubmissionResponse::default())
    }

    /// A mock that always returns `response`.
    pub fn with_response(response: SubmissionResponse) -> Self {
        Self {
            response,
            fail_status: None,
            delay: None,
            call_count: AtomicU32::new(0),
            last_submission: Mutex::new(None),
        }
    }

    /// A mock that rejects every submission with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::new()
        }
    }

    /// Wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of submissions received.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last submission and the user it was made for.
    pub fn last_submission(&self) -> Option<(UserIdentity, QuizSubmission)> {
        self.last_submission.lock().unwrap().clone()
    }
}

impl Default for MockScoringService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScoringService for MockScoringService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(
        &self,
        user: &UserIdentity,
        submission: &QuizSubmission,
    ) -> anyhow::Result<SubmissionResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_submission.lock().unwrap() = Some((user.clone(), submission.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(status) = self.fail_status {
            return Err(GamificationError::ApiError {
                status,
                message: "mock failure".into(),
            }
            .into());
        }

        let mut response = self.response.clone();
        if response.points_earned == 0 {
            response.points_earned = submission.score;
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicquiz_core::traits::Achievement;

    fn submission(score: u32) -> QuizSubmission {
        QuizSubmission {
            quiz_type: "politics".into(),
            score,
            total_questions: 10,
            correct_answers: 3,
            time_spent: 60,
            answers: vec![],
        }
    }

    #[tokio::test]
    async fn echoes_score_by_default() {
        let service = MockScoringService::new();
        let user = UserIdentity::new("u-1");

        let response = service.submit(&user, &submission(42)).await.unwrap();
        assert_eq!(response.points_earned, 42);
        assert_eq!(service.call_count(), 1);

        let (seen_user, seen) = service.last_submission().unwrap();
        assert_eq!(seen_user.id, "u-1");
        assert_eq!(seen.score, 42);
    }

    #[tokio::test]
    async fn fixed_response() {
        let service = MockScoringService::with_response(SubmissionResponse {
            points_earned: 100,
            level_up: true,
            new_level: Some(2),
            new_achievements: vec![Achievement {
                id: "streak-5".into(),
                name: "On Fire".into(),
                description: String::new(),
            }],
        });

        let response = service
            .submit(&UserIdentity::new("u"), &submission(7))
            .await
            .unwrap();
        assert_eq!(response.points_earned, 100);
        assert_eq!(response.new_achievements.len(), 1);
    }

    #[tokio::test]
    async fn failing_reports_status() {
        let service = MockScoringService::failing(503);
        let err = service
            .submit(&UserIdentity::new("u"), &submission(7))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP 503"));
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied() {
        let service = MockScoringService::new().with_delay(Duration::from_secs(5));
        let start = tokio::time::Instant::now();
        service
            .submit(&UserIdentity::new("u"), &submission(1))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
