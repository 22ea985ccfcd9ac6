//! HTTP client for the gamification endpoint.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;

use civicquiz_core::traits::{QuizSubmission, ScoringService, SubmissionResponse, UserIdentity};

use crate::config::GamificationConfig;
use crate::error::GamificationError;

const DEFAULT_RETRY_AFTER_MS: u64 = 1000;

/// Posts finished quizzes to the gamification service.
pub struct GamificationClient {
    url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GamificationClient {
    pub fn new(config: &GamificationConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            url: format!(
                "{}/{}",
                config.base_url.trim_end_matches('/'),
                config.endpoint.trim_start_matches('/')
            ),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    /// The full endpoint URL submissions are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ScoringService for GamificationClient {
    fn name(&self) -> &str {
        "gamification"
    }

    #[instrument(skip(self, user, submission), fields(user = %user.id, quiz_type = %submission.quiz_type))]
    async fn submit(
        &self,
        user: &UserIdentity,
        submission: &QuizSubmission,
    ) -> anyhow::Result<SubmissionResponse> {
        let mut request = self.client.post(&self.url).json(submission);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }
        if let Some(token) = &user.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GamificationError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                GamificationError::NetworkError(format!(
                    "gamification service not reachable at {}",
                    self.url
                ))
            } else {
                GamificationError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(GamificationError::AuthenticationFailed(body).into());
        }
        if status == 429 {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000))
                .unwrap_or(DEFAULT_RETRY_AFTER_MS);
            return Err(GamificationError::RateLimited { retry_after_ms }.into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(GamificationError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let awarded: SubmissionResponse =
            response
                .json()
                .await
                .map_err(|e| GamificationError::ApiError {
                    status: 0,
                    message: format!("failed to parse response: {e}"),
                })?;

        tracing::debug!(
            points = awarded.points_earned,
            achievements = awarded.new_achievements.len(),
            "submission accepted"
        );
        Ok(awarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicquiz_core::model::AnswerRecord;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GamificationConfig {
        GamificationConfig {
            base_url: base_url.to_string(),
            endpoint: "/functions/v1/gamification-quiz".into(),
            api_key: Some("anon-key".into()),
            timeout_secs: 5,
        }
    }

    fn submission() -> QuizSubmission {
        QuizSubmission {
            quiz_type: "politics".into(),
            score: 32,
            total_questions: 2,
            correct_answers: 2,
            time_spent: 12,
            answers: vec![
                AnswerRecord {
                    question_id: 1,
                    selected_answer: Some(2),
                    is_correct: true,
                    points: 10,
                    time_spent: 5,
                },
                AnswerRecord {
                    question_id: 2,
                    selected_answer: Some(1),
                    is_correct: true,
                    points: 22,
                    time_spent: 7,
                },
            ],
        }
    }

    fn user() -> UserIdentity {
        UserIdentity::new("user-1").with_access_token("jwt-token")
    }

    #[tokio::test]
    async fn successful_submission() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "pointsEarned": 32,
            "levelUp": true,
            "newLevel": 3,
            "newAchievements": [
                {"id": "first-quiz", "name": "First Quiz", "description": "Finish a quiz"}
            ]
        });

        Mock::given(method("POST"))
            .and(path("/functions/v1/gamification-quiz"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer jwt-token"))
            .and(body_partial_json(serde_json::json!({
                "quizType": "politics",
                "score": 32,
                "totalQuestions": 2,
                "correctAnswers": 2,
                "timeSpent": 12
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = GamificationClient::new(&config(&server.uri())).unwrap();
        let response = client.submit(&user(), &submission()).await.unwrap();
        assert_eq!(response.points_earned, 32);
        assert!(response.level_up);
        assert_eq!(response.new_level, Some(3));
        assert_eq!(response.new_achievements[0].id, "first-quiz");
    }

    #[tokio::test]
    async fn url_joins_base_and_endpoint() {
        let mut cfg = config("https://example.supabase.co/");
        cfg.endpoint = "quiz".into();
        let client = GamificationClient::new(&cfg).unwrap();
        assert_eq!(client.url(), "https://example.supabase.co/quiz");
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid JWT"))
            .mount(&server)
            .await;

        let client = GamificationClient::new(&config(&server.uri())).unwrap();
        let err = client.submit(&user(), &submission()).await.unwrap_err();
        let err = err.downcast::<GamificationError>().unwrap();
        assert!(matches!(err, GamificationError::AuthenticationFailed(ref m) if m == "invalid JWT"));
    }

    #[tokio::test]
    async fn rate_limited_reads_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let client = GamificationClient::new(&config(&server.uri())).unwrap();
        let err = client.submit(&user(), &submission()).await.unwrap_err();
        assert_eq!(err.to_string(), "rate limited, retry after 3000ms");
    }

    #[tokio::test]
    async fn huge_retry_after_saturates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("retry-after", "18446744073709551615"),
            )
            .mount(&server)
            .await;

        let client = GamificationClient::new(&config(&server.uri())).unwrap();
        let err = client.submit(&user(), &submission()).await.unwrap_err();
        let err = err.downcast::<GamificationError>().unwrap();
        assert!(matches!(
            err,
            GamificationError::RateLimited { retry_after_ms: u64::MAX }
        ));
    }

    #[tokio::test]
    async fn server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = GamificationClient::new(&config(&server.uri())).unwrap();
        let err = client.submit(&user(), &submission()).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn malformed_response_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = GamificationClient::new(&config(&server.uri())).unwrap();
        let err = client.submit(&user(), &submission()).await.unwrap_err();
        assert!(err.to_string().contains("failed to parse response"));
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"pointsEarned": 1}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut cfg = config(&server.uri());
        cfg.timeout_secs = 1;
        let client = GamificationClient::new(&cfg).unwrap();
        let err = client.submit(&user(), &submission()).await.unwrap_err();
        assert_eq!(err.to_string(), "request timed out after 1s");
    }

    #[tokio::test]
    async fn unreachable_service() {
        let client = GamificationClient::new(&config("http://127.0.0.1:1")).unwrap();
        let err = client.submit(&user(), &submission()).await.unwrap_err();
        assert!(err.to_string().contains("network error"));
    }
}
