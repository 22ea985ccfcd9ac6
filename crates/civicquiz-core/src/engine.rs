//! Async quiz runner.
//!
//! Drives a `QuizSession` against a per-question countdown and player
//! input, then hands the finished summary to the scoring service without
//! waiting on it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::QuizError;
use crate::model::{AnswerRecord, Question, QuizSummary};
use crate::session::{Advance, QuizSession, Tick};
use crate::traits::{QuizSubmission, ScoringService, SubmissionResponse, UserIdentity};

/// Configuration for the quiz runner.
#[derive(Debug, Clone)]
pub struct QuizRunnerConfig {
    /// Wall-clock length of one countdown unit.
    pub tick: Duration,
    /// How long the answer stays revealed before moving on.
    pub reveal_delay: Duration,
    /// Upper bound on the result submission.
    pub submit_timeout: Duration,
}

impl Default for QuizRunnerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            reveal_delay: Duration::from_secs(2),
            submit_timeout: Duration::from_secs(10),
        }
    }
}

/// Input from the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Choose the option at this index.
    Select(usize),
    /// Abandon the run.
    Reset,
}

/// Rendering hooks.
pub trait QuizObserver: Send + Sync {
    fn on_question(&self, index: usize, total: usize, question: &Question, time_left: u32);
    fn on_tick(&self, time_left: u32);
    fn on_reveal(&self, question: &Question, record: &AnswerRecord, streak: u32);
    fn on_invalid_input(&self, error: &QuizError);
    fn on_complete(&self, summary: &QuizSummary);
    fn on_reset(&self);
}

/// No-op observer.
pub struct NoopObserver;

impl QuizObserver for NoopObserver {
    fn on_question(&self, _: usize, _: usize, _: &Question, _: u32) {}
    fn on_tick(&self, _: u32) {}
    fn on_reveal(&self, _: &Question, _: &AnswerRecord, _: u32) {}
    fn on_invalid_input(&self, _: &QuizError) {}
    fn on_complete(&self, _: &QuizSummary) {}
    fn on_reset(&self) {}
}

/// How a run ended.
#[derive(Debug)]
pub enum QuizOutcome {
    Completed {
        summary: QuizSummary,
        /// Present when a scoring service and a signed-in user were available.
        submission: Option<PendingSubmission>,
    },
    /// Reset or input closed before the last question. The session is back
    /// to `NotStarted`.
    Abandoned { answered: usize },
}

/// A result submission running in the background.
///
/// Dropping the handle aborts the request.
#[derive(Debug)]
pub struct PendingSubmission {
    handle: Option<JoinHandle<Option<SubmissionResponse>>>,
}

impl PendingSubmission {
    /// Wait for the submission. `None` if it failed, timed out or was aborted;
    /// the failure has already been logged.
    pub async fn outcome(mut self) -> Option<SubmissionResponse> {
        let handle = self.handle.take()?;
        match handle.await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("submission task ended abnormally: {e}");
                None
            }
        }
    }
}

impl Drop for PendingSubmission {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Runs quiz sessions.
pub struct QuizRunner {
    scoring: Option<Arc<dyn ScoringService>>,
    identity: Option<UserIdentity>,
    config: QuizRunnerConfig,
}

impl QuizRunner {
    pub fn new(config: QuizRunnerConfig) -> Self {
        Self {
            scoring: None,
            identity: None,
            config,
        }
    }

    pub fn with_scoring(mut self, scoring: Arc<dyn ScoringService>) -> Self {
        self.scoring = Some(scoring);
        self
    }

    pub fn with_identity(mut self, identity: Option<UserIdentity>) -> Self {
        self.identity = identity;
        self
    }

    /// Play `session` from the first question to completion or abandonment.
    ///
    /// Selections that arrive while an answer is being revealed are queued
    /// for the next question. A closed input channel while a question is
    /// waiting for an answer abandons the run.
    pub async fn run(
        &self,
        session: &mut QuizSession,
        inputs: &mut mpsc::UnboundedReceiver<PlayerInput>,
        observer: &dyn QuizObserver,
    ) -> Result<QuizOutcome> {
        session.start()?;
        let total = session.bank().len();
        let mut queued = VecDeque::new();
        let mut inputs_open = true;

        loop {
            let question = session
                .current_question()
                .ok_or_else(|| anyhow::anyhow!("session has no current question"))?;
            observer.on_question(session.current_index(), total, question, session.time_left());

            let record = self
                .answer_question(session, inputs, &mut queued, &mut inputs_open, observer)
                .await?;
            let Some(record) = record else {
                return Ok(self.abandon(session, observer));
            };

            if let Some(question) = session.current_question() {
                observer.on_reveal(question, &record, session.streak());
            }

            if self.reveal(inputs, &mut queued, &mut inputs_open).await {
                return Ok(self.abandon(session, observer));
            }

            match session.advance()? {
                Advance::Next(_) => continue,
                Advance::Completed(summary) => {
                    observer.on_complete(&summary);
                    let submission = self.spawn_submission(&summary);
                    return Ok(QuizOutcome::Completed {
                        summary,
                        submission,
                    });
                }
            }
        }
    }

    /// Race player input against the countdown. `None` means abandon.
    async fn answer_question(
        &self,
        session: &mut QuizSession,
        inputs: &mut mpsc::UnboundedReceiver<PlayerInput>,
        queued: &mut VecDeque<usize>,
        inputs_open: &mut bool,
        observer: &dyn QuizObserver,
    ) -> Result<Option<AnswerRecord>> {
        while let Some(choice) = queued.pop_front() {
            match session.answer(choice) {
                Ok(record) => return Ok(Some(record)),
                Err(e) => observer.on_invalid_input(&e),
            }
        }
        if !*inputs_open {
            return Ok(None);
        }

        // Dropped on every return path, which cancels the countdown.
        let mut countdown = interval_at(Instant::now() + self.config.tick, self.config.tick);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(PlayerInput::Select(choice)) => match session.answer(choice) {
                        Ok(record) => return Ok(Some(record)),
                        Err(e) => observer.on_invalid_input(&e),
                    },
                    Some(PlayerInput::Reset) => return Ok(None),
                    None => {
                        *inputs_open = false;
                        return Ok(None);
                    }
                },
                _ = countdown.tick() => match session.tick()? {
                    Tick::Remaining(left) => observer.on_tick(left),
                    Tick::TimedOut(record) => return Ok(Some(record)),
                },
            }
        }
    }

    /// Hold the reveal for the configured delay. Returns `true` on reset.
    async fn reveal(
        &self,
        inputs: &mut mpsc::UnboundedReceiver<PlayerInput>,
        queued: &mut VecDeque<usize>,
        inputs_open: &mut bool,
    ) -> bool {
        let delay = tokio::time::sleep(self.config.reveal_delay);
        tokio::pin!(delay);

        loop {
            tokio::select! {
                _ = &mut delay => return false,
                input = inputs.recv(), if *inputs_open => match input {
                    Some(PlayerInput::Select(choice)) => queued.push_back(choice),
                    Some(PlayerInput::Reset) => return true,
                    None => *inputs_open = false,
                },
            }
        }
    }

    fn abandon(&self, session: &mut QuizSession, observer: &dyn QuizObserver) -> QuizOutcome {
        let answered = session.answers().len();
        session.reset();
        observer.on_reset();
        tracing::debug!(answered, "quiz abandoned");
        QuizOutcome::Abandoned { answered }
    }

    fn spawn_submission(&self, summary: &QuizSummary) -> Option<PendingSubmission> {
        let Some(service) = self.scoring.as_ref().map(Arc::clone) else {
            tracing::debug!("no scoring service configured, skipping submission");
            return None;
        };
        let Some(user) = self.identity.clone() else {
            tracing::info!("no signed-in user, skipping result submission");
            return None;
        };

        let submission = QuizSubmission::from(summary);
        let timeout = self.config.submit_timeout;
        let handle = tokio::spawn(async move {
            match tokio::time::timeout(timeout, service.submit(&user, &submission)).await {
                Ok(Ok(response)) => {
                    tracing::info!(
                        points = response.points_earned,
                        level_up = response.level_up,
                        "quiz result submitted to {}",
                        service.name()
                    );
                    Some(response)
                }
                Ok(Err(e)) => {
                    tracing::warn!("failed to submit quiz result to {}: {e:#}", service.name());
                    None
                }
                Err(_) => {
                    tracing::warn!(
                        "quiz result submission to {} timed out after {}s",
                        service.name(),
                        timeout.as_secs()
                    );
                    None
                }
            }
        });

        Some(PendingSubmission {
            handle: Some(handle),
        })
    }
}
