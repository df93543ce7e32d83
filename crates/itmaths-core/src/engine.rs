//! Central attempt orchestrator.
//!
//! Drives one timed attempt end to end: load, shuffle, countdown, answer
//! collection, the single guarded submission, and best-effort result
//! persistence.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use rand::thread_rng;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::model::ExamPaper;
use crate::report::AttemptReport;
use crate::session::{ExamSession, SubmitKind};
use crate::shuffle::shuffle_paper;
use crate::traits::{AnswerSource, AttemptEvent, AttemptStore, ExamBackend, SubmitRequest};

/// Configuration for the attempt engine.
#[derive(Debug, Clone)]
pub struct AttemptEngineConfig {
    /// Countdown tick interval.
    pub tick: Duration,
    /// User name sent with persisted results.
    pub user: String,
}

impl Default for AttemptEngineConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            user: "student".to_string(),
        }
    }
}

/// Attempt progress reporting trait.
///
/// Implemented by the CLI to render the live countdown; sibling components
/// that only care about finished attempts should prefer [`AttemptEngine::subscribe`].
pub trait AttemptObserver: Send + Sync {
    fn on_attempt_start(&self, paper: &ExamPaper, seconds_left: i64);
    fn on_tick(&self, seconds_left: i64, warning: bool);
    fn on_time_expired(&self);
    fn on_submitted(&self, report: &AttemptReport);
}

/// No-op observer.
pub struct NoopObserver;

impl AttemptObserver for NoopObserver {
    fn on_attempt_start(&self, _: &ExamPaper, _: i64) {}
    fn on_tick(&self, _: i64, _: bool) {}
    fn on_time_expired(&self) {}
    fn on_submitted(&self, _: &AttemptReport) {}
}

/// Broadcast payload emitted once per submission, so sibling views (e.g. a
/// history pane) can refresh. Fire-and-forget; nobody listening is fine.
#[derive(Debug, Clone)]
pub struct SubmissionNotice {
    pub exam_id: u64,
    pub total: f64,
    pub correct_count: u32,
    pub total_questions: u32,
    pub forced: bool,
}

/// The attempt engine.
pub struct AttemptEngine {
    backend: Arc<dyn ExamBackend>,
    store: Arc<dyn AttemptStore>,
    config: AttemptEngineConfig,
    notices: broadcast::Sender<SubmissionNotice>,
}

impl AttemptEngine {
    pub fn new(
        backend: Arc<dyn ExamBackend>,
        store: Arc<dyn AttemptStore>,
        config: AttemptEngineConfig,
    ) -> Self {
        let (notices, _) = broadcast::channel(16);
        Self {
            backend,
            store,
            config,
            notices,
        }
    }

    /// Subscribe to submission notices.
    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionNotice> {
        self.notices.subscribe()
    }

    /// Run one timed attempt of the given exam.
    ///
    /// A load failure is terminal: the error is returned and the attempt is
    /// abandoned. Once the question set is loaded the attempt is in
    /// progress; it ends through exactly one submission (manual or forced
    /// by expiry), even when both happen on the same tick.
    pub async fn run(
        &self,
        exam_id: u64,
        source: &mut dyn AnswerSource,
        observer: &dyn AttemptObserver,
    ) -> Result<AttemptReport> {
        let exam = self
            .backend
            .fetch_exam(exam_id)
            .await
            .with_context(|| format!("failed to load exam {exam_id}"))?;
        let questions = self
            .backend
            .fetch_questions(exam_id)
            .await
            .with_context(|| format!("failed to load questions for exam {exam_id}"))?;

        // The countdown runs on the runtime clock anchored to one wall-clock
        // reading, so the deadline survives reloads (wall clock persisted)
        // while ticks stay monotonic.
        let attempt_epoch_ms = Utc::now().timestamp_millis();
        let clock_origin = tokio::time::Instant::now();
        let now_ms = move || attempt_epoch_ms + clock_origin.elapsed().as_millis() as i64;

        let started_at_ms = match self
            .store
            .load_start(exam_id)
            .context("failed to read stored start time")?
        {
            Some(stored) => {
                tracing::info!(exam_id, "resuming attempt with stored start time");
                stored
            }
            None => {
                self.store
                    .save_start(exam_id, attempt_epoch_ms)
                    .context("failed to persist attempt start time")?;
                attempt_epoch_ms
            }
        };

        let questions = shuffle_paper(questions, &mut thread_rng());
        let paper = ExamPaper { exam, questions };
        let mut session = ExamSession::new(paper.clone());
        session.begin(started_at_ms);

        observer.on_attempt_start(&paper, session.seconds_left(now_ms()).max(0));

        let mut interval = tokio::time::interval(self.config.tick);
        interval.tick().await; // the first tick completes immediately

        let submitted = 'attempt: loop {
            // Wait for the next source event, ticking the countdown while
            // we wait. The pending future lives across ticks; expiry wins
            // over it and submits with whatever answers are recorded.
            let event = {
                let mut pending = source.next_event(&paper);
                loop {
                    tokio::select! {
                        event = &mut pending => break event,
                        _ = interval.tick() => {
                            let now = now_ms();
                            let left = session.seconds_left(now);
                            observer.on_tick(left.max(0), session.in_warning(now));
                            if left <= 0 {
                                observer.on_time_expired();
                                if let Some(outcome) =
                                    session.try_submit(now, SubmitKind::TimeExpired)
                                {
                                    break 'attempt outcome;
                                }
                            }
                        }
                    }
                }
            };

            match event? {
                AttemptEvent::Answer {
                    question_id,
                    answer,
                } => {
                    if let Err(e) = session.record_answer(question_id, answer) {
                        tracing::warn!(question_id, "ignoring answer: {e}");
                    }
                }
                AttemptEvent::Submit => {
                    if let Some(outcome) = session.try_submit(now_ms(), SubmitKind::Manual) {
                        break 'attempt outcome;
                    }
                }
                AttemptEvent::Abandon => {
                    // The stored start time stays; re-entering this exam
                    // resumes against the same deadline.
                    anyhow::bail!("attempt abandoned");
                }
            }
        };

        if let Err(e) = self.store.clear_start(exam_id) {
            tracing::warn!(exam_id, "failed to clear stored start time: {e}");
        }

        let report = AttemptReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            exam_id,
            exam_title: paper.exam.title.clone(),
            started_at_ms,
            submitted_at_ms: submitted.submitted_at_ms,
            forced: submitted.forced,
            score: submitted.score.breakdown,
            correct_count: submitted.score.correct_count,
            total_questions: submitted.score.total_questions,
            answers: session.answers().clone(),
        };

        // Best-effort persistence: spawned, never awaited, a failure is
        // logged and must not block or alter the displayed result.
        let backend = Arc::clone(&self.backend);
        let request = SubmitRequest {
            exam_id,
            user: self.config.user.clone(),
            score: report.score.total,
            total_questions: report.total_questions,
            correct_count: report.correct_count,
            answers: report.answers.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = backend.submit_result(&request).await {
                tracing::error!(
                    exam_id = request.exam_id,
                    "failed to persist attempt result: {e}"
                );
            }
        });

        let _ = self.notices.send(SubmissionNotice {
            exam_id,
            total: report.score.total,
            correct_count: report.correct_count,
            total_questions: report.total_questions,
            forced: report.forced,
        });
        observer.on_submitted(&report);

        Ok(report)
    }
}
