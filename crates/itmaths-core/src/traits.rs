//! Core trait definitions for the exam backend, the local attempt store,
//! and answer sources.
//!
//! The async traits are implemented by the `itmaths-api` and
//! `itmaths-store` crates; `AnswerSource` is additionally implemented by
//! the CLI on top of stdin.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::model::{Answer, AnswerMap, Exam, ExamPaper, Question};

// ---------------------------------------------------------------------------
// Exam backend trait
// ---------------------------------------------------------------------------

/// The remote exam platform, as consumed by this client.
///
/// All calls are one-shot: no retry policy exists in this subsystem.
#[async_trait]
pub trait ExamBackend: Send + Sync {
    /// Human-readable backend name (e.g. "rest").
    fn name(&self) -> &str;

    /// List the exams available to the user.
    async fn list_exams(&self) -> Result<Vec<Exam>, BackendError>;

    /// Fetch metadata (title, duration) for one exam.
    async fn fetch_exam(&self, exam_id: u64) -> Result<Exam, BackendError>;

    /// Fetch the question set for one exam, in source order.
    async fn fetch_questions(&self, exam_id: u64) -> Result<Vec<Question>, BackendError>;

    /// Persist a finished attempt. Callers treat this as best-effort: the
    /// attempt engine fires it without awaiting and logs any failure.
    async fn submit_result(&self, request: &SubmitRequest) -> Result<(), BackendError>;

    /// Fetch the user's prior attempts, most recent first.
    async fn fetch_history(&self, user: &str) -> Result<Vec<HistoryEntry>, BackendError>;

    /// Delete all of the user's attempt history.
    async fn delete_history(&self, user: &str) -> Result<(), BackendError>;
}

/// Payload persisted to the backend when an attempt is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub exam_id: u64,
    pub user: String,
    /// Exact total score, unrounded.
    pub score: f64,
    pub total_questions: u32,
    /// Questions that earned their full point value.
    pub correct_count: u32,
    /// The raw answer map, as recorded.
    pub answers: AnswerMap,
}

/// One prior attempt, as returned by the backend history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub exam_id: u64,
    pub exam_title: String,
    pub score: f64,
    pub correct_count: u32,
    pub total_questions: u32,
    pub submitted_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Attempt store trait
// ---------------------------------------------------------------------------

/// Durable local storage for attempt start times, one entry per exam id.
///
/// The stored timestamp survives a process restart so a resumed attempt
/// derives the same deadline; it is removed on submission so a later
/// attempt starts a fresh timer.
pub trait AttemptStore: Send + Sync {
    /// The stored start time (epoch milliseconds) for an exam, if any.
    fn load_start(&self, exam_id: u64) -> anyhow::Result<Option<i64>>;

    /// Record the start time for an exam.
    fn save_start(&self, exam_id: u64, started_at_ms: i64) -> anyhow::Result<()>;

    /// Remove the entry for an exam. Removing a missing entry is not an
    /// error.
    fn clear_start(&self, exam_id: u64) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Answer source trait
// ---------------------------------------------------------------------------

/// An input event during an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptEvent {
    /// Record (or overwrite) the answer for one question.
    Answer { question_id: u64, answer: Answer },
    /// The user asked to submit now.
    Submit,
    /// The user left the attempt. The timer keeps running against the
    /// stored start time; re-entering resumes with the same deadline.
    Abandon,
}

/// Supplies attempt events, one at a time.
///
/// The engine polls this concurrently with the countdown tick, so a slow
/// source (a human at a terminal) never stalls the timer.
#[async_trait]
pub trait AnswerSource: Send {
    async fn next_event(&mut self, paper: &ExamPaper) -> anyhow::Result<AttemptEvent>;
}

/// A pre-recorded sequence of events, for tests and `--answers` files.
///
/// Once the queue is drained, every further poll yields `Submit`.
pub struct ScriptedSource {
    events: VecDeque<AttemptEvent>,
}

impl ScriptedSource {
    pub fn new(events: Vec<AttemptEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }

    /// Convenience constructor: answer each (question id, answer) pair,
    /// then submit.
    pub fn answering(answers: Vec<(u64, Answer)>) -> Self {
        let events = answers
            .into_iter()
            .map(|(question_id, answer)| AttemptEvent::Answer {
                question_id,
                answer,
            })
            .collect();
        Self { events }
    }
}

#[async_trait]
impl AnswerSource for ScriptedSource {
    async fn next_event(&mut self, _paper: &ExamPaper) -> anyhow::Result<AttemptEvent> {
        Ok(self.events.pop_front().unwrap_or(AttemptEvent::Submit))
    }
}

/// A source that never produces an event. Attempts driven by it end only
/// through timer expiry; used to test the forced-submission path.
pub struct SilentSource;

#[async_trait]
impl AnswerSource for SilentSource {
    async fn next_event(&mut self, _paper: &ExamPaper) -> anyhow::Result<AttemptEvent> {
        std::future::pending().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_paper() -> ExamPaper {
        ExamPaper {
            exam: Exam {
                id: 1,
                title: "Test".into(),
                duration_minutes: 10,
                grade: None,
                topic: None,
            },
            questions: vec![],
        }
    }

    #[tokio::test]
    async fn scripted_source_drains_then_submits() {
        let paper = empty_paper();
        let mut source = ScriptedSource::answering(vec![(1, Answer::Choice("4".into()))]);

        let first = source.next_event(&paper).await.unwrap();
        assert_eq!(
            first,
            AttemptEvent::Answer {
                question_id: 1,
                answer: Answer::Choice("4".into())
            }
        );
        assert_eq!(source.next_event(&paper).await.unwrap(), AttemptEvent::Submit);
        assert_eq!(source.next_event(&paper).await.unwrap(), AttemptEvent::Submit);
    }

    #[test]
    fn serde_roundtrip_of_submit_request() {
        let mut answers = AnswerMap::new();
        answers.insert(3, Answer::Text("3,5".into()));
        let request = SubmitRequest {
            exam_id: 7,
            user: "dasha".into(),
            score: 0.75,
            total_questions: 10,
            correct_count: 2,
            answers,
        };

        let json = serde_json::to_string(&request).unwrap();
        let back: SubmitRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.exam_id, 7);
        assert_eq!(back.correct_count, 2);
        assert_eq!(back.answers.len(), 1);
    }
}
