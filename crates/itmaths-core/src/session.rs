//! The exam session state machine.
//!
//! One `ExamSession` is one attempt: `NotStarted → InProgress →
//! Submitted`, with `Submitted` terminal. A fresh attempt is a new session,
//! never a reset of an old one. All time arithmetic works on epoch
//! milliseconds passed in by the caller, so the machine itself is
//! deterministic and clock-free.

use thiserror::Error;

use crate::model::{Answer, AnswerMap, ExamPaper};
use crate::scoring::{score_attempt, AttemptScore};

/// Remaining seconds below which the countdown enters its warning state.
pub const WARNING_THRESHOLD_SECS: i64 = 300;

/// Attempt lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    NotStarted,
    InProgress,
    Submitted,
}

/// What triggered a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    /// Explicit user confirmation.
    Manual,
    /// The countdown reached zero.
    TimeExpired,
}

/// Errors from session operations that violate the state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("attempt has not started")]
    NotStarted,

    #[error("attempt is already submitted")]
    AlreadySubmitted,

    #[error("no question with id {0} in this paper")]
    UnknownQuestion(u64),
}

/// The outcome of the single submission of a session.
#[derive(Debug, Clone)]
pub struct SubmittedAttempt {
    pub score: AttemptScore,
    pub submitted_at_ms: i64,
    /// `true` when the submission was forced by timer expiry.
    pub forced: bool,
}

/// One attempt over one (already shuffled) paper.
#[derive(Debug)]
pub struct ExamSession {
    paper: ExamPaper,
    answers: AnswerMap,
    state: AttemptState,
    started_at_ms: i64,
    deadline_ms: i64,
}

impl ExamSession {
    /// A session over a shuffled paper, not yet started.
    pub fn new(paper: ExamPaper) -> Self {
        Self {
            paper,
            answers: AnswerMap::new(),
            state: AttemptState::NotStarted,
            started_at_ms: 0,
            deadline_ms: 0,
        }
    }

    /// Transition to `InProgress` with the given start time (which may come
    /// from durable storage when resuming a reloaded attempt). The deadline
    /// is derived from the exam duration; resuming with the same start time
    /// yields the same deadline.
    pub fn begin(&mut self, started_at_ms: i64) {
        if self.state != AttemptState::NotStarted {
            return;
        }
        self.started_at_ms = started_at_ms;
        self.deadline_ms =
            started_at_ms + i64::from(self.paper.exam.duration_minutes) * 60_000;
        self.state = AttemptState::InProgress;
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn paper(&self) -> &ExamPaper {
        &self.paper
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn started_at_ms(&self) -> i64 {
        self.started_at_ms
    }

    pub fn deadline_ms(&self) -> i64 {
        self.deadline_ms
    }

    /// Whole seconds until the deadline, floored; negative once expired.
    pub fn seconds_left(&self, now_ms: i64) -> i64 {
        (self.deadline_ms - now_ms).div_euclid(1000)
    }

    /// Whether the countdown is in its warning state (under five minutes
    /// remaining).
    pub fn in_warning(&self, now_ms: i64) -> bool {
        self.seconds_left(now_ms) < WARNING_THRESHOLD_SECS
    }

    /// Record (or overwrite) an answer. Rejected once submitted; the
    /// answer map is immutable from that point on.
    pub fn record_answer(&mut self, question_id: u64, answer: Answer) -> Result<(), SessionError> {
        match self.state {
            AttemptState::NotStarted => return Err(SessionError::NotStarted),
            AttemptState::Submitted => return Err(SessionError::AlreadySubmitted),
            AttemptState::InProgress => {}
        }
        if self.paper.question(question_id).is_none() {
            return Err(SessionError::UnknownQuestion(question_id));
        }
        self.answers.insert(question_id, answer);
        Ok(())
    }

    /// The guarded single-entry transition to `Submitted`.
    ///
    /// The first call scores the attempt and returns the outcome; every
    /// later call returns `None`, so a manual submit racing the expiry tick
    /// converges on exactly one scoring pass.
    pub fn try_submit(&mut self, now_ms: i64, kind: SubmitKind) -> Option<SubmittedAttempt> {
        if self.state != AttemptState::InProgress {
            return None;
        }
        self.state = AttemptState::Submitted;

        let score = score_attempt(&self.paper.questions, &self.answers);
        Some(SubmittedAttempt {
            score,
            submitted_at_ms: now_ms,
            forced: kind == SubmitKind::TimeExpired,
        })
    }
}

/// Format remaining seconds as a zero-padded `MM:SS` countdown.
///
/// Negative values render as `00:00`; the display never shows negative
/// time.
pub fn format_countdown(seconds_left: i64) -> String {
    let secs = seconds_left.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, Exam, Question, QuestionKind};

    fn paper(duration_minutes: u32) -> ExamPaper {
        ExamPaper {
            exam: Exam {
                id: 1,
                title: "Fractions".into(),
                duration_minutes,
                grade: None,
                topic: None,
            },
            questions: vec![Question {
                id: 10,
                kind: QuestionKind::SingleChoice,
                content: "2+2?".into(),
                choices: vec![
                    Choice {
                        id: 1,
                        label: "A".into(),
                        content: "3".into(),
                        correct: false,
                    },
                    Choice {
                        id: 2,
                        label: "B".into(),
                        content: "4".into(),
                        correct: true,
                    },
                ],
                short_answer: None,
            }],
        }
    }

    #[test]
    fn deadline_derives_from_start_and_duration() {
        let mut session = ExamSession::new(paper(45));
        session.begin(1_000_000);
        assert_eq!(session.deadline_ms(), 1_000_000 + 45 * 60_000);
        assert_eq!(session.seconds_left(1_000_000), 45 * 60);
    }

    #[test]
    fn resuming_with_stored_start_keeps_the_deadline() {
        let start = 5_000_000;
        let mut first = ExamSession::new(paper(45));
        first.begin(start);

        // A reload constructs a fresh session from the persisted start.
        let mut resumed = ExamSession::new(paper(45));
        resumed.begin(start);
        assert_eq!(first.deadline_ms(), resumed.deadline_ms());
    }

    #[test]
    fn seconds_left_floors_toward_negative() {
        let mut session = ExamSession::new(paper(1));
        session.begin(0);
        // 500 ms past the deadline floors to -1, not 0.
        assert_eq!(session.seconds_left(60_500), -1);
        assert_eq!(session.seconds_left(59_001), 0);
        assert_eq!(session.seconds_left(59_000), 1);
    }

    #[test]
    fn warning_under_five_minutes() {
        let mut session = ExamSession::new(paper(10));
        session.begin(0);
        assert!(!session.in_warning(5 * 60_000 - 1_000)); // 301 s left
        assert!(!session.in_warning(5 * 60_000)); // exactly 300 s left
        assert!(session.in_warning(5 * 60_000 + 1_000)); // 299 s left
    }

    #[test]
    fn submit_is_single_entry() {
        let mut session = ExamSession::new(paper(45));
        session.begin(0);
        session
            .record_answer(10, Answer::Choice("4".into()))
            .unwrap();

        let first = session.try_submit(1_000, SubmitKind::Manual).unwrap();
        assert!(!first.forced);
        assert_eq!(first.score.breakdown.total, 0.25);

        // A racing expiry tick finds the attempt already submitted.
        assert!(session.try_submit(2_000, SubmitKind::TimeExpired).is_none());
        assert_eq!(session.state(), AttemptState::Submitted);
    }

    #[test]
    fn forced_submission_uses_recorded_answers() {
        let mut session = ExamSession::new(paper(45));
        session.begin(0);
        session
            .record_answer(10, Answer::Choice("4".into()))
            .unwrap();

        let outcome = session
            .try_submit(45 * 60_000 + 1, SubmitKind::TimeExpired)
            .unwrap();
        assert!(outcome.forced);
        assert_eq!(outcome.score.breakdown.total, 0.25);
    }

    #[test]
    fn answers_frozen_after_submission() {
        let mut session = ExamSession::new(paper(45));
        session.begin(0);
        session.try_submit(1_000, SubmitKind::Manual).unwrap();

        let err = session
            .record_answer(10, Answer::Choice("3".into()))
            .unwrap_err();
        assert_eq!(err, SessionError::AlreadySubmitted);
        assert!(session.answers().is_empty());
    }

    #[test]
    fn recording_requires_begin() {
        let mut session = ExamSession::new(paper(45));
        let err = session
            .record_answer(10, Answer::Choice("4".into()))
            .unwrap_err();
        assert_eq!(err, SessionError::NotStarted);
    }

    #[test]
    fn unknown_question_rejected() {
        let mut session = ExamSession::new(paper(45));
        session.begin(0);
        let err = session
            .record_answer(999, Answer::Choice("4".into()))
            .unwrap_err();
        assert_eq!(err, SessionError::UnknownQuestion(999));
    }

    #[test]
    fn countdown_formatting() {
        assert_eq!(format_countdown(2700), "45:00");
        assert_eq!(format_countdown(299), "04:59");
        assert_eq!(format_countdown(61), "01:01");
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(-5), "00:00");
    }
}
