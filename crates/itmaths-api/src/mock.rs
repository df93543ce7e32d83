//! Mock backend for testing and offline practice.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use itmaths_core::error::BackendError;
use itmaths_core::model::{Exam, ExamPaper, Question};
use itmaths_core::traits::{ExamBackend, HistoryEntry, SubmitRequest};

/// An in-memory exam backend.
///
/// Serves a fixed set of exams, records submissions, and mirrors them into
/// a local history list. Used by engine tests and by the CLI's offline mode
/// (`itmaths take --offline <exam.toml>`).
pub struct MockBackend {
    exams: Vec<Exam>,
    questions: HashMap<u64, Vec<Question>>,
    history: Mutex<Vec<HistoryEntry>>,
    submissions: Mutex<Vec<SubmitRequest>>,
    fail_submissions: AtomicBool,
    call_count: AtomicU32,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            exams: Vec::new(),
            questions: HashMap::new(),
            history: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            fail_submissions: AtomicBool::new(false),
            call_count: AtomicU32::new(0),
        }
    }

    /// Create a backend serving a single local exam paper.
    pub fn from_paper(paper: ExamPaper) -> Self {
        Self::new().with_paper(paper)
    }

    /// Add an exam paper to the served set.
    pub fn with_paper(mut self, paper: ExamPaper) -> Self {
        self.questions.insert(paper.exam.id, paper.questions);
        self.exams.push(paper.exam);
        self
    }

    /// Make every `submit_result` call fail with a server error.
    pub fn fail_submissions(self) -> Self {
        self.fail_submissions.store(true, Ordering::Relaxed);
        self
    }

    /// Number of backend calls made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Submissions recorded so far.
    pub fn submissions(&self) -> Vec<SubmitRequest> {
        self.submissions.lock().unwrap().clone()
    }

    /// The most recent submission, if any.
    pub fn last_submission(&self) -> Option<SubmitRequest> {
        self.submissions.lock().unwrap().last().cloned()
    }

    fn bump(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExamBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_exams(&self) -> Result<Vec<Exam>, BackendError> {
        self.bump();
        Ok(self.exams.clone())
    }

    async fn fetch_exam(&self, exam_id: u64) -> Result<Exam, BackendError> {
        self.bump();
        self.exams
            .iter()
            .find(|e| e.id == exam_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("exam {exam_id}")))
    }

    async fn fetch_questions(&self, exam_id: u64) -> Result<Vec<Question>, BackendError> {
        self.bump();
        self.questions
            .get(&exam_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("exam {exam_id}")))
    }

    async fn submit_result(&self, request: &SubmitRequest) -> Result<(), BackendError> {
        self.bump();
        if self.fail_submissions.load(Ordering::Relaxed) {
            return Err(BackendError::ApiError {
                status: 500,
                message: "submission rejected".into(),
            });
        }

        let exam_title = self
            .exams
            .iter()
            .find(|e| e.id == request.exam_id)
            .map(|e| e.title.clone())
            .unwrap_or_default();

        let mut history = self.history.lock().unwrap();
        let entry = HistoryEntry {
            id: history.len() as u64 + 1,
            exam_id: request.exam_id,
            exam_title,
            score: request.score,
            correct_count: request.correct_count,
            total_questions: request.total_questions,
            submitted_at: Utc::now(),
        };
        history.insert(0, entry);
        drop(history);

        self.submissions.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn fetch_history(&self, _user: &str) -> Result<Vec<HistoryEntry>, BackendError> {
        self.bump();
        Ok(self.history.lock().unwrap().clone())
    }

    async fn delete_history(&self, _user: &str) -> Result<(), BackendError> {
        self.bump();
        self.history.lock().unwrap().clear();
        Ok(())
    }
}
