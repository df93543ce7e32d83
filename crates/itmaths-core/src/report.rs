//! Attempt report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerMap, ScoreBreakdown};

/// The record of one finished attempt, as shown to the user and optionally
/// saved to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Unique attempt identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub exam_id: u64,
    pub exam_title: String,
    /// Attempt start, epoch milliseconds (possibly from a prior process,
    /// when the attempt was resumed after a reload).
    pub started_at_ms: i64,
    /// Submission time, epoch milliseconds.
    pub submitted_at_ms: i64,
    /// `true` when the submission was forced by timer expiry.
    pub forced: bool,
    pub score: ScoreBreakdown,
    /// Questions that earned their full point value.
    pub correct_count: u32,
    pub total_questions: u32,
    /// The raw answer map, as recorded at submission.
    pub answers: AnswerMap,
}

impl AttemptReport {
    /// Wall-clock time spent in the attempt, in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        self.submitted_at_ms - self.started_at_ms
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
