//! itmaths-store — Durable local attempt state.
//!
//! Holds one start timestamp per exam id so an interrupted attempt resumes
//! against the same deadline after a reload or process restart. Entries are
//! removed on submission.

pub mod memory;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use itmaths_core::traits::AttemptStore;

pub use memory::MemoryAttemptStore;

/// File-backed attempt store.
///
/// All entries live in one JSON object file (`attempts.json` under the
/// store directory), keyed by exam id. Reads and writes are whole-file;
/// the file is small (one integer per in-flight exam) and accessed from a
/// single process.
pub struct FileAttemptStore {
    path: PathBuf,
}

impl FileAttemptStore {
    /// A store rooted at the given directory. The directory is created on
    /// first write.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("attempts.json"),
        }
    }

    fn read_entries(&self) -> Result<HashMap<String, i64>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read attempt store: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse attempt store: {}", self.path.display()))
    }

    fn write_entries(&self, entries: &HashMap<String, i64>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write attempt store: {}", self.path.display()))
    }
}

impl AttemptStore for FileAttemptStore {
    fn load_start(&self, exam_id: u64) -> Result<Option<i64>> {
        Ok(self.read_entries()?.get(&exam_id.to_string()).copied())
    }

    fn save_start(&self, exam_id: u64, started_at_ms: i64) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(exam_id.to_string(), started_at_ms);
        self.write_entries(&entries)
    }

    fn clear_start(&self, exam_id: u64) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(&exam_id.to_string()).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}
