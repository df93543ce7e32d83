//! In-memory attempt store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;

use itmaths_core::traits::AttemptStore;

/// A non-durable attempt store. State dies with the process; useful in
/// tests and anywhere persistence is explicitly unwanted.
#[derive(Default)]
pub struct MemoryAttemptStore {
    entries: Mutex<HashMap<u64, i64>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptStore for MemoryAttemptStore {
    fn load_start(&self, exam_id: u64) -> Result<Option<i64>> {
        Ok(self.entries.lock().unwrap().get(&exam_id).copied())
    }

    fn save_start(&self, exam_id: u64, started_at_ms: i64) -> Result<()> {
        self.entries.lock().unwrap().insert(exam_id, started_at_ms);
        Ok(())
    }

    fn clear_start(&self, exam_id: u64) -> Result<()> {
        self.entries.lock().unwrap().remove(&exam_id);
        Ok(())
    }
}
