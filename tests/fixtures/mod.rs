//! Test fixtures shared by the integration tests

#![allow(dead_code)]

use skill_estimate::types::Record;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Records of the three-question smoke scenario
pub fn three_question_records() -> Vec<Record> {
    vec![
        Record::pass(1580.0),
        Record::fail(1600.0),
        Record::pass(1550.0),
    ]
}

/// Build records from `(difficulty, passed)` pairs
pub fn records_from(pairs: &[(f64, bool)]) -> Vec<Record> {
    pairs
        .iter()
        .map(|&(difficulty, outcome)| Record::new(difficulty, outcome))
        .collect()
}

/// Unique scratch file path in the system temp directory
///
/// The file is not created; callers remove it when done.
pub fn scratch_path(stem: &str, extension: &str) -> PathBuf {
    let n = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "skill-estimate-{}-{}-{}.{}",
        stem,
        std::process::id(),
        n,
        extension
    ))
}

/// Removes the wrapped path on drop
pub struct ScratchFile(pub PathBuf);

impl ScratchFile {
    pub fn new(stem: &str, extension: &str) -> Self {
        Self(scratch_path(stem, extension))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.0
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}
