use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::scenario::model::StepRecord;

/// One line of a scenario's step trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub scenario: String,
    pub attempt: u32,
    pub step: usize,
    pub name: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn from_step(scenario: &str, attempt: u32, step: usize, record: &StepRecord) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            scenario: scenario.to_string(),
            attempt,
            step,
            name: record.name.clone(),
            passed: record.passed,
            duration_ms: record.duration_ms,
            error: record.error.clone(),
        }
    }
}

/// JSONL writer for step traces. Write failures only warn.
pub struct TraceLogger {
    path: PathBuf,
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path);

        match file {
            Ok(f) => Self {
                path,
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                warn!("could not open trace file '{}': {}", path.display(), e);
                Self { path, file: None }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(file_mutex) = &self.file else {
            return;
        };

        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                warn!("failed to serialize trace event: {}", e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                warn!("trace logger lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            warn!("failed to write trace event: {}", e);
        }
    }
}
