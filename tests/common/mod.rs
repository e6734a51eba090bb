#![allow(dead_code)]

pub mod fake_driver;

use std::path::Path;

use chrono::Local;
use discover_e2e::logger::diagnostic::DiagnosticLogger;

/// Today's log file under `dir`, or an empty string when nothing was written.
pub fn read_log(logger: &DiagnosticLogger) -> String {
    std::fs::read_to_string(logger.log_file_path()).unwrap_or_default()
}

pub fn log_exists(dir: &Path) -> bool {
    dir.join(format!("{}.txt", Local::now().format("%Y-%m-%d")))
        .exists()
}
