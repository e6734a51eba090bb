use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

use chrono::{DateTime, Local, NaiveDate};
use regex::Regex;
use tracing::{debug, error, info};

use crate::browser::driver::Driver;
use crate::error::SuiteError;
use crate::report::attachment::ReportContext;

/// Line that terminates every record.
pub const RECORD_SEPARATOR: &str =
    "-------------------------------------------------------------------------------------------------";

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B\[[0-9;]*[a-zA-Z]").expect("static ANSI pattern is valid")
});

/// Append-only failure log, one plaintext file per calendar day.
///
/// Constructed once per run and shared by every scenario through an `Arc`.
/// Nothing in here ever returns an error to the caller: a scenario must not
/// abort because its diagnostics could not be written.
#[derive(Debug)]
pub struct DiagnosticLogger {
    logs_dir: PathBuf,
    // Serializes appends from concurrent scenarios in this process
    write_lock: Mutex<()>,
}

impl DiagnosticLogger {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        let logs_dir = logs_dir.into();
        if let Err(e) = fs::create_dir_all(&logs_dir) {
            error!("Failed to create logs directory {}: {}", logs_dir.display(), e);
        }
        debug!(dir = %logs_dir.display(), "diagnostic logger ready");
        Self {
            logs_dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Path of today's log file.
    pub fn log_file_path(&self) -> PathBuf {
        self.log_file_path_for(Local::now().date_naive())
    }

    pub fn log_file_path_for(&self, date: NaiveDate) -> PathBuf {
        self.logs_dir.join(format!("{}.txt", date.format("%Y-%m-%d")))
    }

    /// Console only, nothing is persisted.
    pub fn info(&self, message: impl AsRef<str>) {
        info!("{}", message.as_ref());
    }

    /// Console only, nothing is persisted.
    pub fn error(&self, message: impl AsRef<str>) {
        error!("{}", message.as_ref());
    }

    /// Record a failure for `scenario`: append a record to today's file and
    /// attach the text to `report` when one is active.
    pub fn log_error(
        &self,
        scenario: &str,
        err: &dyn std::error::Error,
        report: Option<&ReportContext>,
    ) {
        let message = strip_ansi(&err.to_string()).into_owned();
        let stack = strip_ansi(&error_stack(err)).into_owned();
        let record = format_record(&format_timestamp(Local::now()), scenario, &message, &stack);

        error!(scenario, "{}", message);

        if let Err(e) = self.append(&self.log_file_path(), &record) {
            error!("CRITICAL: {}", e);
            error!("Original error was: {}", message);
        }

        if let Some(report) = report {
            if let Err(e) = report.attach(
                format!("{} - Error Log", scenario),
                "text/plain",
                record.into_bytes(),
            ) {
                debug!("Could not attach error log to report: {}", e);
            }
        }
    }

    /// As `log_error`, plus a full-page screenshot of `page` when it is
    /// still open and a report is active. Capture failures are swallowed.
    pub fn log_error_with_page(
        &self,
        scenario: &str,
        err: &dyn std::error::Error,
        page: &mut dyn Driver,
        report: Option<&ReportContext>,
    ) {
        self.log_error(scenario, err, report);

        let Some(report) = report else { return };
        if page.is_closed() {
            return;
        }
        match page.screenshot(true) {
            Ok(png) => {
                if let Err(e) = report.attach(format!("{} - Screenshot", scenario), "image/png", png)
                {
                    debug!("Could not attach screenshot to report: {}", e);
                }
            }
            Err(e) => debug!("Could not take screenshot: {}", e),
        }
    }

    /// One `write_all` per record on an append-mode handle.
    fn append(&self, path: &Path, record: &str) -> Result<(), SuiteError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let to_failure = |source| SuiteError::LogWriteFailure {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(to_failure)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(to_failure)?;
        file.write_all(record.as_bytes()).map_err(to_failure)
    }
}

pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// `[DD/MM/YYYY, h:mm:ss am]` in local time.
pub fn format_timestamp(at: DateTime<Local>) -> String {
    format!("[{}]", at.format("%d/%m/%Y, %-I:%M:%S %P"))
}

/// The `source()` chain below `err`, one cause per line.
pub fn error_stack(err: &dyn std::error::Error) -> String {
    let mut lines = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        lines.push(format!("    caused by: {}", cause));
        current = cause.source();
    }
    if lines.is_empty() {
        "No stack available".to_string()
    } else {
        lines.join("\n")
    }
}

pub fn format_record(timestamp: &str, scenario: &str, message: &str, stack: &str) -> String {
    let message = if message.is_empty() {
        "Unknown error"
    } else {
        message
    };
    format!(
        "{}\nUser: {}\nError: {}\n\nStack: {}\n{}\n\n",
        timestamp, scenario, message, stack, RECORD_SEPARATOR
    )
}
