use std::path::PathBuf;

use thiserror::Error;

/// Every failure a scenario, the page object, or the run plumbing can raise.
#[derive(Error, Debug)]
pub enum SuiteError {
    /// Target never reached the required state within its bounded wait
    #[error("Timed out after {timeout_ms}ms waiting for {locator}")]
    LocatorTimeout { locator: String, timeout_ms: u64 },

    /// Page load or network failure
    #[error("Navigation to {url} failed: {reason}")]
    NavigationFailure { url: String, reason: String },

    /// Expected condition was false at check time
    #[error("Assertion failed: {0}")]
    AssertionFailure(String),

    /// The diagnostic sink itself failed. Only ever reported to the console.
    #[error("Could not write log file {}: {source}", path.display())]
    LogWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Whole-scenario deadline elapsed
    #[error("Scenario exceeded its {timeout_ms}ms timeout")]
    ScenarioTimeout { timeout_ms: u64 },

    /// Bridge process could not be started
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SpawnBridge {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the bridge process failed
    #[error("Browser session IO error: {0}")]
    Session(String),

    /// Bridge answered a command with a failure
    #[error("Browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// API answered with a non-success status
    #[error("API request to {endpoint} returned HTTP {status}")]
    ApiStatus { endpoint: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SuiteError {
    /// True for bounded-wait expiry on a single locator.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SuiteError::LocatorTimeout { .. })
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        SuiteError::AssertionFailure(message.into())
    }
}

pub type SuiteResult<T> = Result<T, SuiteError>;
