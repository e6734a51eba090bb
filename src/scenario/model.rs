use serde::{Deserialize, Serialize};

use crate::error::SuiteResult;
use crate::report::attachment::AttachmentRecord;
use crate::scenario::context::ScenarioContext;

/// Whether a scenario needs a browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Ui,
    Api,
}

pub type ScenarioFn = fn(&mut ScenarioContext) -> SuiteResult<()>;

/// One independent user journey: ordered steps and assertions run against
/// a fresh session.
#[derive(Clone)]
pub struct Scenario {
    /// Stable identifier, e.g. `TC-001`
    pub id: &'static str,
    pub title: &'static str,
    /// Suite section, e.g. `Category Filtering`
    pub group: &'static str,
    pub kind: ScenarioKind,
    pub body: ScenarioFn,
}

impl Scenario {
    pub const fn ui(
        id: &'static str,
        title: &'static str,
        group: &'static str,
        body: ScenarioFn,
    ) -> Self {
        Self {
            id,
            title,
            group,
            kind: ScenarioKind::Ui,
            body,
        }
    }

    pub const fn api(
        id: &'static str,
        title: &'static str,
        group: &'static str,
        body: ScenarioFn,
    ) -> Self {
        Self {
            id,
            title,
            group,
            kind: ScenarioKind::Api,
            body,
        }
    }

    /// `TC-001: Verify ...`
    pub fn full_title(&self) -> String {
        format!("{}: {}", self.id, self.title)
    }

    /// Case-insensitive substring match on id, title, or group.
    pub fn matches(&self, pattern: &str) -> bool {
        let pattern = pattern.to_lowercase();
        self.id.to_lowercase().contains(&pattern)
            || self.title.to_lowercase().contains(&pattern)
            || self.group.to_lowercase().contains(&pattern)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("group", &self.group)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Outcome of one named step inside a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    pub name: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running one scenario, retries included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub id: String,
    pub title: String,
    pub group: String,

    /// Whether the final attempt passed
    pub passed: bool,

    /// Attempts made, 1 when the first one passed
    pub attempts: u32,

    pub duration_ms: u64,

    /// Steps of the final attempt
    pub steps: Vec<StepRecord>,

    /// Error that failed the final attempt
    pub error: Option<String>,

    #[serde(default)]
    pub attachments: Vec<AttachmentRecord>,
}

impl ScenarioResult {
    pub fn full_title(&self) -> String {
        format!("{}: {}", self.id, self.title)
    }

    /// Passed, but only after at least one retry.
    pub fn is_flaky(&self) -> bool {
        self.passed && self.attempts > 1
    }
}
