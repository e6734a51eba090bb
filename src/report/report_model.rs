use serde::{Deserialize, Serialize};

use crate::scenario::model::ScenarioResult;

// ============================================================================
// Suite report — aggregates ScenarioResult instances
// ============================================================================

/// Aggregated report for one run.
///
/// Built from the runner's results via `from_results()`. Consumed by the
/// console, HTML, JUnit, and JSON reporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite_name: String,

    pub total: usize,

    pub passed: usize,

    pub failed: usize,

    /// Passed only after a retry
    pub flaky: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    /// Totals are computed from `results`; flaky scenarios count as passed.
    pub fn from_results(suite_name: &str, results: Vec<ScenarioResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let flaky = results.iter().filter(|r| r.is_flaky()).count();
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed: total - passed,
            flaky,
            duration_ms: None,
            results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Results in first-seen group order.
    pub fn groups(&self) -> Vec<(&str, Vec<&ScenarioResult>)> {
        let mut groups: Vec<(&str, Vec<&ScenarioResult>)> = Vec::new();
        for result in &self.results {
            match groups.iter_mut().find(|(name, _)| *name == result.group) {
                Some((_, members)) => members.push(result),
                None => groups.push((result.group.as_str(), vec![result])),
            }
        }
        groups
    }
}
