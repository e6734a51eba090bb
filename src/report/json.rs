use crate::error::SuiteResult;
use crate::report::report_model::SuiteReport;

/// Machine-readable report, written as `results.json`.
pub fn generate_json_report(report: &SuiteReport) -> SuiteResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
