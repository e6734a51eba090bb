use crate::report::report_model::SuiteReport;
use crate::scenario::model::ScenarioResult;

// ============================================================================
// JUnit XML reporter — standard CI integration format
// ============================================================================

/// Generate a JUnit XML report for CI systems (Jenkins, GitHub Actions, GitLab CI).
///
/// Produces standard JUnit XML:
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="..." tests="2" failures="1" time="12.345">
///   <testcase name="TC-001: ..." classname="discover-e2e.Category Filtering" time="4.100" />
///   <testcase name="TC-002: ..." classname="discover-e2e.Category Filtering" time="8.245">
///     <failure message="Assertion failed: ..." type="AssertionFailure">
///       Verify content is displayed: Assertion failed: ...
///     </failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &SuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.results {
        let name = escape_xml(&result.full_title());
        let classname = escape_xml(&format!("discover-e2e.{}", result.group));
        let time = result.duration_ms as f64 / 1000.0;

        if result.passed {
            cases.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"{}\" time=\"{:.3}\" />\n",
                name, classname, time
            ));
            continue;
        }

        let message = result
            .error
            .clone()
            .unwrap_or_else(|| "execution error".to_string());

        cases.push_str(&format!(
            "  <testcase name=\"{name}\" classname=\"{classname}\" time=\"{time:.3}\">\n    <failure message=\"{message}\" type=\"{kind}\">{body}</failure>\n  </testcase>\n",
            name = name,
            classname = classname,
            time = time,
            message = escape_xml(&message),
            kind = failure_type(&message),
            body = escape_xml(&failure_body(result)),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

fn failure_type(message: &str) -> &'static str {
    if message.starts_with("Assertion failed") {
        "AssertionFailure"
    } else if message.starts_with("Timed out") || message.contains("timeout") {
        "Timeout"
    } else {
        "Error"
    }
}

/// Failed steps, then the final error.
fn failure_body(result: &ScenarioResult) -> String {
    let mut lines: Vec<String> = result
        .steps
        .iter()
        .filter(|s| !s.passed)
        .map(|s| format!("{}: {}", s.name, s.error.as_deref().unwrap_or("step failed")))
        .collect();
    if let Some(ref error) = result.error {
        lines.push(format!("Error: {}", error));
    }
    if result.attempts > 1 {
        lines.push(format!("Attempts: {}", result.attempts));
    }
    lines.join("\n")
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
