use crate::report::report_model::SuiteReport;

// ============================================================================
// Console reporter — list-style terminal output
// ============================================================================

/// Format a suite report for terminal output.
///
/// Produces output like:
/// ```text
/// === Test Suite: TMDB Discover ===
///
/// Category Filtering
///   ✓ PASS  TC-001: Verify Popular category displays content (4.2s)
///   ✗ FAIL  TC-002: Verify Trending category displays content (31.0s, 3 attempts)
///       [FAIL] Verify content is displayed for Trending category — Assertion failed: ...
///
/// === Results: 1 passed, 1 failed, 0 flaky (2 total) in 35.2s ===
/// ```
pub fn format_console_report(report: &SuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Test Suite: {} ===\n", report.suite_name));

    for (group, results) in report.groups() {
        out.push_str(&format!("\n{}\n", group));

        for result in results {
            let marker = match (result.passed, result.is_flaky()) {
                (true, true) => "~ FLAKY",
                (true, false) => "\u{2713} PASS",
                (false, _) => "\u{2717} FAIL",
            };
            let attempts = if result.attempts > 1 {
                format!(", {} attempts", result.attempts)
            } else {
                String::new()
            };

            out.push_str(&format!(
                "  {}  {} ({:.1}s{})\n",
                marker,
                result.full_title(),
                result.duration_ms as f64 / 1000.0,
                attempts
            ));

            if result.passed {
                continue;
            }
            match result.steps.iter().find(|s| !s.passed) {
                Some(step) => out.push_str(&format!(
                    "      [FAIL] {} — {}\n",
                    step.name,
                    step.error.as_deref().unwrap_or("step failed")
                )),
                None => {
                    if let Some(ref error) = result.error {
                        out.push_str(&format!("      [ERROR] {}\n", error));
                    }
                }
            }
            for attachment in &result.attachments {
                out.push_str(&format!("      attachment: {}\n", attachment.path));
            }
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed, {} flaky ({} total)",
        report.passed, report.failed, report.flaky, report.total
    ));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    out
}

/// One line per scenario for `list`: id, group, title.
pub fn format_scenario_list<'a>(
    scenarios: impl IntoIterator<Item = &'a crate::scenario::model::Scenario>,
) -> String {
    let mut out = String::new();
    let mut count = 0;
    for scenario in scenarios {
        out.push_str(&format!(
            "{:<8} [{}] {}\n",
            scenario.id, scenario.group, scenario.title
        ));
        count += 1;
    }
    out.push_str(&format!("\n{} scenario(s)\n", count));
    out
}
