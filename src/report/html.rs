use std::path::Path;

use crate::report::report_model::SuiteReport;
use crate::scenario::model::ScenarioResult;

// ============================================================================
// HTML reporter — self-contained HTML report
// ============================================================================

/// Generate a self-contained HTML report.
///
/// Features:
/// - Green/red header based on overall pass/fail
/// - Summary bar with pass/fail/flaky/total counts
/// - One section per group, one card per scenario with its steps
/// - Failed steps highlighted in red, attachments linked relative to
///   `report_dir`
/// - Inline CSS (no external dependencies)
pub fn generate_html_report(report: &SuiteReport, report_dir: &Path) -> String {
    let header_color = if report.all_passed() {
        "#4CAF50"
    } else {
        "#f44336"
    };

    let status_text = if report.all_passed() {
        "ALL TESTS PASSED"
    } else {
        "SOME TESTS FAILED"
    };

    let duration_text = report
        .duration_ms
        .map(|ms| format!(" in {:.1}s", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut sections = String::new();
    for (group, results) in report.groups() {
        sections.push_str(&format!("<h2>{}</h2>\n", escape_html(group)));
        for result in results {
            sections.push_str(&scenario_card(result, report_dir));
        }
    }

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{suite_name} — Test Report</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; padding: 0; background: #f5f5f5; }}
.header {{ background: {header_color}; color: white; padding: 20px 30px; }}
.header h1 {{ margin: 0 0 8px 0; font-size: 24px; }}
.header p {{ margin: 0; font-size: 16px; opacity: 0.9; }}
.content {{ max-width: 960px; margin: 20px auto; padding: 0 20px; }}
.content h2 {{ font-size: 18px; color: #333; margin: 24px 0 8px 0; }}
.test-case {{ background: white; border-radius: 6px; padding: 16px 20px; margin-bottom: 12px; border-left: 4px solid #ccc; }}
.test-case.pass {{ border-left-color: #4CAF50; }}
.test-case.flaky {{ border-left-color: #FF9800; }}
.test-case.fail {{ border-left-color: #f44336; }}
.test-case h3 {{ margin: 0 0 8px 0; font-size: 16px; }}
.test-case p {{ margin: 4px 0; color: #666; font-size: 14px; }}
.test-case .error {{ color: #f44336; font-weight: bold; }}
.steps {{ margin: 8px 0 0 0; padding-left: 20px; }}
.steps li {{ font-size: 13px; margin-bottom: 4px; color: #555; }}
.steps li.failed {{ color: #c62828; }}
.attachments img {{ max-width: 100%; border: 1px solid #ddd; margin-top: 8px; }}
</style>
</head>
<body>
<div class="header">
<h1>{status_text}</h1>
<p>{suite_name}: {passed} passed, {failed} failed, {flaky} flaky ({total} total){duration}</p>
</div>
<div class="content">
{sections}
</div>
</body>
</html>"##,
        suite_name = escape_html(&report.suite_name),
        header_color = header_color,
        status_text = status_text,
        passed = report.passed,
        failed = report.failed,
        flaky = report.flaky,
        total = report.total,
        duration = duration_text,
        sections = sections,
    )
}

fn scenario_card(result: &ScenarioResult, report_dir: &Path) -> String {
    let (class, marker) = match (result.passed, result.is_flaky()) {
        (true, true) => ("flaky", "~"),
        (true, false) => ("pass", "\u{2713}"),
        (false, _) => ("fail", "\u{2717}"),
    };

    let mut card = format!(
        r#"<div class="test-case {class}">
<h3>{marker} {name}</h3>
<p>Duration: {secs:.1}s | Attempts: {attempts}</p>
"#,
        class = class,
        marker = marker,
        name = escape_html(&result.full_title()),
        secs = result.duration_ms as f64 / 1000.0,
        attempts = result.attempts,
    );

    if let Some(ref error) = result.error {
        card.push_str(&format!(
            "<p class=\"error\">Error: {}</p>\n",
            escape_html(error)
        ));
    }

    if !result.steps.is_empty() {
        card.push_str("<ul class=\"steps\">\n");
        for step in &result.steps {
            match &step.error {
                Some(error) if !step.passed => card.push_str(&format!(
                    "<li class=\"failed\">{} ({} ms): {}</li>\n",
                    escape_html(&step.name),
                    step.duration_ms,
                    escape_html(error)
                )),
                _ => card.push_str(&format!(
                    "<li>{} ({} ms)</li>\n",
                    escape_html(&step.name),
                    step.duration_ms
                )),
            }
        }
        card.push_str("</ul>\n");
    }

    if !result.attachments.is_empty() {
        card.push_str("<div class=\"attachments\">\n");
        for attachment in &result.attachments {
            let href = escape_html(&relative_href(&attachment.path, report_dir));
            if attachment.content_type.starts_with("image/") {
                card.push_str(&format!(
                    "<p>{}</p><img src=\"{}\" alt=\"{}\">\n",
                    escape_html(&attachment.name),
                    href,
                    escape_html(&attachment.name)
                ));
            } else {
                card.push_str(&format!(
                    "<p><a href=\"{}\">{}</a></p>\n",
                    href,
                    escape_html(&attachment.name)
                ));
            }
        }
        card.push_str("</div>\n");
    }

    card.push_str("</div>\n");
    card
}

/// Link target for an attachment as seen from the report directory.
fn relative_href(path: &str, report_dir: &Path) -> String {
    let path = Path::new(path);
    if path.is_absolute() {
        return format!("file://{}", path.display());
    }
    let depth = report_dir
        .components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .count();
    let mut href = "../".repeat(depth);
    href.push_str(&path.display().to_string().replace('\\', "/"));
    href
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
