use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::api::scenarios::api_scenarios;
use crate::cli::config::{Reporter, RunConfig};
use crate::error::{SuiteError, SuiteResult};
use crate::logger::diagnostic::DiagnosticLogger;
use crate::report::console::{format_console_report, format_scenario_list};
use crate::report::html::generate_html_report;
use crate::report::json::generate_json_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::SuiteReport;
use crate::scenario::catalog::ui_scenarios;
use crate::scenario::model::Scenario;
use crate::scenario::runner::{BridgeSessionFactory, Runner, SessionFactory};

pub const UI_SUITE: &str = "TMDB Discover - Comprehensive Test Suite";
pub const API_SUITE: &str = "TMDB API Automation Tests";

// ============================================================================
// Scenario selection
// ============================================================================

/// `--grep`, `--group`, and `--only` from the command line.
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    pub grep: Option<String>,
    pub group: Option<String>,
    pub only: Option<String>,
}

impl ScenarioFilter {
    /// `--only` is refused when the config forbids it (CI).
    pub fn check_allowed(&self, config: &RunConfig) -> SuiteResult<()> {
        if config.forbid_only && self.only.is_some() {
            return Err(SuiteError::Config(
                "--only is not allowed when forbid_only is set (CI)".into(),
            ));
        }
        Ok(())
    }

    pub fn apply(&self, scenarios: Vec<Scenario>) -> Vec<Scenario> {
        scenarios
            .into_iter()
            .filter(|s| {
                self.only
                    .as_deref()
                    .is_none_or(|id| s.id.eq_ignore_ascii_case(id))
            })
            .filter(|s| {
                self.group
                    .as_deref()
                    .is_none_or(|g| s.group.eq_ignore_ascii_case(g))
            })
            .filter(|s| self.grep.as_deref().is_none_or(|p| s.matches(p)))
            .collect()
    }
}

// ============================================================================
// run subcommand
// ============================================================================

/// Run browser scenarios and return whether all passed.
pub fn cmd_run(config: RunConfig, filter: &ScenarioFilter) -> SuiteResult<bool> {
    config.validate()?;
    filter.check_allowed(&config)?;

    let scenarios = filter.apply(ui_scenarios());
    if scenarios.is_empty() {
        warn!("No scenarios matched the given filters");
        return Ok(true);
    }

    let config = Arc::new(config);
    let factory: Arc<dyn SessionFactory> = Arc::new(BridgeSessionFactory::new(Arc::clone(&config)));
    run_suite(UI_SUITE, &scenarios, config, factory)
}

// ============================================================================
// api subcommand
// ============================================================================

/// Run API scenarios and return whether all passed.
pub fn cmd_api(config: RunConfig, filter: &ScenarioFilter) -> SuiteResult<bool> {
    config.validate()?;
    filter.check_allowed(&config)?;
    if config.api.api_key.is_none() {
        return Err(SuiteError::Config(
            "no TMDB API key; set TMDB_API_KEY, api.api_key, or pass --api-key".into(),
        ));
    }

    let scenarios = filter.apply(api_scenarios());
    if scenarios.is_empty() {
        warn!("No scenarios matched the given filters");
        return Ok(true);
    }

    let config = Arc::new(config);
    // API scenarios never ask for a session
    let factory: Arc<dyn SessionFactory> = Arc::new(BridgeSessionFactory::new(Arc::clone(&config)));
    run_suite(API_SUITE, &scenarios, config, factory)
}

// ============================================================================
// list subcommand
// ============================================================================

pub fn cmd_list() {
    let ui = ui_scenarios();
    let api = api_scenarios();
    print!("{}", format_scenario_list(ui.iter().chain(api.iter())));
}

// ============================================================================
// Shared
// ============================================================================

/// Run `scenarios` through a runner and write every configured report.
pub fn run_suite(
    suite_name: &str,
    scenarios: &[Scenario],
    config: Arc<RunConfig>,
    factory: Arc<dyn SessionFactory>,
) -> SuiteResult<bool> {
    let logger = Arc::new(DiagnosticLogger::new(&config.logs_dir));
    let runner = Runner::new(Arc::clone(&config), logger, factory);

    let start = Instant::now();
    let results = runner.run(scenarios);
    let report =
        SuiteReport::from_results(suite_name, results).with_duration(start.elapsed().as_millis());

    write_reports(&report, &config)?;
    Ok(report.all_passed())
}

/// Emit each configured reporter. Returns the files written.
pub fn write_reports(report: &SuiteReport, config: &RunConfig) -> SuiteResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for reporter in &config.reporters {
        match reporter {
            Reporter::List => print!("{}", format_console_report(report)),
            Reporter::Html => {
                let path = config.report_dir.join("index.html");
                write_file(&path, &generate_html_report(report, &config.report_dir))?;
                written.push(path);
            }
            Reporter::Json => {
                let path = config.output_dir.join("results.json");
                write_file(&path, &generate_json_report(report)?)?;
                written.push(path);
            }
            Reporter::Junit => {
                let path = config.output_dir.join("junit.xml");
                write_file(&path, &generate_junit_xml(report))?;
                written.push(path);
            }
        }
    }
    for path in &written {
        info!("report written: {}", path.display());
    }
    Ok(written)
}

fn write_file(path: &Path, content: &str) -> SuiteResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Sanitize a scenario id or attachment name into a safe filename.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase()
}
