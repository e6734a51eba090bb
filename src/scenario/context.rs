use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::browser::driver::Driver;
use crate::cli::config::RunConfig;
use crate::error::{SuiteError, SuiteResult};
use crate::logger::diagnostic::DiagnosticLogger;
use crate::page::home::HomePage;
use crate::report::attachment::ReportContext;
use crate::scenario::model::StepRecord;
use crate::scenario::trace::{TraceEvent, TraceLogger};

/// Everything one scenario attempt owns: its session, the shared logger,
/// the active report context, and the step log.
pub struct ScenarioContext {
    scenario: String,
    attempt: u32,
    driver: Option<Box<dyn Driver>>,
    logger: Arc<DiagnosticLogger>,
    report: ReportContext,
    config: Arc<RunConfig>,
    steps: Vec<StepRecord>,
    trace: Option<TraceLogger>,
}

impl ScenarioContext {
    pub fn new(
        scenario: impl Into<String>,
        driver: Option<Box<dyn Driver>>,
        logger: Arc<DiagnosticLogger>,
        config: Arc<RunConfig>,
    ) -> Self {
        Self {
            scenario: scenario.into(),
            attempt: 1,
            driver,
            logger,
            report: ReportContext::new(),
            config,
            steps: Vec::new(),
            trace: None,
        }
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    pub fn with_trace(mut self, trace: TraceLogger) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn logger(&self) -> &DiagnosticLogger {
        &self.logger
    }

    pub fn report(&self) -> &ReportContext {
        &self.report
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.logger.info(message);
    }

    pub fn has_session(&self) -> bool {
        self.driver.is_some()
    }

    /// Run a browser step against the home page object.
    pub fn step<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut HomePage<'_>) -> SuiteResult<T>,
    ) -> SuiteResult<T> {
        let started = Instant::now();
        let result = match self.driver.as_deref_mut() {
            Some(driver) => {
                let mut page = HomePage::new(driver, &self.logger, self.config.base_url.clone())
                    .with_report(&self.report)
                    .with_timings(self.config.timings());
                f(&mut page)
            }
            None => Err(SuiteError::InvalidArgument(format!(
                "step '{}' needs a browser session",
                name
            ))),
        };
        self.record(name, started, &result);
        result
    }

    /// Run a step that needs no browser, e.g. an HTTP call.
    pub fn check<T>(&mut self, name: &str, f: impl FnOnce() -> SuiteResult<T>) -> SuiteResult<T> {
        let started = Instant::now();
        let result = f();
        self.record(name, started, &result);
        result
    }

    fn record<T>(&mut self, name: &str, started: Instant, result: &SuiteResult<T>) {
        let record = StepRecord {
            name: name.to_string(),
            passed: result.is_ok(),
            duration_ms: started.elapsed().as_millis() as u64,
            error: result.as_ref().err().map(|e| e.to_string()),
        };
        debug!(scenario = %self.scenario, step = name, passed = record.passed, "step finished");

        if let Some(trace) = &self.trace {
            trace.log(&TraceEvent::from_step(
                &self.scenario,
                self.attempt,
                self.steps.len(),
                &record,
            ));
        }
        self.steps.push(record);
    }

    /// Route a scenario failure through the diagnostic logger, with a page
    /// screenshot when `with_screenshot` and a session is open.
    pub fn log_failure(&mut self, err: &SuiteError, with_screenshot: bool) {
        let label = format!("Test failed: {}", self.scenario);
        match self.driver.as_deref_mut() {
            Some(page) if with_screenshot => {
                self.logger
                    .log_error_with_page(&label, err, page, Some(&self.report));
            }
            _ => self.logger.log_error(&label, err, Some(&self.report)),
        }
    }

    /// Capture a viewport screenshot into the report.
    pub fn attach_screenshot(&mut self, name: &str) {
        let Some(driver) = self.driver.as_deref_mut() else {
            return;
        };
        if driver.is_closed() {
            return;
        }
        match driver.screenshot(false) {
            Ok(png) => {
                if let Err(e) = self.report.attach(name, "image/png", png) {
                    debug!("could not attach screenshot: {}", e);
                }
            }
            Err(e) => debug!("could not take screenshot: {}", e),
        }
    }

    /// Close the session and hand back the step log.
    pub fn finish(mut self) -> (Vec<StepRecord>, ReportContext) {
        if let Some(mut driver) = self.driver.take() {
            if let Err(e) = driver.close() {
                info!("closing session for {} failed: {}", self.scenario, e);
            }
        }
        (self.steps, self.report)
    }
}
