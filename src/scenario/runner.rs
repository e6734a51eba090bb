use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::browser::driver::Driver;
use crate::browser::session::BrowserSession;
use crate::cli::commands::sanitize_filename;
use crate::cli::config::RunConfig;
use crate::error::{SuiteError, SuiteResult};
use crate::logger::diagnostic::DiagnosticLogger;
use crate::report::attachment::{Attachment, AttachmentRecord};
use crate::scenario::context::ScenarioContext;
use crate::scenario::model::{Scenario, ScenarioKind, ScenarioResult, StepRecord};
use crate::scenario::trace::TraceLogger;

/// Opens one fresh browser session per scenario attempt.
pub trait SessionFactory: Send + Sync {
    /// `artifacts_dir` is where the attempt's files land; video recording
    /// writes into it.
    fn open(&self, scenario: &Scenario, artifacts_dir: &Path) -> SuiteResult<Box<dyn Driver>>;
}

/// Launches a Playwright bridge process for each session.
pub struct BridgeSessionFactory {
    config: Arc<RunConfig>,
}

impl BridgeSessionFactory {
    pub fn new(config: Arc<RunConfig>) -> Self {
        Self { config }
    }
}

impl SessionFactory for BridgeSessionFactory {
    fn open(&self, scenario: &Scenario, artifacts_dir: &Path) -> SuiteResult<Box<dyn Driver>> {
        let video_dir = self
            .config
            .video
            .records()
            .then(|| artifacts_dir.join("video"));
        debug!(scenario = scenario.id, "launching browser session");
        let mut session = BrowserSession::launch(&self.config.bridge(video_dir))?;
        session.set_deadline(self.config.timeout());
        Ok(Box::new(session))
    }
}

/// Outcome of a single attempt, before retries are folded in.
struct AttemptOutcome {
    steps: Vec<StepRecord>,
    error: Option<String>,
    attachments: Vec<AttachmentRecord>,
}

impl AttemptOutcome {
    fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs scenarios across a pool of worker threads, retrying failures.
pub struct Runner {
    config: Arc<RunConfig>,
    logger: Arc<DiagnosticLogger>,
    factory: Arc<dyn SessionFactory>,
}

impl Runner {
    pub fn new(
        config: Arc<RunConfig>,
        logger: Arc<DiagnosticLogger>,
        factory: Arc<dyn SessionFactory>,
    ) -> Self {
        Self {
            config,
            logger,
            factory,
        }
    }

    /// Run every scenario. Results come back in input order regardless of
    /// which worker finished first.
    pub fn run(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        let batches = self.batches(scenarios);
        let workers = self.config.workers.max(1).min(batches.len().max(1));
        info!(
            scenarios = scenarios.len(),
            workers, "starting run against {}", self.config.base_url
        );

        let queue = Mutex::new(batches.into_iter());
        let slots: Mutex<Vec<Option<ScenarioResult>>> = Mutex::new(vec![None; scenarios.len()]);

        thread::scope(|scope| {
            for worker in 0..workers {
                let queue = &queue;
                let slots = &slots;
                scope.spawn(move || {
                    loop {
                        let next = match queue.lock() {
                            Ok(mut q) => q.next(),
                            Err(poisoned) => poisoned.into_inner().next(),
                        };
                        let Some(batch) = next else { break };
                        for index in batch {
                            let scenario = &scenarios[index];
                            debug!(worker, scenario = scenario.id, "picked up");
                            let result = self.run_one(scenario);
                            match slots.lock() {
                                Ok(mut s) => s[index] = Some(result),
                                Err(poisoned) => poisoned.into_inner()[index] = Some(result),
                            }
                        }
                    }
                });
            }
        });

        slots
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .into_iter()
            .flatten()
            .collect()
    }

    /// Units of work handed to a worker. With `fully_parallel` off, every
    /// scenario of a group travels in one batch so they run in order.
    fn batches(&self, scenarios: &[Scenario]) -> Vec<Vec<usize>> {
        if self.config.fully_parallel {
            return (0..scenarios.len()).map(|i| vec![i]).collect();
        }
        let mut order: Vec<Vec<usize>> = Vec::new();
        let mut by_group: HashMap<&str, usize> = HashMap::new();
        for (i, scenario) in scenarios.iter().enumerate() {
            let slot = *by_group.entry(scenario.group).or_insert_with(|| {
                order.push(Vec::new());
                order.len() - 1
            });
            order[slot].push(i);
        }
        order
    }

    /// Run one scenario, retrying up to `retries` extra times.
    pub fn run_one(&self, scenario: &Scenario) -> ScenarioResult {
        let started = Instant::now();
        let max_attempts = self.config.retries + 1;
        let mut attempt = 1;

        loop {
            let outcome = self.run_attempt(scenario, attempt);
            if outcome.passed() || attempt >= max_attempts {
                let passed = outcome.passed();
                if passed {
                    info!("  ✓ {} ({} attempt(s))", scenario.full_title(), attempt);
                } else {
                    info!("  ✗ {}", scenario.full_title());
                }
                return ScenarioResult {
                    id: scenario.id.to_string(),
                    title: scenario.title.to_string(),
                    group: scenario.group.to_string(),
                    passed,
                    attempts: attempt,
                    duration_ms: started.elapsed().as_millis() as u64,
                    steps: outcome.steps,
                    error: outcome.error,
                    attachments: outcome.attachments,
                };
            }
            warn!(
                scenario = scenario.id,
                attempt,
                "attempt failed, retrying: {}",
                outcome.error.as_deref().unwrap_or("unknown error")
            );
            attempt += 1;
        }
    }

    fn run_attempt(&self, scenario: &Scenario, attempt: u32) -> AttemptOutcome {
        let dir = self.attempt_dir(scenario, attempt);
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("could not create {}: {}", dir.display(), e);
        }

        let driver = match scenario.kind {
            ScenarioKind::Ui => match self.factory.open(scenario, &dir) {
                Ok(driver) => Some(driver),
                Err(e) => {
                    self.logger.log_error(
                        &format!("Test failed: {}", scenario.full_title()),
                        &e,
                        None,
                    );
                    remove_if_empty(&dir);
                    return AttemptOutcome {
                        steps: Vec::new(),
                        error: Some(e.to_string()),
                        attachments: Vec::new(),
                    };
                }
            },
            ScenarioKind::Api => None,
        };

        let trace_path = dir.join("trace.jsonl");
        let mut ctx = ScenarioContext::new(
            scenario.full_title(),
            driver,
            Arc::clone(&self.logger),
            Arc::clone(&self.config),
        )
        .with_attempt(attempt);
        if self.config.trace.records() {
            ctx = ctx.with_trace(TraceLogger::new(&trace_path));
        }

        let result = (scenario.body)(&mut ctx);
        let passed = result.is_ok();

        if let Err(e) = &result {
            ctx.log_failure(e, true);
        }
        if ctx.has_session() && self.config.screenshot.keeps(passed) {
            ctx.attach_screenshot("screenshot");
        }

        let (steps, report) = ctx.finish();
        let attachments = persist_attachments(&dir, report.take());

        if self.config.trace.records() && !self.config.trace.keeps(passed) {
            let _ = fs::remove_file(&trace_path);
        }
        let video_dir = dir.join("video");
        if self.config.video.records() && !self.config.video.keeps(passed) && video_dir.exists() {
            if let Err(e) = fs::remove_dir_all(&video_dir) {
                debug!("could not drop video for {}: {}", scenario.id, e);
            }
        }
        remove_if_empty(&dir);

        AttemptOutcome {
            steps,
            error: result.err().map(|e| e.to_string()),
            attachments,
        }
    }

    /// `<output_dir>/<id>` for the first attempt, `<id>-retryN` after.
    pub fn attempt_dir(&self, scenario: &Scenario, attempt: u32) -> PathBuf {
        let mut name = sanitize_filename(scenario.id);
        if attempt > 1 {
            name.push_str(&format!("-retry{}", attempt - 1));
        }
        self.config.output_dir.join(name)
    }
}

/// Write attachment bodies next to the results and return their records.
fn persist_attachments(dir: &Path, attachments: Vec<Attachment>) -> Vec<AttachmentRecord> {
    attachments
        .into_iter()
        .enumerate()
        .filter_map(|(i, attachment)| {
            let file = dir.join(format!(
                "{}-{}.{}",
                i,
                sanitize_filename(&attachment.name),
                extension_for(&attachment.content_type)
            ));
            match write_attachment(&file, &attachment.body) {
                Ok(()) => Some(AttachmentRecord {
                    name: attachment.name,
                    content_type: attachment.content_type,
                    path: file.display().to_string(),
                }),
                Err(e) => {
                    warn!("could not save attachment '{}': {}", attachment.name, e);
                    None
                }
            }
        })
        .collect()
}

fn write_attachment(path: &Path, body: &[u8]) -> SuiteResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body).map_err(SuiteError::from)
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "application/json" => "json",
        "text/html" => "html",
        _ => "txt",
    }
}

fn remove_if_empty(dir: &Path) {
    let empty = fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if empty {
        let _ = fs::remove_dir(dir);
    }
}
