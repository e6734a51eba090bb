use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::browser::protocol::LaunchOptions;
use crate::browser::session::BridgeConfig;
use crate::error::{SuiteError, SuiteResult};
use crate::page::selectors::Timings;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "discover-e2e",
    version,
    about = "End-to-end UI and API checks for the TMDB discover catalog"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: discover-e2e.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run browser scenarios against the catalog site
    Run {
        /// Only scenarios whose id, title, or group contains this text
        #[arg(long)]
        grep: Option<String>,

        /// Only scenarios in this group
        #[arg(long)]
        group: Option<String>,

        /// Run exactly one scenario by id (rejected on CI)
        #[arg(long)]
        only: Option<String>,

        /// Parallel browser sessions
        #[arg(long)]
        workers: Option<usize>,

        /// Retries per failing scenario
        #[arg(long)]
        retries: Option<u32>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Override the site under test
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Run REST API scenarios
    Api {
        /// API key (falls back to TMDB_API_KEY, then the config file)
        #[arg(long)]
        api_key: Option<String>,

        #[arg(long)]
        grep: Option<String>,
    },

    /// List known scenarios
    List,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// When a run artifact is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMode {
    Off,
    On,
    OnlyOnFailure,
    RetainOnFailure,
}

impl CaptureMode {
    /// Whether to record while the scenario runs.
    pub fn records(self) -> bool {
        matches!(self, CaptureMode::On | CaptureMode::RetainOnFailure)
    }

    /// Whether to keep what was captured, given the outcome.
    pub fn keeps(self, passed: bool) -> bool {
        match self {
            CaptureMode::Off => false,
            CaptureMode::On => true,
            CaptureMode::OnlyOnFailure | CaptureMode::RetainOnFailure => !passed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reporter {
    List,
    Html,
    Json,
    Junit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Optional YAML config file: `discover-e2e.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub base_url: String,

    /// Upper bound for one scenario attempt
    pub timeout_ms: u64,
    pub retries: u32,
    pub workers: usize,
    /// When false, scenarios of one group share a worker and run in order
    pub fully_parallel: bool,
    /// Reject `--only` filters
    pub forbid_only: bool,

    pub action_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    pub expect_timeout_ms: u64,

    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: String,
    pub ignore_https_errors: bool,
    pub browser_args: Vec<String>,

    pub trace: CaptureMode,
    pub screenshot: CaptureMode,
    pub video: CaptureMode,

    pub output_dir: PathBuf,
    pub report_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub reporters: Vec<Reporter>,

    pub node_binary: String,
    pub bridge_script: String,

    pub api: ApiConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tmdb-discover.surge.sh".to_string(),
            timeout_ms: 30_000,
            retries: 0,
            workers: default_workers(),
            fully_parallel: true,
            forbid_only: false,
            action_timeout_ms: 10_000,
            navigation_timeout_ms: 30_000,
            expect_timeout_ms: 5_000,
            headless: true,
            viewport: Viewport::default(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
            ignore_https_errors: true,
            browser_args: vec![
                "--disable-web-security".to_string(),
                "--disable-features=IsolateOrigins,site-per-process".to_string(),
            ],
            trace: CaptureMode::RetainOnFailure,
            screenshot: CaptureMode::OnlyOnFailure,
            video: CaptureMode::RetainOnFailure,
            output_dir: PathBuf::from("test-results"),
            report_dir: PathBuf::from("playwright-report"),
            logs_dir: PathBuf::from("logs"),
            reporters: vec![
                Reporter::List,
                Reporter::Html,
                Reporter::Json,
                Reporter::Junit,
            ],
            node_binary: "node".to_string(),
            bridge_script: "node/browser_server.js".to_string(),
            api: ApiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub language: String,
    pub sort_by: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: None,
            language: "en-US".to_string(),
            sort_by: "popularity.desc".to_string(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl RunConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Page object waits, with the configured default action bound.
    pub fn timings(&self) -> Timings {
        Timings {
            action: Duration::from_millis(self.action_timeout_ms),
            ..Timings::default()
        }
    }

    pub fn bridge(&self, video_dir: Option<PathBuf>) -> BridgeConfig {
        BridgeConfig {
            node_binary: self.node_binary.clone(),
            script: self.bridge_script.clone(),
            launch: LaunchOptions {
                headless: self.headless,
                viewport_width: self.viewport.width,
                viewport_height: self.viewport.height,
                user_agent: self.user_agent.clone(),
                ignore_https_errors: self.ignore_https_errors,
                args: self.browser_args.clone(),
                video_dir: video_dir.map(|p| p.display().to_string()),
            },
        }
    }

    /// Apply `ENV`, `DEBUG`, `CI`, and `TMDB_API_KEY` overrides.
    pub fn apply_env(&mut self, env: &dyn Fn(&str) -> Option<String>) {
        if env("CI").is_some_and(|v| !v.is_empty()) {
            self.forbid_only = true;
            self.retries = 2;
            self.workers = 2;
        }

        match env("ENV").as_deref() {
            Some("dev") => {
                self.base_url = "http://localhost:3000".to_string();
                self.video = CaptureMode::Off;
                self.workers = 1;
            }
            Some("staging") => {
                self.base_url = "https://staging.tmdb-discover.surge.sh".to_string();
            }
            Some("production") => {
                self.base_url = "https://tmdb-discover.surge.sh".to_string();
            }
            _ => {}
        }

        if env("DEBUG").as_deref() == Some("true") {
            self.workers = 1;
            self.headless = false;
            self.video = CaptureMode::On;
            self.trace = CaptureMode::On;
        }

        if let Some(key) = env("TMDB_API_KEY").filter(|k| !k.is_empty()) {
            self.api.api_key = Some(key);
        }
    }

    /// Command-line flags win over file and environment.
    pub fn apply_run_flags(
        &mut self,
        workers: Option<usize>,
        retries: Option<u32>,
        headed: bool,
        base_url: Option<String>,
    ) {
        if let Some(workers) = workers {
            self.workers = workers;
        }
        if let Some(retries) = retries {
            self.retries = retries;
        }
        if headed {
            self.headless = false;
        }
        if let Some(url) = base_url {
            self.base_url = url;
        }
    }

    pub fn validate(&self) -> SuiteResult<()> {
        if self.workers == 0 {
            return Err(SuiteError::Config("workers must be at least 1".into()));
        }
        if self.timeout_ms == 0 {
            return Err(SuiteError::Config("timeout_ms must be positive".into()));
        }
        if self.base_url.is_empty() {
            return Err(SuiteError::Config("base_url must not be empty".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Config Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults when the default file is
/// missing; an explicitly named file must exist and parse.
pub fn load_config(path: Option<&str>) -> SuiteResult<RunConfig> {
    let config_path = path.unwrap_or("discover-e2e.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => Ok(serde_yaml::from_str(&content)?),
        Err(_) if path.is_none() => Ok(RunConfig::default()),
        Err(e) => Err(SuiteError::Config(format!(
            "cannot read {}: {}",
            config_path, e
        ))),
    }
}

/// Defaults, then file, then process environment.
pub fn resolve_config(path: Option<&str>) -> SuiteResult<RunConfig> {
    let mut config = load_config(path)?;
    config.apply_env(&|key: &str| std::env::var(key).ok());
    Ok(config)
}
