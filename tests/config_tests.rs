use std::collections::HashMap;
use std::time::Duration;

use clap::Parser;
use discover_e2e::cli::commands::{ScenarioFilter, sanitize_filename};
use discover_e2e::cli::config::{
    CaptureMode, Cli, Commands, Reporter, RunConfig, load_config,
};
use discover_e2e::error::SuiteError;
use discover_e2e::scenario::catalog::ui_scenarios;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// =========================================================================
// Defaults and file
// =========================================================================

#[test]
fn defaults_follow_the_run_configuration() {
    let config = RunConfig::default();
    assert_eq!(config.base_url, "https://tmdb-discover.surge.sh");
    assert_eq!(config.timeout(), Duration::from_secs(30));
    assert_eq!(config.retries, 0);
    assert!(config.fully_parallel);
    assert!(!config.forbid_only);
    assert_eq!((config.viewport.width, config.viewport.height), (1280, 720));
    assert_eq!(config.trace, CaptureMode::RetainOnFailure);
    assert_eq!(config.screenshot, CaptureMode::OnlyOnFailure);
    assert_eq!(config.video, CaptureMode::RetainOnFailure);
    assert_eq!(
        config.reporters,
        vec![Reporter::List, Reporter::Html, Reporter::Json, Reporter::Junit]
    );
    assert_eq!(config.api.language, "en-US");
    assert_eq!(config.api.sort_by, "popularity.desc");
}

#[test]
fn yaml_file_overrides_only_what_it_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("discover-e2e.yaml");
    std::fs::write(
        &path,
        "base_url: http://localhost:4000\nretries: 1\nvideo: \"off\"\nviewport:\n  width: 1920\n  height: 1080\napi:\n  language: de-DE\n",
    )
    .unwrap();

    let config = load_config(path.to_str()).unwrap();
    assert_eq!(config.base_url, "http://localhost:4000");
    assert_eq!(config.retries, 1);
    assert_eq!(config.video, CaptureMode::Off);
    assert_eq!(config.viewport.width, 1920);
    assert_eq!(config.api.language, "de-DE");
    assert_eq!(config.api.sort_by, "popularity.desc");
    assert_eq!(config.timeout_ms, 30_000);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let err = load_config(Some("/nonexistent/discover-e2e.yaml")).unwrap_err();
    assert!(matches!(err, SuiteError::Config(_)));
}

#[test]
fn malformed_yaml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "retries: [not a number").unwrap();
    assert!(matches!(
        load_config(path.to_str()),
        Err(SuiteError::Yaml(_))
    ));
}

// =========================================================================
// Environment
// =========================================================================

#[test]
fn ci_enables_retries_two_workers_and_forbid_only() {
    let mut config = RunConfig::default();
    config.apply_env(&env(&[("CI", "true")]));
    assert_eq!(config.retries, 2);
    assert_eq!(config.workers, 2);
    assert!(config.forbid_only);
}

#[test]
fn environment_names_select_base_url() {
    let mut dev = RunConfig::default();
    dev.apply_env(&env(&[("ENV", "dev")]));
    assert_eq!(dev.base_url, "http://localhost:3000");
    assert_eq!(dev.video, CaptureMode::Off);
    assert_eq!(dev.workers, 1);

    let mut staging = RunConfig::default();
    staging.apply_env(&env(&[("ENV", "staging")]));
    assert_eq!(staging.base_url, "https://staging.tmdb-discover.surge.sh");

    let mut unknown = RunConfig::default();
    unknown.apply_env(&env(&[("ENV", "qa")]));
    assert_eq!(unknown.base_url, "https://tmdb-discover.surge.sh");
}

#[test]
fn debug_runs_headed_on_one_worker_with_full_capture() {
    let mut config = RunConfig::default();
    config.apply_env(&env(&[("DEBUG", "true")]));
    assert_eq!(config.workers, 1);
    assert!(!config.headless);
    assert_eq!(config.video, CaptureMode::On);
    assert_eq!(config.trace, CaptureMode::On);
}

#[test]
fn api_key_comes_from_environment() {
    let mut config = RunConfig::default();
    config.apply_env(&env(&[("TMDB_API_KEY", "abc123")]));
    assert_eq!(config.api.api_key.as_deref(), Some("abc123"));

    let mut empty = RunConfig::default();
    empty.apply_env(&env(&[("TMDB_API_KEY", "")]));
    assert_eq!(empty.api.api_key, None);
}

#[test]
fn cli_flags_win_over_environment() {
    let mut config = RunConfig::default();
    config.apply_env(&env(&[("CI", "1")]));
    config.apply_run_flags(Some(4), Some(0), true, Some("http://127.0.0.1:8080".into()));
    assert_eq!(config.workers, 4);
    assert_eq!(config.retries, 0);
    assert!(!config.headless);
    assert_eq!(config.base_url, "http://127.0.0.1:8080");
}

#[test]
fn validate_rejects_zero_workers() {
    let config = RunConfig {
        workers: 0,
        ..RunConfig::default()
    };
    assert!(matches!(config.validate(), Err(SuiteError::Config(_))));
}

#[test]
fn bridge_carries_launch_options() {
    let config = RunConfig::default();
    let bridge = config.bridge(Some("test-results/tc-001/video".into()));
    assert_eq!(bridge.script, "node/browser_server.js");
    assert!(bridge.launch.headless);
    assert!(bridge.launch.ignore_https_errors);
    assert_eq!(
        bridge.launch.video_dir.as_deref(),
        Some("test-results/tc-001/video")
    );
    assert_eq!(config.timings().action, Duration::from_secs(10));
}

// =========================================================================
// Capture modes
// =========================================================================

#[test]
fn capture_modes_record_and_keep() {
    assert!(!CaptureMode::Off.records());
    assert!(CaptureMode::On.records());
    assert!(CaptureMode::RetainOnFailure.records());
    assert!(!CaptureMode::OnlyOnFailure.records());

    assert!(CaptureMode::On.keeps(true));
    assert!(!CaptureMode::RetainOnFailure.keeps(true));
    assert!(CaptureMode::RetainOnFailure.keeps(false));
    assert!(CaptureMode::OnlyOnFailure.keeps(false));
    assert!(!CaptureMode::Off.keeps(false));
}

// =========================================================================
// CLI
// =========================================================================

#[test]
fn run_subcommand_parses_filters() {
    let cli = Cli::try_parse_from([
        "discover-e2e",
        "-vv",
        "run",
        "--grep",
        "search",
        "--workers",
        "3",
        "--headed",
    ])
    .unwrap();

    assert_eq!(cli.verbose, 2);
    match cli.command {
        Commands::Run {
            grep,
            workers,
            headed,
            only,
            ..
        } => {
            assert_eq!(grep.as_deref(), Some("search"));
            assert_eq!(workers, Some(3));
            assert!(headed);
            assert!(only.is_none());
        }
        other => panic!("expected run, got {:?}", other),
    }
}

#[test]
fn api_subcommand_takes_a_key() {
    let cli = Cli::try_parse_from(["discover-e2e", "api", "--api-key", "k"]).unwrap();
    assert!(matches!(cli.command, Commands::Api { api_key: Some(ref k), .. } if k == "k"));
}

#[test]
fn filter_by_group_grep_and_only() {
    let by_group = ScenarioFilter {
        group: Some("pagination".into()),
        ..ScenarioFilter::default()
    }
    .apply(ui_scenarios());
    let ids: Vec<&str> = by_group.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["TC-015", "TC-016"]);

    let by_grep = ScenarioFilter {
        grep: Some("known issue".into()),
        ..ScenarioFilter::default()
    }
    .apply(ui_scenarios());
    assert_eq!(by_grep.len(), 2);

    let only = ScenarioFilter {
        only: Some("tc-007".into()),
        ..ScenarioFilter::default()
    }
    .apply(ui_scenarios());
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].id, "TC-007");
}

#[test]
fn only_is_refused_under_forbid_only() {
    let config = RunConfig {
        forbid_only: true,
        ..RunConfig::default()
    };
    let filter = ScenarioFilter {
        only: Some("TC-001".into()),
        ..ScenarioFilter::default()
    };
    assert!(filter.check_allowed(&config).is_err());
    assert!(ScenarioFilter::default().check_allowed(&config).is_ok());
}

#[test]
fn catalog_ids_are_unique_and_ordered() {
    let scenarios = ui_scenarios();
    assert_eq!(scenarios.len(), 19);
    for (i, scenario) in scenarios.iter().enumerate() {
        assert_eq!(scenario.id, format!("TC-{:03}", i + 1));
    }
}

#[test]
fn sanitize_filename_keeps_ids_readable() {
    assert_eq!(sanitize_filename("TC-001"), "tc-001");
    assert_eq!(
        sanitize_filename("Test failed: TC-002 - Screenshot"),
        "test_failed__tc-002_-_screenshot"
    );
}
