use clap::Parser;
use discover_e2e::cli::commands::{ScenarioFilter, cmd_api, cmd_list, cmd_run};
use discover_e2e::cli::config::{Cli, Commands, resolve_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    // Defaults, then file, then environment; CLI flags below win
    let mut config = resolve_config(cli.config.as_deref())?;

    let all_passed = match cli.command {
        Commands::Run {
            grep,
            group,
            only,
            workers,
            retries,
            headed,
            base_url,
        } => {
            config.apply_run_flags(workers, retries, headed, base_url);
            let filter = ScenarioFilter { grep, group, only };
            cmd_run(config, &filter)?
        }
        Commands::Api { api_key, grep } => {
            if let Some(key) = api_key {
                config.api.api_key = Some(key);
            }
            let filter = ScenarioFilter {
                grep,
                ..ScenarioFilter::default()
            };
            cmd_api(config, &filter)?
        }
        Commands::List => {
            cmd_list();
            true
        }
    };

    if !all_passed {
        std::process::exit(1);
    }
    Ok(())
}
