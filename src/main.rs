//! gostage - Go builds in ephemeral containers
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use gostage::cli::{commands, Cli, Commands};
use gostage::config::{Config, ConfigManager};
use gostage::error::{GostageError, GostageResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(output) = e.captured_output().filter(|o| !o.trim().is_empty()) {
                eprintln!("{}", output.trim_end());
            }
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> GostageResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor logging
    if let Commands::Completions(args) = cli.command {
        return commands::completions(args);
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| GostageError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    init_logging(cli.verbose, &config);
    if cli.no_local {
        debug!("Local config discovery disabled (--no-local)");
    } else if let Some(ref path) = local_config_path {
        debug!("Found local config: {}", path.display());
    }

    match cli.command {
        Commands::Completions(_) => unreachable!("completions handled above"),
        Commands::Build(args) => commands::build(args, &config).await,
        Commands::BuildContainer(args) => commands::build_container(args, &config).await,
        Commands::Test(args) => commands::test(args, &config).await,
        Commands::Lint(args) => commands::lint(args, &config).await,
        Commands::Vulncheck(args) => commands::vulncheck(args, &config).await,
        Commands::BuildRemote(args) => commands::build_remote(args, &config).await,
        Commands::Service(args) => commands::service(args, &config).await,
        Commands::Tar(args) => commands::tar(args, &config).await,
        Commands::Sync(args) => commands::sync(args, &config).await,
        Commands::Status => commands::status(&config).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
        Commands::Cache(args) => commands::cache(args, &config).await,
    }
}

/// 0 = warn (spinners only), 1 = info, 2+ = debug; `general.verbose`
/// counts as one level
fn init_logging(verbose: u8, config: &Config) {
    let level = verbose.saturating_add(u8::from(config.general.verbose));
    let filter = match level {
        0 => EnvFilter::new("gostage=warn"),
        1 => EnvFilter::new("gostage=info"),
        _ => EnvFilter::new("gostage=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time();

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
