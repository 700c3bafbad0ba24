// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Maestro main entry point - CLI and interactive shell.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;

use maestro::cli::{self, ReplCommand};
use maestro::config::{self, CliOptions, ResolvedConfig};
use maestro::orchestrate::WorkerOrchestrator;
use maestro::remote::JulesClient;
use maestro::telemetry::{init_telemetry, TelemetryConfig};

/// Maestro version string.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maestro - orchestrate remote coding workers.
#[derive(Parser)]
#[command(name = "maestro")]
#[command(author, version, about = "Orchestrate remote coding workers", long_about = None)]
struct Cli {
    /// Jules API key
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Base URL for the API
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// API version path segment
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Show informational logs
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Show debug logs
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Subcommands for maestro.
#[derive(Subcommand)]
enum Commands {
    /// Start the interactive worker shell (default)
    Shell,

    /// List repositories available to workers
    Sources,

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Show version information
    Version,
}

/// Config subcommand actions.
#[derive(Subcommand)]
enum ConfigAction {
    /// Show the resolved configuration with secrets masked
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _telemetry = init_telemetry(&TelemetryConfig::from_flags(cli.verbose, cli.debug))?;

    let cli_options = CliOptions {
        api_key: cli.api_key,
        base_url: cli.base_url,
        api_version: cli.api_version,
        timeout_ms: cli.timeout_ms,
    };

    let workspace_root = std::env::current_dir()?;
    let config = config::load_config(&workspace_root, cli_options)?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let orchestrator = build_orchestrator(&config)?;
            cli::run_shell(&orchestrator).await
        }
        Commands::Sources => {
            let orchestrator = build_orchestrator(&config)?;
            match cli::execute(&orchestrator, ReplCommand::Sources).await {
                Ok(payload) => {
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("{}", serde_json::to_string_pretty(&config.redacted())?);
                Ok(())
            }
        },
        Commands::Version => {
            println!("maestro {}", VERSION);
            Ok(())
        }
    }
}

fn build_orchestrator(config: &ResolvedConfig) -> anyhow::Result<WorkerOrchestrator> {
    let client = JulesClient::from_config(config)?;
    Ok(WorkerOrchestrator::from_config(Arc::new(client), config))
}
