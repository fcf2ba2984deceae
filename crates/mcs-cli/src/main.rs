//! mcshell CLI
//!
//! Single binary for mcshell:
//! - Run a command (`bash`) against the local terminal
//! - Inspect the operator list
//! - Manage configuration

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcshell::commands;

#[derive(Parser)]
#[command(name = "mcshell")]
#[command(author, version, about = "Operator shell bridge")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command with this terminal attached
    Run {
        /// Command token to dispatch
        #[arg(default_value = "bash")]
        command: String,
        /// Identity to run as (defaults to $USER)
        #[arg(short, long)]
        user: Option<String>,
        /// Operator list file (overrides config)
        #[arg(long)]
        ops: Option<PathBuf>,
    },

    /// List operators
    Ops {
        /// Operator list file (overrides config)
        #[arg(long)]
        ops: Option<PathBuf>,
    },

    /// Check whether an identity is an operator
    Check {
        /// Identity to check
        user: String,
        /// Operator list file (overrides config)
        #[arg(long)]
        ops: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    // stdout carries relayed terminal bytes, so logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = cli.config.as_ref();

    match cli.command {
        Commands::Run { command, user, ops } => {
            commands::run_command(config, &command, user, ops.as_deref()).await?;
        }

        Commands::Ops { ops } => {
            commands::ops_command(config, ops.as_deref())?;
        }

        Commands::Check { user, ops } => {
            if !commands::check_command(config, ops.as_deref(), &user)? {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(config)?,
            ConfigAction::Init { force } => commands::config_init(config, force)?,
            ConfigAction::Path => commands::config_path(config),
        },
    }

    Ok(ExitCode::SUCCESS)
}
