//! Run a shell command against the local terminal

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::terminal::{local_terminal, session_environment, RawModeGuard};
use mcs_bash::{BashCommand, CommandRegistry};
use mcs_core::config::ConfigFile;
use mcs_core::OperatorList;

/// Execute `command` with this process's terminal as the user endpoint
pub async fn run_command(
    config_path: Option<&PathBuf>,
    command: &str,
    user: Option<String>,
    ops_path: Option<&Path>,
) -> Result<()> {
    let config = ConfigFile::load_or_default(config_path.map(PathBuf::as_path))
        .context("Failed to load config")?;

    let ops_path = ops_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.operators.path.clone());
    let operators = OperatorList::load(&ops_path)
        .with_context(|| format!("Failed to load operator list {:?}", ops_path))?;

    let mut registry = CommandRegistry::new();
    registry.register(Arc::new(BashCommand::from_config(
        &config,
        Arc::new(operators),
    )));

    if registry.find(command).is_none() {
        anyhow::bail!("Unknown command: {}", command);
    }

    let env = session_environment(user);

    // Raw mode clears ISIG, so a Ctrl-C typed into the session reaches the
    // shell as 0x03. Only a SIGINT from outside ends the session here.
    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("SIGINT received, ending session");
            on_signal.cancel();
        }
    });

    let result = {
        let _raw = RawModeGuard::enable().context("Failed to enter raw mode")?;
        registry
            .dispatch(command, local_terminal(), &env, shutdown)
            .await
    };

    result.with_context(|| format!("'{}' failed", command))
}
