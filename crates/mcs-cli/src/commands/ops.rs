//! Operator list commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{format_operators, print_info, print_success, print_warning};
use mcs_core::config::ConfigFile;
use mcs_core::OperatorList;

/// Load the operator list named by `ops_path`, or by the config file
pub fn load_operators(config_path: Option<&PathBuf>, ops_path: Option<&Path>) -> Result<OperatorList> {
    let path = match ops_path {
        Some(path) => path.to_path_buf(),
        None => {
            let config = ConfigFile::load_or_default(config_path.map(PathBuf::as_path))
                .context("Failed to load config")?;
            config.operators.path
        }
    };

    OperatorList::load(&path).with_context(|| format!("Failed to load operator list {:?}", path))
}

/// List operators
pub fn ops_command(config_path: Option<&PathBuf>, ops_path: Option<&Path>) -> Result<()> {
    let operators = load_operators(config_path, ops_path)?;
    println!("{}", format_operators(operators.entries()));
    if !operators.is_empty() {
        print_info(&format!("{} operator(s)", operators.len()));
    }
    Ok(())
}

/// Report whether `user` is an operator. Returns the verdict.
pub fn check_command(
    config_path: Option<&PathBuf>,
    ops_path: Option<&Path>,
    user: &str,
) -> Result<bool> {
    let operators = load_operators(config_path, ops_path)?;
    let authorized = operators.is_authorized(user);

    if authorized {
        print_success(&format!("{} is an operator", user));
    } else {
        print_warning(&format!("{} is not an operator", user));
    }

    Ok(authorized)
}
