//! CLI command implementations

mod config;
mod ops;
mod run;

pub use config::{config_init, config_path, config_show};
pub use ops::{check_command, ops_command};
pub use run::run_command;
