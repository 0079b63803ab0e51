//! Command line interface for the release tool.

mod args;
pub mod commands;
mod output;

pub use args::{Args, DEFAULT_PACKAGE_REPO, DEFAULT_SOURCE_REPO, RuntimeConfig, default_build_dir};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::EnvConfig;
use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let env_config = EnvConfig::from_env();
    execute_command(args, &env_config).await
}
