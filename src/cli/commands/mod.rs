//! Command execution.
//!
//! The tool has a single command; this layer validates arguments and turns a
//! failed release into an error report and exit status 1.

mod release;

use crate::EnvConfig;
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

pub use release::{perform_release, ReleaseStage};

use release::execute_release;

/// Execute the release described by `args`
pub async fn execute_command(args: Args, env_config: &EnvConfig) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    match execute_release(&args, &config, env_config).await {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!("Release {} failed: {}", args.version, e));

            config.output().suggestions(&e.recovery_suggestions());

            Ok(1)
        }
    }
}
