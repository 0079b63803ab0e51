//! Release tool for the MatrixRustSDK Swift package.
//!
//! Builds `MatrixSDKFFI.xcframework`, points `Package.swift` at a new GitHub
//! release and publishes it.

use std::process;
use xcframework_release::cli;
use xcframework_release::cli::OutputManager;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            let output = OutputManager::new(false);
            output.error(&format!("Fatal error: {e}"));
            output.suggestions(&e.recovery_suggestions());
            process::exit(1);
        }
    }
}
