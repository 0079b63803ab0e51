//! Command line argument parsing and validation.

use crate::error::{CliError, ReleaseError, Result};
use crate::metadata::Repository;
use crate::ReleaseConfig;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Default repository hosting the Swift package
pub const DEFAULT_PACKAGE_REPO: &str = "matrix-org/matrix-rust-components-swift";

/// Default repository the framework is built from
pub const DEFAULT_SOURCE_REPO: &str = "matrix-org/matrix-rust-sdk";

/// Release tool for the MatrixRustSDK Swift package
#[derive(Parser, Debug, Clone)]
#[command(
    name = "release",
    about = "Build MatrixSDKFFI.xcframework and publish it as a Swift package release",
    long_about = "Build MatrixSDKFFI.xcframework from a matrix-rust-sdk checkout, zip it,
point Package.swift at the new release, commit, push and create the GitHub release.

Usage:
  release --version v1.0.65-alpha
  release --version v1.0.65-alpha --local-only
  release --version v1.0.65-alpha --test-mode --local-only",
    disable_version_flag = true
)]
pub struct Args {
    /// Version to release; used as the tag and release name
    #[arg(long, value_name = "VERSION")]
    pub version: String,

    /// Build, zip, edit and commit without pushing or creating the release
    #[arg(long)]
    pub local_only: bool,

    /// Skip the native build and release a placeholder framework
    #[arg(long)]
    pub test_mode: bool,

    /// Working copy of the Swift package repository
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub package_dir: PathBuf,

    /// matrix-rust-sdk checkout [default: <package-dir>/../matrix-rust-sdk]
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Repository hosting the Swift package
    #[arg(long, value_name = "OWNER/NAME", env = "RELEASE_PACKAGE_REPO", default_value = DEFAULT_PACKAGE_REPO)]
    pub package_repo: String,

    /// Repository the framework is built from
    #[arg(long, value_name = "OWNER/NAME", env = "RELEASE_SOURCE_REPO", default_value = DEFAULT_SOURCE_REPO)]
    pub source_repo: String,

    /// GitHub REST API base URL
    #[arg(long, value_name = "URL", env = "RELEASE_API_URL", default_value = crate::github::DEFAULT_API_URL)]
    pub api_url: String,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let version = self.version.as_str();
        if version.trim().is_empty() {
            return Err("--version must not be empty".to_string());
        }
        if version.chars().any(char::is_whitespace) {
            return Err(format!("--version '{version}' must not contain whitespace"));
        }
        if let Some(c) = version.chars().find(|c| matches!(c, '"' | '\\' | '/')) {
            return Err(format!("--version '{version}' must not contain '{c}'"));
        }
        Repository::parse(&self.package_repo).map_err(|e| e.to_string())?;
        Repository::parse(&self.source_repo).map_err(|e| e.to_string())?;
        url::Url::parse(&self.api_url)
            .map_err(|e| format!("--api-url '{}' is not a valid URL: {e}", self.api_url))?;
        Ok(())
    }

    /// Resolve paths and identifiers into a [`ReleaseConfig`]
    pub fn to_release_config(&self) -> Result<ReleaseConfig> {
        let package_dir = std::fs::canonicalize(&self.package_dir).map_err(|e| {
            ReleaseError::Cli(CliError::InvalidArguments {
                reason: format!(
                    "Package directory {} is not accessible: {e}",
                    self.package_dir.display()
                ),
            })
        })?;
        let build_dir = match &self.build_dir {
            Some(dir) => dir.clone(),
            None => default_build_dir(&package_dir),
        };
        let api_url = url::Url::parse(&self.api_url).map_err(|e| {
            ReleaseError::Cli(CliError::InvalidArguments {
                reason: format!("Invalid --api-url '{}': {e}", self.api_url),
            })
        })?;

        Ok(ReleaseConfig {
            version: self.version.clone(),
            local_only: self.local_only,
            test_mode: self.test_mode,
            package_dir,
            build_dir,
            package_repo: Repository::parse(&self.package_repo)?,
            source_repo: Repository::parse(&self.source_repo)?,
            api_url,
        })
    }
}

/// Sibling `matrix-rust-sdk` checkout of the package directory
pub fn default_build_dir(package_dir: &Path) -> PathBuf {
    package_dir
        .parent()
        .unwrap_or(package_dir)
        .join("matrix-rust-sdk")
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if progress output is suppressed
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false)
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}
