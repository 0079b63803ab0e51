//! # xcframework release
//!
//! Release tool for the `MatrixRustSDK` Swift package.
//!
//! The package repository only contains a `Package.swift` manifest that points
//! at a prebuilt `MatrixSDKFFI.xcframework` attached to a GitHub release, plus
//! the generated Swift sources that wrap it. This crate automates producing a
//! new release of that package:
//!
//! 1. Build the xcframework from a sibling `matrix-rust-sdk` checkout
//! 2. Zip it deterministically and compute its SHA-256 checksum
//! 3. Mirror the generated Swift sources and rewrite `Package.swift`
//! 4. Commit and push the change
//! 5. Create the GitHub release and upload the zip
//!
//! ## Usage
//!
//! ```bash
//! release --version v1.0.65-alpha               # full release
//! release --version v1.0.65-alpha --local-only  # build, zip, edit, commit; no network
//! release --version v1.0.65-alpha --test-mode   # skip the native build
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod build;
pub mod cli;
pub mod credentials;
pub mod error;
pub mod git;
pub mod github;
pub mod metadata;
pub mod package;
pub mod process;

pub use build::FrameworkBuilder;
pub use cli::Args;
pub use credentials::ApiToken;
pub use error::{ReleaseError, Result};
pub use git::Git;
pub use github::{GitHubClient, HttpTransport, ReqwestTransport};
pub use metadata::{BuildProduct, Repository};
pub use package::{ArchivedArtifact, Package};
pub use process::{CommandRunner, ShellCommand, ShellRunner};

use std::collections::HashMap;
use std::path::PathBuf;

/// Framework produced by the native build
pub const FRAMEWORK_NAME: &str = "MatrixSDKFFI.xcframework";

/// Snapshot of the process environment.
///
/// Library code never reads `std::env` directly; the binary captures the
/// environment once and hands this snapshot down, so tests can supply their own.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable, treating empty values as unset
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }
}

/// Configuration for one release run
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Version string used for the tag, release name and download URL
    pub version: String,
    /// Suppress push and GitHub release creation
    pub local_only: bool,
    /// Replace the native build with a mock build product
    pub test_mode: bool,
    /// Working copy of the Swift package repository
    pub package_dir: PathBuf,
    /// Checkout of the upstream Rust SDK
    pub build_dir: PathBuf,
    /// Repository hosting the Swift package and its releases
    pub package_repo: Repository,
    /// Repository the framework is built from
    pub source_repo: Repository,
    /// GitHub REST API base URL
    pub api_url: url::Url,
}

/// Result of a release run
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    /// Released version
    pub version: String,
    /// Source commit the framework was built from
    pub source_commit: String,
    /// Source branch the framework was built from
    pub source_branch: String,
    /// Commit created in the package repository
    pub package_commit: String,
    /// SHA-256 of the uploaded archive
    pub checksum: String,
    /// Archive written to disk
    pub archive: PathBuf,
    /// Whether the commit was pushed
    pub pushed: bool,
    /// GitHub release URL (if created)
    pub release_url: Option<String>,
}
