//! Repository identifiers and build provenance.

use crate::error::{CliError, ReleaseError, Result};
use std::fmt;
use std::path::PathBuf;

/// A GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Owner (user or organisation)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl Repository {
    /// Create a repository identifier
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name` notation
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_end_matches(".git");
        match trimmed.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(ReleaseError::Cli(CliError::InvalidArguments {
                reason: format!("Invalid repository '{input}'. Expected owner/name"),
            })),
        }
    }

    /// Public download URL of a release asset
    pub fn release_download_url(&self, version: &str, asset_name: &str) -> String {
        format!(
            "https://github.com/{}/{}/releases/download/{}/{}",
            self.owner, self.name, version, asset_name
        )
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Output of one native framework build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProduct {
    /// Repository the framework was built from
    pub source_repo: Repository,
    /// Version being released
    pub version: String,
    /// Source commit hash
    pub commit_hash: String,
    /// Source branch name
    pub branch: String,
    /// Directory holding the framework and the generated Swift sources
    pub directory: PathBuf,
    /// Framework directory name, e.g. `MatrixSDKFFI.xcframework`
    pub framework_name: String,
}

impl BuildProduct {
    /// Location of the built framework
    pub fn framework_path(&self) -> PathBuf {
        self.directory.join(&self.framework_name)
    }

    /// Location of the generated Swift sources
    pub fn swift_sources(&self) -> PathBuf {
        self.directory.join("swift")
    }

    /// File name of the release asset
    pub fn archive_name(&self) -> String {
        format!("{}.zip", self.framework_name)
    }

    /// Commit message used in the package repository
    pub fn commit_message(&self) -> String {
        format!(
            "Bump to version {} ({}/{} {})",
            self.version, self.source_repo.name, self.branch, self.commit_hash
        )
    }
}
