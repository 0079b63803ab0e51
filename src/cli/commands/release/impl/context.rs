//! Context structure for executing release phases with all required dependencies.

use crate::ReleaseConfig;
use crate::cli::RuntimeConfig;
use crate::git::Git;
use crate::package::Package;
use crate::process::CommandRunner;

/// Context for executing release phases with all required dependencies
pub struct ReleasePhaseContext<'a, R, T> {
    /// What to release and how
    pub release: &'a ReleaseConfig,
    /// Runtime configuration for output
    pub config: &'a RuntimeConfig,
    /// Runner for every subprocess of the release
    pub runner: &'a R,
    /// The Swift package being released
    pub package: &'a Package<T>,
}

impl<'a, R: CommandRunner, T> ReleasePhaseContext<'a, R, T> {
    /// Git client for the package working copy
    pub fn package_git(&self) -> Git<&'a R> {
        Git::new(&self.release.package_dir, self.runner)
    }
}
