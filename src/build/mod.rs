//! Native framework build.
//!
//! Runs the SDK's xtask inside the source checkout and describes the result as
//! a [`BuildProduct`]. A failed build never yields a product.

use crate::error::Result;
use crate::git::Git;
use crate::metadata::{BuildProduct, Repository};
use crate::process::{CommandRunner, ShellCommand};
use crate::FRAMEWORK_NAME;
use std::path::{Path, PathBuf};

/// Output directory of the xtask, relative to the source checkout
pub const GENERATED_DIR: &str = "bindings/apple/generated";

/// Variable that points swiftc at the macOS SDK and breaks iOS targets
const SDKROOT: &str = "SDKROOT";

/// Builds `MatrixSDKFFI.xcframework` from a `matrix-rust-sdk` checkout
#[derive(Debug, Clone)]
pub struct FrameworkBuilder<R> {
    source_repo: Repository,
    version: String,
    directory: PathBuf,
    program: String,
    args: Vec<String>,
    runner: R,
}

impl<R: CommandRunner> FrameworkBuilder<R> {
    /// Builder for the checkout at `directory` using the default xtask command
    pub fn new(
        source_repo: Repository,
        version: impl Into<String>,
        directory: impl AsRef<Path>,
        runner: R,
    ) -> Self {
        Self {
            source_repo,
            version: version.into(),
            directory: directory.as_ref().to_path_buf(),
            program: "cargo".to_string(),
            args: ["xtask", "swift", "build-framework", "--release"]
                .into_iter()
                .map(String::from)
                .collect(),
            runner,
        }
    }

    /// Replace the build command
    pub fn with_command<I, S>(mut self, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program = program.into();
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Command that will be run
    pub fn command(&self) -> ShellCommand {
        ShellCommand::new(&self.program, &self.directory)
            .args(self.args.iter().cloned())
            .env_remove(SDKROOT)
    }

    /// Build the framework.
    ///
    /// Provenance is read before building so the product describes the exact
    /// commit that was compiled.
    pub fn build(&self) -> Result<BuildProduct> {
        let git = Git::new(&self.directory, &self.runner);
        let commit_hash = git.commit_hash()?;
        let branch = git.branch_name()?;

        log::info!("Building {} at {}", branch, commit_hash);

        let command = self.command();
        self.runner.run(&command)?;

        Ok(BuildProduct {
            source_repo: self.source_repo.clone(),
            version: self.version.clone(),
            commit_hash,
            branch,
            directory: self.directory.join(GENERATED_DIR),
            framework_name: FRAMEWORK_NAME.to_string(),
        })
    }
}

/// Fixed build product used by `--test-mode`
pub fn mock_product(source_repo: Repository, version: &str, package_dir: &Path) -> BuildProduct {
    BuildProduct {
        source_repo,
        version: version.to_string(),
        commit_hash: "test123".to_string(),
        branch: "test-branch".to_string(),
        directory: package_dir.join("test-mock"),
        framework_name: FRAMEWORK_NAME.to_string(),
    }
}

/// Create a placeholder framework for a mock product when none exists yet
pub fn ensure_mock_framework(product: &BuildProduct) -> Result<()> {
    let framework = product.framework_path();
    if framework.exists() {
        return Ok(());
    }
    log::info!("Creating placeholder framework at {}", framework.display());
    std::fs::create_dir_all(&framework)?;
    std::fs::write(
        framework.join("Info.plist"),
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<plist version=\"1.0\"><dict/></plist>\n"
        ),
    )?;
    Ok(())
}
