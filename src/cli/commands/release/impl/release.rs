//! Release orchestration.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::github::HttpTransport;
use crate::package::Package;
use crate::process::CommandRunner;
use crate::{ReleaseConfig, ReleaseOutcome};
use std::fmt;

use super::context::ReleasePhaseContext;
use super::phases;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStage {
    /// Native framework build
    Build,
    /// Zip and checksum
    Archive,
    /// Source sync and manifest update
    UpdatePackage,
    /// Commit and push
    Commit,
    /// GitHub release and asset upload
    Publish,
}

impl ReleaseStage {
    /// All stages in order
    pub const ALL: [ReleaseStage; 5] = [
        ReleaseStage::Build,
        ReleaseStage::Archive,
        ReleaseStage::UpdatePackage,
        ReleaseStage::Commit,
        ReleaseStage::Publish,
    ];

    /// 1-based position of the stage
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0) + 1
    }

    /// Human readable name
    pub fn title(self) -> &'static str {
        match self {
            ReleaseStage::Build => "Build framework",
            ReleaseStage::Archive => "Archive framework",
            ReleaseStage::UpdatePackage => "Update package",
            ReleaseStage::Commit => "Commit and push",
            ReleaseStage::Publish => "Publish release",
        }
    }
}

impl fmt::Display for ReleaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.number(), Self::ALL.len(), self.title())
    }
}

fn enter(config: &RuntimeConfig, stage: ReleaseStage) {
    log::info!("{stage}");
    config.section(&stage.to_string());
}

fn failed(stage: ReleaseStage) -> impl FnOnce(&crate::ReleaseError) {
    move |e| log::error!("{} failed: {}", stage.title(), e)
}

/// Run the five release stages in order.
///
/// The first failing stage aborts the run; later stages never start.
pub async fn perform_release<R, T>(
    release: &ReleaseConfig,
    runner: &R,
    package: &Package<T>,
    config: &RuntimeConfig,
) -> Result<ReleaseOutcome>
where
    R: CommandRunner,
    T: HttpTransport,
{
    let ctx = ReleasePhaseContext {
        release,
        config,
        runner,
        package,
    };

    enter(config, ReleaseStage::Build);
    let product = phases::build_product(&ctx).inspect_err(failed(ReleaseStage::Build))?;

    enter(config, ReleaseStage::Archive);
    let artifact =
        phases::archive_product(&ctx, &product).inspect_err(failed(ReleaseStage::Archive))?;

    enter(config, ReleaseStage::UpdatePackage);
    phases::update_package(&ctx, &product, &artifact)
        .inspect_err(failed(ReleaseStage::UpdatePackage))?;

    enter(config, ReleaseStage::Commit);
    let (package_commit, pushed) =
        phases::commit_and_push(&ctx, &product).inspect_err(failed(ReleaseStage::Commit))?;

    enter(config, ReleaseStage::Publish);
    let published = phases::publish_release(&ctx, &product, &artifact)
        .await
        .inspect_err(failed(ReleaseStage::Publish))?;

    Ok(ReleaseOutcome {
        version: product.version,
        source_commit: product.commit_hash,
        source_branch: product.branch,
        package_commit,
        checksum: artifact.checksum,
        archive: artifact.path,
        pushed,
        release_url: published.map(|release| release.html_url),
    })
}
