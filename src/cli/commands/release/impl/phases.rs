//! Individual release phases.
//!
//! Each phase consumes the output of the previous one. None of them retry.

use crate::build::{ensure_mock_framework, mock_product, FrameworkBuilder};
use crate::error::Result;
use crate::github::{HttpTransport, PublishedRelease};
use crate::metadata::BuildProduct;
use crate::package::{ArchivedArtifact, MANIFEST};
use crate::process::CommandRunner;

use super::context::ReleasePhaseContext;

/// Paths staged in the package repository
const STAGED_PATHS: [&str; 2] = [MANIFEST, "Sources"];

/// Phase 1: build the framework, or fabricate a mock product in test mode
pub(super) fn build_product<R: CommandRunner, T>(
    ctx: &ReleasePhaseContext<'_, R, T>,
) -> Result<BuildProduct> {
    let release = ctx.release;

    if release.test_mode {
        ctx.config.warning_println("Test mode: skipping the native build");
        let product = mock_product(
            release.source_repo.clone(),
            &release.version,
            &release.package_dir,
        );
        ensure_mock_framework(&product)?;
        return Ok(product);
    }

    ctx.config.println(&format!(
        "🔨 Building {} in {}",
        crate::FRAMEWORK_NAME,
        release.build_dir.display()
    ));
    let builder = FrameworkBuilder::new(
        release.source_repo.clone(),
        &release.version,
        &release.build_dir,
        ctx.runner,
    );
    let product = builder.build()?;
    ctx.config.success_println(&format!(
        "Built {} at {}",
        product.branch, product.commit_hash
    ));
    Ok(product)
}

/// Phase 2: zip the framework and checksum it
pub(super) fn archive_product<R, T: HttpTransport>(
    ctx: &ReleasePhaseContext<'_, R, T>,
    product: &BuildProduct,
) -> Result<ArchivedArtifact> {
    let artifact = ctx.package.zip_binary(product)?;
    ctx.config.success_println(&format!("Archived {}", artifact.path.display()));
    ctx.config.indent(&format!("sha256: {}", artifact.checksum));
    Ok(artifact)
}

/// Phase 3: mirror the generated sources and point the manifest at the release
pub(super) fn update_package<R, T: HttpTransport>(
    ctx: &ReleasePhaseContext<'_, R, T>,
    product: &BuildProduct,
    artifact: &ArchivedArtifact,
) -> Result<()> {
    if ctx.release.test_mode {
        ctx.config.indent("Source sync skipped in test mode");
    } else {
        let summary = ctx.package.sync_sources(product)?;
        ctx.config.success_println(&format!(
            "Synced Swift sources ({} copied, {} removed)",
            summary.copied, summary.removed
        ));
    }

    ctx.package.update_manifest(product, &artifact.checksum)?;
    ctx.config.success_println(&format!(
        "Updated {} to {}",
        MANIFEST,
        ctx.package.download_url(product)
    ));
    Ok(())
}

/// Phase 4: commit the package changes and push unless local-only.
///
/// Returns the new commit hash and whether it was pushed.
pub(super) fn commit_and_push<R: CommandRunner, T>(
    ctx: &ReleasePhaseContext<'_, R, T>,
    product: &BuildProduct,
) -> Result<(String, bool)> {
    let git = ctx.package_git();
    let paths: Vec<&str> = STAGED_PATHS
        .into_iter()
        .filter(|path| git.directory().join(path).exists())
        .collect();
    git.add(&paths)?;

    let message = product.commit_message();
    let commit = git.commit(&message)?;
    ctx.config.success_println(&format!("Committed \"{message}\""));

    if ctx.release.local_only {
        ctx.config.indent("Push skipped (--local-only)");
        return Ok((commit, false));
    }

    git.push()?;
    ctx.config.success_println("Pushed to origin");
    Ok((commit, true))
}

/// Phase 5: create the GitHub release and attach the archive
pub(super) async fn publish_release<R, T: HttpTransport>(
    ctx: &ReleasePhaseContext<'_, R, T>,
    product: &BuildProduct,
    artifact: &ArchivedArtifact,
) -> Result<Option<PublishedRelease>> {
    let published = ctx.package.make_release(product, artifact).await?;
    match &published {
        Some(release) => {
            ctx.config.success_println(&format!("Created release {}", release.html_url));
            match &release.asset_url {
                Some(url) => ctx.config.indent(&format!("Asset: {url}")),
                None => ctx
                    .config
                    .warning_println("Archive was not attached; upload it to the release manually"),
            }
        }
        None => ctx.config.indent("GitHub release skipped (--local-only)"),
    }
    Ok(published)
}
