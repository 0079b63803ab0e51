//! Release command execution module.
//!
//! Resolves configuration and credentials, checks the toolchain, then hands
//! over to the staged pipeline in [`r#impl`].

mod r#impl;

pub use r#impl::{perform_release, ReleaseStage};

use crate::EnvConfig;
use crate::ReleaseConfig;
use crate::cli::{Args, RuntimeConfig};
use crate::credentials::resolve_api_token;
use crate::error::{CliError, ReleaseError, Result};
use crate::github::{GitHubClient, ReqwestTransport};
use crate::package::Package;
use crate::process::ShellRunner;

/// Execute release command
pub(super) async fn execute_release(
    args: &Args,
    config: &RuntimeConfig,
    env_config: &EnvConfig,
) -> Result<i32> {
    let release = args.to_release_config()?;

    config.println(&format!("📦 Releasing {} of {}", release.version, release.package_repo));
    config.indent(&format!("Package: {}", release.package_dir.display()));
    if release.test_mode {
        config.indent("Build: skipped (--test-mode)");
    } else {
        config.indent(&format!("Build: {}", release.build_dir.display()));
    }

    check_toolchain(&release)?;
    warn_on_unusual_version(config, &release.version);

    let client = GitHubClient::new(ReqwestTransport::new()?, release.api_url.as_str())?;

    // Fail before building when the run needs a token and none is configured
    let api_token = if release.local_only {
        config.indent("Mode: local only (no push, no GitHub release)");
        None
    } else {
        let home = dirs::home_dir();
        let (token, source) = resolve_api_token(env_config, home.as_deref(), &client.api_host())?;
        config.indent(&format!("GitHub token: {source}"));
        Some(token)
    };

    let package = Package::new(
        release.package_repo.clone(),
        &release.package_dir,
        api_token,
        client,
        release.local_only,
    );

    let outcome = perform_release(&release, &ShellRunner, &package, config).await?;

    config.println("");
    config.success_println(&format!("Released {}", outcome.version));
    config.indent(&format!(
        "Built from {}/{} at {}",
        release.source_repo.name, outcome.source_branch, outcome.source_commit
    ));
    config.indent(&format!("Checksum: {}", outcome.checksum));
    config.indent(&format!("Archive: {}", outcome.archive.display()));
    config.indent(&format!("Commit: {}", outcome.package_commit));
    if !outcome.pushed {
        config.indent("Push: skipped");
    }
    match &outcome.release_url {
        Some(url) => config.indent(&format!("Release: {url}")),
        None => config.indent("GitHub release: skipped"),
    }

    Ok(0)
}

/// Require the external programs the run will invoke
fn check_toolchain(release: &ReleaseConfig) -> Result<()> {
    let mut tools = vec!["git"];
    if !release.test_mode {
        tools.push("cargo");
    }
    for tool in tools {
        which::which(tool).map_err(|_| {
            ReleaseError::Cli(CliError::MissingTool {
                tool: tool.to_string(),
            })
        })?;
    }
    Ok(())
}

/// Warn when the version does not look like semver; it is used as given either way
fn warn_on_unusual_version(config: &RuntimeConfig, version: &str) {
    let bare = version.strip_prefix('v').unwrap_or(version);
    if let Err(e) = semver::Version::parse(bare) {
        log::warn!("Version {version} is not semver: {e}");
        config.warning_println(&format!(
            "Version '{version}' is not a semantic version ({e}); continuing anyway"
        ));
    }
}
