//! The Swift package working copy.
//!
//! [`Package`] owns everything that touches the destination repository:
//! archiving the framework, mirroring the generated sources, rewriting
//! `Package.swift` and creating the GitHub release.

mod archive;
mod manifest;
mod sync;

pub use archive::{ArchivedArtifact, sha256_bytes, sha256_file, zip_directory};
pub use manifest::{ManifestFields, read_field, render};
pub use sync::{SyncSummary, mirror_directory};

use crate::credentials::ApiToken;
use crate::error::{CredentialError, GitHubError, Result};
use crate::github::{CreateReleaseRequest, GitHubClient, HttpTransport, PublishedRelease};
use crate::metadata::{BuildProduct, Repository};
use std::path::{Path, PathBuf};

/// Manifest file name
pub const MANIFEST: &str = "Package.swift";

/// Destination of the generated Swift sources inside the package
pub const SOURCES_DIR: &str = "Sources/MatrixRustSDK";

/// The Swift package repository working copy
#[derive(Debug)]
pub struct Package<T> {
    repository: Repository,
    directory: PathBuf,
    api_token: Option<ApiToken>,
    client: GitHubClient<T>,
    local_only: bool,
}

impl<T: HttpTransport> Package<T> {
    /// Create a package handle.
    ///
    /// With `local_only` set, [`Package::make_release`] never touches the
    /// network and no token is needed.
    pub fn new(
        repository: Repository,
        directory: impl AsRef<Path>,
        api_token: Option<ApiToken>,
        client: GitHubClient<T>,
        local_only: bool,
    ) -> Self {
        Self {
            repository,
            directory: directory.as_ref().to_path_buf(),
            api_token,
            client,
            local_only,
        }
    }

    /// Repository hosting this package
    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Working copy location
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of `Package.swift`
    pub fn manifest_path(&self) -> PathBuf {
        self.directory.join(MANIFEST)
    }

    /// Whether network operations are suppressed
    pub fn is_local_only(&self) -> bool {
        self.local_only
    }

    /// Download URL the manifest should point at for `product`
    pub fn download_url(&self, product: &BuildProduct) -> String {
        self.repository
            .release_download_url(&product.version, &product.archive_name())
    }

    /// Zip the framework next to it and checksum the archive
    pub fn zip_binary(&self, product: &BuildProduct) -> Result<ArchivedArtifact> {
        let destination = product.directory.join(product.archive_name());
        log::info!("Zipping {}", product.framework_path().display());
        zip_directory(&product.framework_path(), &destination)
    }

    /// Mirror the generated Swift sources into `Sources/MatrixRustSDK`
    pub fn sync_sources(&self, product: &BuildProduct) -> Result<SyncSummary> {
        mirror_directory(&product.swift_sources(), &self.directory.join(SOURCES_DIR))
    }

    /// Point `Package.swift` at the release of `product`
    pub fn update_manifest(&self, product: &BuildProduct, checksum: &str) -> Result<()> {
        let fields = ManifestFields {
            version: product.version.clone(),
            checksum: checksum.to_string(),
            url: self.download_url(product),
        };
        log::info!("Updating {} to {}", MANIFEST, product.version);
        manifest::update_file(&self.manifest_path(), &fields)
    }

    /// Create the GitHub release for `product` and attach `asset`.
    ///
    /// Returns `None` without contacting GitHub in local-only mode.
    pub async fn make_release(
        &self,
        product: &BuildProduct,
        asset: &ArchivedArtifact,
    ) -> Result<Option<PublishedRelease>> {
        if self.local_only {
            log::info!("Skipping release creation for --local-only");
            return Ok(None);
        }

        let token = self
            .api_token
            .as_ref()
            .ok_or_else(|| CredentialError::Missing {
                host: self.client.api_host(),
            })?;

        let request = CreateReleaseRequest::for_version(&product.version);
        let created = self
            .client
            .create_release(token, &self.repository, &request)
            .await?;
        log::info!("Release created: {}", created.html_url);

        let mut published = PublishedRelease {
            html_url: created.html_url,
            asset_url: None,
        };

        let Some(upload_url) = created.upload_url else {
            log::warn!(
                "Release response has no upload_url; {} was not attached",
                product.archive_name()
            );
            return Ok(Some(published));
        };

        let bytes = std::fs::read(&asset.path)?;
        let actual = sha256_bytes(&bytes);
        if actual != asset.checksum {
            return Err(GitHubError::ChecksumMismatch {
                path: asset.path.clone(),
                expected: asset.checksum.clone(),
                actual,
            }
            .into());
        }

        let uploaded = self
            .client
            .upload_asset(token, &upload_url, &product.archive_name(), bytes.into())
            .await?;
        published.asset_url = uploaded.browser_download_url;
        Ok(Some(published))
    }
}
