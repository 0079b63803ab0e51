//! GitHub release creation and asset upload

use super::transport::{HttpRequest, HttpResponse, HttpTransport, upload_timeout};
use crate::credentials::ApiToken;
use crate::error::GitHubError;
use crate::metadata::Repository;
use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default GitHub REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateReleaseRequest {
    /// Tag to create the release from
    pub tag_name: String,
    /// Release title
    pub name: String,
    /// Release notes
    pub body: String,
    /// Whether to create a draft
    pub draft: bool,
    /// Whether to mark as pre-release
    pub prerelease: bool,
}

impl CreateReleaseRequest {
    /// Published, non-prerelease release named after `version`
    pub fn for_version(version: &str) -> Self {
        Self {
            tag_name: version.to_string(),
            name: version.to_string(),
            body: format!("Automated release for {version}"),
            draft: false,
            prerelease: false,
        }
    }
}

/// Fields of the create-release response this tool uses
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRelease {
    /// Release page URL
    pub html_url: String,
    /// Release ID
    #[serde(default)]
    pub id: Option<u64>,
    /// RFC 6570 template for uploading assets
    #[serde(default)]
    pub upload_url: Option<String>,
}

/// Fields of the upload-asset response this tool uses
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedAsset {
    /// Public download URL of the asset
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

/// Result of publishing a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    /// Release page URL
    pub html_url: String,
    /// Download URL of the uploaded asset, if one was uploaded
    pub asset_url: Option<String>,
}

/// Minimal GitHub REST client for releases
#[derive(Debug, Clone)]
pub struct GitHubClient<T> {
    transport: T,
    api_url: Url,
}

impl<T: HttpTransport> GitHubClient<T> {
    /// Client talking to `api_url` through `transport`
    pub fn new(transport: T, api_url: &str) -> Result<Self, GitHubError> {
        let mut api_url = Url::parse(api_url).map_err(|e| GitHubError::InvalidUrl {
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }
        Ok(Self { transport, api_url })
    }

    /// Host name of the API, used to look up credentials
    pub fn api_host(&self) -> String {
        self.api_url.host_str().unwrap_or_default().to_string()
    }

    fn endpoint(&self, path: &str) -> Result<Url, GitHubError> {
        self.api_url.join(path).map_err(|e| GitHubError::InvalidUrl {
            url: format!("{}{}", self.api_url, path),
            reason: e.to_string(),
        })
    }

    /// Create a release.
    ///
    /// Non-2xx responses become [`GitHubError::ReleaseApi`]; a 2xx response
    /// without `html_url` becomes [`GitHubError::MalformedResponse`].
    pub async fn create_release(
        &self,
        token: &ApiToken,
        repository: &Repository,
        release: &CreateReleaseRequest,
    ) -> Result<CreatedRelease, GitHubError> {
        let url = self.endpoint(&format!(
            "repos/{}/{}/releases",
            repository.owner, repository.name
        ))?;
        let body = serde_json::to_vec(release).map_err(|e| GitHubError::Transport {
            url: url.to_string(),
            reason: format!("Failed to encode request: {e}"),
        })?;

        log::info!("Creating release {} on {}", release.tag_name, repository);
        let request = HttpRequest {
            method: Method::POST,
            url,
            headers: headers(token, "application/json"),
            body: Bytes::from(body),
            timeout: None,
        };
        let url = request.url.to_string();
        let response = self.transport.send(request).await?;
        parse_json(&url, &response)
    }

    /// Upload `content` as a release asset named `name`.
    ///
    /// `upload_url` is the template from [`CreatedRelease::upload_url`].
    pub async fn upload_asset(
        &self,
        token: &ApiToken,
        upload_url: &str,
        name: &str,
        content: Bytes,
    ) -> Result<UploadedAsset, GitHubError> {
        let base = upload_url.split('{').next().unwrap_or(upload_url);
        let mut url = Url::parse(base).map_err(|e| GitHubError::InvalidUrl {
            url: upload_url.to_string(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut().append_pair("name", name);

        log::info!("Uploading {} ({} bytes)", name, content.len());
        let request = HttpRequest {
            method: Method::POST,
            url,
            headers: headers(token, "application/zip"),
            timeout: Some(upload_timeout(content.len())),
            body: content,
        };
        let url = request.url.to_string();
        let response = self.transport.send(request).await?;
        parse_json(&url, &response)
    }
}

fn headers(token: &ApiToken, content_type: &str) -> Vec<(String, String)> {
    vec![
        ("Authorization".to_string(), token.authorization()),
        ("Accept".to_string(), "application/vnd.github+json".to_string()),
        ("Content-Type".to_string(), content_type.to_string()),
    ]
}

fn parse_json<R: DeserializeOwned>(url: &str, response: &HttpResponse) -> Result<R, GitHubError> {
    if !response.is_success() {
        return Err(GitHubError::ReleaseApi {
            url: url.to_string(),
            status: response.status,
            body: response.text(),
        });
    }
    serde_json::from_slice(&response.body).map_err(|e| GitHubError::MalformedResponse {
        url: url.to_string(),
        reason: e.to_string(),
        body: response.text(),
    })
}
