//! GitHub integration for release operations

mod release_manager;
mod transport;

pub use release_manager::{
    CreateReleaseRequest, CreatedRelease, DEFAULT_API_URL, GitHubClient, PublishedRelease,
    UploadedAsset,
};
pub use transport::{
    CONNECT_TIMEOUT, HttpRequest, HttpResponse, HttpTransport, MIN_UPLOAD_TIMEOUT,
    REQUEST_TIMEOUT, ReqwestTransport, upload_timeout,
};

#[cfg(test)]
pub(crate) use transport::mock;
