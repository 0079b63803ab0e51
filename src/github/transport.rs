//! HTTP transport abstraction.
//!
//! [`GitHubClient`](super::GitHubClient) builds requests and interprets
//! responses; an [`HttpTransport`] only moves bytes. Tests substitute a
//! transport that records requests and replays canned responses.

use crate::error::GitHubError;
use bytes::Bytes;
use reqwest::Method;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Connect timeout for API requests
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Total timeout for one API request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Lower bound on the total timeout of an asset upload
pub const MIN_UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Slowest sustained upload rate tolerated before an upload times out
const MIN_UPLOAD_BYTES_PER_SEC: u64 = 64 * 1024;

/// Total timeout for uploading `len` bytes.
///
/// At least [`MIN_UPLOAD_TIMEOUT`], growing with the body size so a large
/// archive is not cut off by the API timeout.
pub fn upload_timeout(len: usize) -> Duration {
    let secs = (len as u64).div_ceil(MIN_UPLOAD_BYTES_PER_SEC);
    MIN_UPLOAD_TIMEOUT.max(Duration::from_secs(secs))
}

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// An outgoing request
#[derive(Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: Url,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: Bytes,
    /// Total timeout overriding [`REQUEST_TIMEOUT`]
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Value of the first header named `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("authorization") {
                    (k.as_str(), "<redacted>")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &headers)
            .field("body_len", &self.body.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A received response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Raw body
    pub body: Bytes,
}

impl HttpResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends a request and returns the response, whatever its status
pub trait HttpTransport {
    /// Send `request`.
    ///
    /// Only failures to obtain a response are errors; non-2xx statuses are
    /// returned as ordinary responses.
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, GitHubError>>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, GitHubError>> {
        (**self).send(request)
    }
}

/// [`HttpTransport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the default timeouts
    pub fn new() -> Result<Self, GitHubError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GitHubError::Transport {
                url: String::new(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

fn classify(url: &str, error: reqwest::Error) -> GitHubError {
    if error.is_timeout() {
        GitHubError::Timeout {
            url: url.to_string(),
        }
    } else {
        GitHubError::Transport {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GitHubError> {
        let url = request.url.to_string();
        log::debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method, request.url);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| classify(&url, e))?;

        log::debug!("{url} -> {status}");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording transport for unit tests.

    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Debug, Default)]
    pub struct MockTransport {
        pub requests: RefCell<Vec<HttpRequest>>,
        responses: RefCell<VecDeque<Result<HttpResponse, GitHubError>>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, status: u16, body: &str) -> Self {
            self.responses.borrow_mut().push_back(Ok(HttpResponse {
                status,
                body: Bytes::from(body.to_string()),
            }));
            self
        }

        pub fn fail(self, error: GitHubError) -> Self {
            self.responses.borrow_mut().push_back(Err(error));
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GitHubError> {
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("MockTransport has no response queued"))
        }
    }
}
