//! Error types for release operations.
//!
//! Every stage of the release pipeline reports failures through [`ReleaseError`].
//! Nothing is retried: the first error aborts the run and is shown to the
//! operator together with recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Subprocess errors
    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Archive creation errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Source mirroring errors
    #[error("Source sync error: {0}")]
    Sync(#[from] SyncError),

    /// Package.swift editing errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// GitHub API errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// Token resolution errors
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Subprocess errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started at all
    #[error("Failed to launch '{command}': {source}")]
    Spawn {
        /// Command line that was attempted
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully
    #[error("'{command}' exited with {}: {}", format_code(.code), summarize(.stderr, .stdout))]
    Failed {
        /// Command line that failed
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },
}

impl ProcessError {
    /// Exit code of a failed process, if it exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::Failed { code, .. } => *code,
            ProcessError::Spawn { .. } => None,
        }
    }
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

fn summarize(stderr: &str, stdout: &str) -> String {
    let text = if stderr.trim().is_empty() { stdout } else { stderr };
    let text = text.trim();
    if text.is_empty() {
        "no output".to_string()
    } else {
        text.to_string()
    }
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Commit attempted with nothing staged
    #[error("Nothing to commit in {path}. Package.swift and Sources are unchanged.")]
    NoChanges {
        /// Working copy that was inspected
        path: PathBuf,
    },

    /// Git produced output that could not be interpreted
    #[error("Unexpected output from '{command}': {output:?}")]
    UnexpectedOutput {
        /// Command that was run
        command: String,
        /// Raw output
        output: String,
    },
}

/// Archive creation errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Framework directory missing
    #[error("Framework not found at {path}")]
    FrameworkNotFound {
        /// Expected framework location
        path: PathBuf,
    },

    /// Zip writer failure
    #[error("Failed to write zip archive {path}: {source}")]
    Zip {
        /// Archive path
        path: PathBuf,
        /// Underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// Directory traversal failure
    #[error("Failed to walk {path}: {source}")]
    Walk {
        /// Directory being traversed
        path: PathBuf,
        /// Underlying walkdir error
        #[source]
        source: walkdir::Error,
    },

    /// Entry path could not be expressed as a zip entry name
    #[error("Path {path} cannot be stored in the archive")]
    InvalidEntry {
        /// Offending path
        path: PathBuf,
    },
}

/// Errors mirroring generated sources into the package
#[derive(Error, Debug)]
pub enum SyncError {
    /// Generated sources directory missing
    #[error("Generated sources not found at {path}")]
    SourceNotFound {
        /// Expected source directory
        path: PathBuf,
    },

    /// Directory traversal failure
    #[error("Failed to walk {path}: {source}")]
    Walk {
        /// Directory being traversed
        path: PathBuf,
        /// Underlying walkdir error
        #[source]
        source: walkdir::Error,
    },

    /// Entry outside the directory being mirrored
    #[error("Path {path} is not inside {root}")]
    OutsideRoot {
        /// Offending path
        path: PathBuf,
        /// Directory being mirrored
        root: PathBuf,
    },
}

/// Package.swift editing errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file missing or unreadable
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        /// Manifest path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A declaration to substitute was not found
    #[error("Manifest {path} has no `let {field} = \"...\"` declaration")]
    MissingField {
        /// Manifest path
        path: PathBuf,
        /// Declaration name
        field: &'static str,
    },

    /// A declaration occurs more than once, so the edit would be ambiguous
    #[error("Manifest {path} declares `let {field}` {count} times")]
    DuplicateField {
        /// Manifest path
        path: PathBuf,
        /// Declaration name
        field: &'static str,
        /// Number of occurrences
        count: usize,
    },
}

/// GitHub API errors
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Non-2xx response
    #[error("GitHub API returned {status} for {url}: {body}")]
    ReleaseApi {
        /// Endpoint that was called
        url: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// 2xx response without the expected content
    #[error("Unexpected response from {url}: {reason}. Body: {body}")]
    MalformedResponse {
        /// Endpoint that was called
        url: String,
        /// What was wrong with the response
        reason: String,
        /// Raw response body
        body: String,
    },

    /// Request exceeded the client timeout
    #[error("Request to {url} timed out")]
    Timeout {
        /// Endpoint that was called
        url: String,
    },

    /// Connection or protocol failure before a response was received
    #[error("Request to {url} failed: {reason}")]
    Transport {
        /// Endpoint that was called
        url: String,
        /// Transport error description
        reason: String,
    },

    /// Endpoint could not be constructed
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl {
        /// URL text
        url: String,
        /// Parse error description
        reason: String,
    },

    /// Archive bytes no longer match the checksum written to Package.swift
    #[error("Archive {path} has checksum {actual}, but Package.swift records {expected}")]
    ChecksumMismatch {
        /// Archive path
        path: PathBuf,
        /// Checksum recorded in the manifest
        expected: String,
        /// Checksum of the bytes about to be uploaded
        actual: String,
    },
}

impl GitHubError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::ReleaseApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Token resolution errors
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Neither the environment nor ~/.netrc provided a token
    #[error("GitHub token not found. Set GITHUB_TOKEN or add a `machine {host}` entry to ~/.netrc")]
    Missing {
        /// API host the token is needed for
        host: String,
    },

    /// ~/.netrc exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Unreadable {
        /// Credentials file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Required external tool missing from PATH
    #[error("Required tool '{tool}' not found in PATH")]
    MissingTool {
        /// Tool name
        tool: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Credential(CredentialError::Missing { host }) => vec![
                "Export a token: export GITHUB_TOKEN=<token>".to_string(),
                format!("Or add `machine {host} login <user> password <token>` to ~/.netrc"),
                "Use --local-only to run without contacting GitHub".to_string(),
            ],
            ReleaseError::Git(GitError::NoChanges { .. }) => vec![
                "Package.swift already matches this build; check whether this version was released before".to_string(),
                "Inspect the working copy: git status".to_string(),
            ],
            ReleaseError::Process(ProcessError::Spawn { command, .. }) => vec![
                format!("Make sure the program for '{command}' is installed and in PATH"),
            ],
            ReleaseError::Process(ProcessError::Failed { command, .. }) => vec![
                format!("Re-run '{command}' manually to see the full output"),
            ],
            ReleaseError::Sync(SyncError::SourceNotFound { .. }) => vec![
                "Check --build-dir points at the source checkout and that the framework build generated Swift bindings".to_string(),
            ],
            ReleaseError::Manifest(_) => vec![
                "Package.swift must declare `let checksum`, `let version` and `let url` exactly once".to_string(),
            ],
            ReleaseError::GitHub(_) => vec![
                "The release commit may already be pushed; the GitHub release was not created".to_string(),
                "Create the release manually, or delete the pushed tag/commit and re-run".to_string(),
                "Verify the token has `repo` scope: curl -H \"Authorization: token $GITHUB_TOKEN\" https://api.github.com/user".to_string(),
            ],
            ReleaseError::Cli(CliError::MissingTool { tool }) => vec![
                format!("Install '{tool}' or use --test-mode to skip the native build"),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_error_prefers_stderr() {
        let error = ProcessError::Failed {
            command: "cargo xtask".to_string(),
            code: Some(1),
            stdout: "compiling".to_string(),
            stderr: "linker failed".to_string(),
        };
        assert_eq!(error.to_string(), "'cargo xtask' exited with code 1: linker failed");
        assert_eq!(error.exit_code(), Some(1));
    }

    #[test]
    fn test_process_error_falls_back_to_stdout() {
        let error = ProcessError::Failed {
            command: "git push".to_string(),
            code: None,
            stdout: "rejected".to_string(),
            stderr: "  ".to_string(),
        };
        assert_eq!(error.to_string(), "'git push' exited with a signal: rejected");
    }

    #[test]
    fn test_sync_error_is_not_reported_as_archive() {
        let error = ReleaseError::from(SyncError::SourceNotFound {
            path: PathBuf::from("bindings/apple/generated/swift"),
        });
        assert_eq!(
            error.to_string(),
            "Source sync error: Generated sources not found at bindings/apple/generated/swift"
        );
        assert!(error.recovery_suggestions()[0].contains("--build-dir"));
    }

    #[test]
    fn test_github_error_status() {
        let error = GitHubError::ReleaseApi {
            url: "https://api.github.com/repos/o/r/releases".to_string(),
            status: 422,
            body: "{}".to_string(),
        };
        assert_eq!(error.status(), Some(422));
        assert!(ReleaseError::from(error).recovery_suggestions().len() > 1);
    }
}
