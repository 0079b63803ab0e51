//! GitHub token resolution.
//!
//! Lookup order: the `GITHUB_TOKEN` environment variable, then a `machine`
//! entry for the API host in `~/.netrc`, then the `default` netrc entry.

use crate::EnvConfig;
use crate::error::CredentialError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable checked first
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// A GitHub API token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("token {}", self.0)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Where a token came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// The `GITHUB_TOKEN` variable
    Environment,
    /// A netrc file
    Netrc(PathBuf),
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Environment => write!(f, "${TOKEN_VAR}"),
            TokenSource::Netrc(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolve the token for `host`.
///
/// `home` is the directory holding `.netrc`; `None` skips the netrc lookup.
/// A missing netrc file is not an error, an unreadable one is.
pub fn resolve_api_token(
    env: &EnvConfig,
    home: Option<&Path>,
    host: &str,
) -> Result<(ApiToken, TokenSource), CredentialError> {
    if let Some(token) = env.get(TOKEN_VAR) {
        log::debug!("Using token from ${TOKEN_VAR}");
        return Ok((ApiToken::new(token.trim()), TokenSource::Environment));
    }

    if let Some(home) = home {
        let path = home.join(".netrc");
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                if let Some(password) = netrc_password(&contents, host) {
                    log::debug!("Using token from {}", path.display());
                    return Ok((ApiToken::new(password), TokenSource::Netrc(path)));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(CredentialError::Unreadable { path, source }),
        }
    }

    Err(CredentialError::Missing {
        host: host.to_string(),
    })
}

/// One `machine` or `default` entry of a netrc file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct NetrcEntry {
    machine: Option<String>,
    login: Option<String>,
    password: Option<String>,
}

fn parse_netrc(contents: &str) -> Vec<NetrcEntry> {
    let mut entries = Vec::new();
    let mut current: Option<NetrcEntry> = None;
    let mut lines = contents.lines();

    while let Some(line) = lines.next() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        while let Some(token) = tokens.next() {
            match token {
                "machine" => {
                    entries.extend(current.take());
                    current = Some(NetrcEntry {
                        machine: tokens.next().map(str::to_string),
                        ..NetrcEntry::default()
                    });
                }
                "default" => {
                    entries.extend(current.take());
                    current = Some(NetrcEntry::default());
                }
                "login" => {
                    if let Some(entry) = current.as_mut() {
                        entry.login = tokens.next().map(str::to_string);
                    }
                }
                "password" => {
                    if let Some(entry) = current.as_mut() {
                        entry.password = tokens.next().map(str::to_string);
                    }
                }
                "account" => {
                    tokens.next();
                }
                "macdef" => {
                    // Macro body runs until the next blank line
                    for body in lines.by_ref() {
                        if body.trim().is_empty() {
                            break;
                        }
                    }
                    break;
                }
                _ => {}
            }
        }
    }
    entries.extend(current);
    entries
}

fn netrc_password(contents: &str, host: &str) -> Option<String> {
    let entries = parse_netrc(contents);
    let matching = entries
        .iter()
        .find(|entry| entry.machine.as_deref() == Some(host))
        .or_else(|| entries.iter().find(|entry| entry.machine.is_none()))?;
    matching.password.clone()
}
