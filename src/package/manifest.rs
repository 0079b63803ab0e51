//! `Package.swift` editing.
//!
//! The manifest is treated as an opaque template with three string
//! declarations that get new values: `let checksum`, `let version` and
//! `let url`. Everything else is preserved byte-for-byte.

use crate::error::ManifestError;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

/// New values for the substitutable declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFields {
    /// Release version, e.g. `v1.0.65-alpha`
    pub version: String,
    /// SHA-256 of the release asset
    pub checksum: String,
    /// Download URL of the release asset
    pub url: String,
}

static DECLARATIONS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    ["checksum", "version", "url"]
        .into_iter()
        .map(|field| {
            let pattern = format!(
                r#"(?m)^(?P<prefix>[ \t]*let[ \t]+{field}[ \t]*=[ \t]*)"(?:[^"\\\n]|\\.)*""#
            );
            let re = Regex::new(&pattern).expect("manifest declaration regex is valid");
            (field, re)
        })
        .collect()
});

impl ManifestFields {
    fn value(&self, field: &str) -> &str {
        match field {
            "checksum" => &self.checksum,
            "version" => &self.version,
            _ => &self.url,
        }
    }
}

/// Substitute `fields` into `template`.
///
/// Every declaration must occur exactly once; otherwise nothing is substituted.
/// `path` is only used for error messages.
pub fn render(
    template: &str,
    fields: &ManifestFields,
    path: &Path,
) -> Result<String, ManifestError> {
    for (field, re) in DECLARATIONS.iter() {
        match re.find_iter(template).count() {
            1 => {}
            0 => {
                return Err(ManifestError::MissingField {
                    path: path.to_path_buf(),
                    field: *field,
                });
            }
            count => {
                return Err(ManifestError::DuplicateField {
                    path: path.to_path_buf(),
                    field: *field,
                    count,
                });
            }
        }
    }

    let mut rendered = template.to_string();
    for (field, re) in DECLARATIONS.iter() {
        let literal = swift_string_literal(fields.value(field));
        rendered = re
            .replacen(&rendered, 1, |caps: &Captures<'_>| {
                format!("{}{}", &caps["prefix"], literal)
            })
            .into_owned();
    }
    Ok(rendered)
}

/// Current value of a declaration, if present exactly once
pub fn read_field(manifest: &str, field: &str) -> Option<String> {
    let (_, re) = DECLARATIONS.iter().find(|(name, _)| *name == field)?;
    let mut matches = re.captures_iter(manifest);
    let caps = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    let whole = caps.get(0)?.as_str();
    let literal = &whole[caps["prefix"].len()..];
    Some(literal.trim_matches('"').to_string())
}

fn swift_string_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Rewrite the manifest at `path` in place.
///
/// The new content is written to a sibling temporary file and renamed over
/// the original, so a failure never leaves a half-written manifest.
pub fn update_file(path: &Path, fields: &ManifestFields) -> crate::error::Result<()> {
    let template = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rendered = render(&template, fields, path)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, rendered)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
