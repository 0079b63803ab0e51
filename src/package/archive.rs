//! Deterministic zip archives and SHA-256 checksums.
//!
//! Swift Package Manager verifies binary targets by checksum, so the archive
//! must be byte-for-byte reproducible: entries are written in sorted order with
//! a fixed timestamp and normalised permissions.

use crate::error::{ArchiveError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const DIR_MODE: u32 = 0o755;
const EXEC_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// An archive on disk together with the checksum of its exact bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedArtifact {
    /// Archive location
    pub path: PathBuf,
    /// Hex-encoded SHA-256 of the archive file
    pub checksum: String,
}

/// Zip `source` into `destination`, storing entries under `source`'s file name.
///
/// Returns the SHA-256 of the written file.
pub fn zip_directory(source: &Path, destination: &Path) -> Result<ArchivedArtifact> {
    if !source.is_dir() {
        return Err(ArchiveError::FrameworkNotFound {
            path: source.to_path_buf(),
        }
        .into());
    }
    let base = source.parent().unwrap_or(source);

    let zip_err = |source: zip::result::ZipError| ArchiveError::Zip {
        path: destination.to_path_buf(),
        source,
    };

    let file = File::create(destination)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let walker = WalkDir::new(source).follow_links(false).sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| ArchiveError::Walk {
            path: source.to_path_buf(),
            source: e,
        })?;
        let name = entry_name(base, entry.path())?;
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            let target = std::fs::read_link(entry.path())?;
            let target = target
                .to_str()
                .ok_or_else(|| ArchiveError::InvalidEntry {
                    path: entry.path().to_path_buf(),
                })?
                .replace('\\', "/");
            zip.add_symlink(name, target, options.unix_permissions(DIR_MODE))
                .map_err(zip_err)?;
        } else if file_type.is_dir() {
            zip.add_directory(format!("{name}/"), options.unix_permissions(DIR_MODE))
                .map_err(zip_err)?;
        } else {
            let mode = if is_executable(entry.path())? {
                EXEC_MODE
            } else {
                FILE_MODE
            };
            zip.start_file(name, options.unix_permissions(mode))
                .map_err(zip_err)?;
            let mut input = File::open(entry.path())?;
            std::io::copy(&mut input, &mut zip)?;
        }
    }

    let mut writer = zip.finish().map_err(zip_err)?;
    writer.flush()?;
    drop(writer);

    let checksum = sha256_file(destination)?;
    log::info!("Archived {} ({})", destination.display(), checksum);

    Ok(ArchivedArtifact {
        path: destination.to_path_buf(),
        checksum,
    })
}

fn entry_name(base: &Path, path: &Path) -> Result<String> {
    let invalid = || ArchiveError::InvalidEntry {
        path: path.to_path_buf(),
    };
    let relative = path.strip_prefix(base).map_err(|_| invalid())?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str().ok_or_else(invalid))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> std::io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;
    Ok(std::fs::metadata(path)?.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> std::io::Result<bool> {
    Ok(false)
}

/// Calculate SHA-256 checksum of a file
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Calculate SHA-256 checksum of in-memory bytes
pub fn sha256_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
